//! Tests for the HTTP source module

use super::*;
use crate::config::{KeysetConfig, SourceConfig};
use crate::error::Error;
use crate::pagination::PageQuery;
use crate::stream::{AsyncPageProducer, AsyncPager};
use futures::TryStreamExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Serves `count` users, addressed by page number or by `after` id
struct Users {
    count: u64,
}

impl Respond for Users {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let param = |name: &str| {
            request
                .url
                .query_pairs()
                .find(|(key, _)| key == name)
                .and_then(|(_, value)| value.parse::<u64>().ok())
        };
        let limit = param("limit").unwrap_or(20);
        let start = match (param("after"), param("page")) {
            (Some(after), _) => after,
            (None, Some(page)) => (page - 1) * limit,
            (None, None) => 0,
        };
        let users: Vec<Value> = (start + 1..=self.count)
            .take(limit as usize)
            .map(|id| json!({"id": id, "name": format!("user-{id}")}))
            .collect();

        ResponseTemplate::new(200).set_body_json(json!({
            "data": users,
            "meta": {"total": self.count}
        }))
    }
}

fn ids(records: &[Value]) -> Vec<u64> {
    records.iter().filter_map(|r| r["id"].as_u64()).collect()
}

// ============================================================================
// Client Tests
// ============================================================================

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert!(config.default_headers.is_empty());
    assert!(config.user_agent.starts_with("pagewalk/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .timeout(Duration::from_secs(5))
        .header("X-Custom", "value")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.timeout, Duration::from_secs(5));
    assert_eq!(
        config.default_headers.get("X-Custom"),
        Some(&"value".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[tokio::test]
async fn test_http_client_get_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/data"))
        .and(query_param("page", "2"))
        .and(header("X-Custom", "value"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": 42})))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder().header("X-Custom", "value").build();
    let client = HttpClient::with_config(config).unwrap();
    let request = RequestConfig::new().query("page", 2);
    let data: Value = client
        .get_json(&format!("{}/api/data", mock_server.uri()), &request)
        .await
        .unwrap();

    assert_eq!(data["value"], 42);
}

#[tokio::test]
async fn test_http_client_status_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = HttpClient::new().unwrap();
    let err = client
        .get(&format!("{}/api/missing", mock_server.uri()), &RequestConfig::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 404, ref body } if body == "Not found"));
}

// ============================================================================
// Extraction Tests
// ============================================================================

#[test]
fn test_lookup_paths() {
    let body = json!({"data": {"items": [{"id": 1}, {"id": 2}]}, "meta": {"total": "12"}});

    assert_eq!(extract::lookup(&body, ""), Some(&body));
    assert_eq!(extract::lookup(&body, "$.meta.total"), Some(&json!("12")));
    assert_eq!(extract::lookup(&body, "data.items[1].id"), Some(&json!(2)));
    assert_eq!(extract::lookup(&body, "data.missing"), None);
    assert_eq!(extract::lookup(&body, "data.items[9]"), None);
}

#[test]
fn test_records_and_total() {
    let body = json!({"data": [{"id": 1}], "total": 7, "count": "3", "bad": [1]});

    assert_eq!(extract::records(&body, "data").unwrap().len(), 1);
    assert_eq!(extract::total(&body, "total").unwrap(), Some(7));
    assert_eq!(extract::total(&body, "count").unwrap(), Some(3));
    assert_eq!(extract::total(&body, "absent").unwrap(), None);

    assert!(matches!(
        extract::records(&body, "total"),
        Err(Error::RecordExtraction { .. })
    ));
    assert!(extract::records(&body, "nope").is_err());
    assert!(extract::total(&body, "bad").is_err());

    let bare = json!([{"id": 1}, {"id": 2}]);
    assert_eq!(extract::records(&bare, "").unwrap().len(), 2);
}

#[test]
fn test_record_keys() {
    assert_eq!(extract::key(&json!({"id": 42}), "id").unwrap(), "42");
    assert_eq!(extract::key(&json!({"id": "cus_9"}), "id").unwrap(), "cus_9");
    assert!(extract::key(&json!({"name": "x"}), "id").is_err());
    assert!(extract::key(&json!({"id": {"a": 1}}), "id").is_err());
}

// ============================================================================
// Source Tests
// ============================================================================

#[test]
fn test_request_params_page_number() {
    let mut config = SourceConfig::new("https://api.example.com/users");
    config.offset_param = Some("offset".to_string());
    let source = HttpSource::new(config).unwrap();
    assert!(!source.is_keyset());

    let request = source.request_for(&PageQuery::of(3, 25).unwrap(), None).unwrap();
    assert_eq!(request.query.get("page").map(String::as_str), Some("3"));
    assert_eq!(request.query.get("limit").map(String::as_str), Some("25"));
    assert_eq!(request.query.get("offset").map(String::as_str), Some("50"));

    let request = source.request_for(&PageQuery::unpaged(25).unwrap(), None).unwrap();
    assert_eq!(request.query.len(), 1);
}

#[test]
fn test_request_params_keyset() {
    let mut config = SourceConfig::new("https://api.example.com/users");
    config.keyset = Some(KeysetConfig {
        after_param: "after".to_string(),
        key_field: "id".to_string(),
    });
    let source = HttpSource::new(config).unwrap();
    assert!(source.is_keyset());

    let query = PageQuery::of(2, 2).unwrap();
    let first = source.request_for(&query, None).unwrap();
    assert!(first.query.get("after").is_none());
    assert!(first.query.get("page").is_none());

    let last = vec![json!({"id": 1}), json!({"id": 2})];
    let next = source.request_for(&query, Some(&last)).unwrap();
    assert_eq!(next.query.get("after").map(String::as_str), Some("2"));
}

#[test]
fn test_source_rejects_invalid_config() {
    let err = HttpSource::new(SourceConfig::new("")).unwrap_err();
    assert!(matches!(err, Error::InvalidConfigValue { .. }));
}

#[tokio::test]
async fn test_source_walks_pages() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(Users { count: 23 })
        .expect(3)
        .mount(&mock_server)
        .await;

    let mut config = SourceConfig::new(format!("{}/users", mock_server.uri()));
    config.records_path = "data".to_string();
    let pager = AsyncPager::new(10, HttpSource::new(config).unwrap()).unwrap();

    let records: Vec<Value> = pager.into_walk().into_items().try_collect().await.unwrap();
    assert_eq!(ids(&records), (1..=23).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_source_stops_at_total() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(Users { count: 20 })
        .expect(2)
        .mount(&mock_server)
        .await;

    let mut config = SourceConfig::new(format!("{}/users", mock_server.uri()));
    config.records_path = "data".to_string();
    config.total_path = Some("meta.total".to_string());
    let pager = AsyncPager::new(10, HttpSource::new(config).unwrap()).unwrap();

    let records: Vec<Value> = pager.into_walk().into_items().try_collect().await.unwrap();
    assert_eq!(records.len(), 20);
}

#[tokio::test]
async fn test_source_walks_keyset() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(Users { count: 9 })
        .mount(&mock_server)
        .await;

    let mut config = SourceConfig::new(format!("{}/users", mock_server.uri()));
    config.records_path = "data".to_string();
    config.keyset = Some(KeysetConfig {
        after_param: "after".to_string(),
        key_field: "id".to_string(),
    });
    let mut source = HttpSource::new(config).unwrap();

    let first = source
        .next_page(&PageQuery::first_page(4).unwrap(), None)
        .await
        .unwrap();
    assert_eq!(ids(first.data()), vec![1, 2, 3, 4]);

    let pager = AsyncPager::new(4, source).unwrap();
    let records: Vec<Value> = pager.into_walk().into_items().try_collect().await.unwrap();
    assert_eq!(ids(&records), (1..=9).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_source_http_error_ends_walk() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = SourceConfig::new(format!("{}/users", mock_server.uri()));
    let mut pager = AsyncPager::new(10, HttpSource::new(config).unwrap()).unwrap();

    let mut walk = pager.walk();
    assert!(matches!(
        walk.next_batch().await,
        Some(Err(Error::HttpStatus { status: 500, .. }))
    ));
    assert!(walk.next_batch().await.is_none());
}
