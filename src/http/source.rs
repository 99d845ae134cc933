//! JSON-over-HTTP batch producer

use super::client::{HttpClient, HttpClientConfig, RequestConfig};
use super::extract;
use crate::config::SourceConfig;
use crate::error::Result;
use crate::pagination::{Page, PageQuery};
use crate::stream::AsyncPageProducer;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// An HTTP endpoint returning one batch of JSON records per request
///
/// Page-number sources receive `page_param` (and `offset_param`, when set)
/// alongside `limit_param`. Keyset sources receive `limit_param` plus
/// `after_param` naming the key of the last record already seen.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: HttpClient,
    config: SourceConfig,
}

impl HttpSource {
    /// Create a source from its configuration
    pub fn new(config: SourceConfig) -> Result<Self> {
        config.validate()?;

        let mut client_config =
            HttpClientConfig::builder().timeout(Duration::from_secs(config.timeout_secs));
        for (key, value) in &config.headers {
            client_config = client_config.header(key, value);
        }
        let client = HttpClient::with_config(client_config.build())?;
        Ok(Self::with_client(client, config))
    }

    /// Create a source sharing an existing client
    pub fn with_client(client: HttpClient, config: SourceConfig) -> Self {
        Self { client, config }
    }

    /// Source configuration
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Whether batches are addressed by the last key instead of a page number
    pub fn is_keyset(&self) -> bool {
        self.config.keyset.is_some()
    }

    /// Query parameters for the batch addressed by `query`
    pub fn request_for(&self, query: &PageQuery, last: Option<&Vec<Value>>) -> Result<RequestConfig> {
        let config = &self.config;
        let mut request = RequestConfig::new().query(&config.limit_param, query.limit());

        if let Some(keyset) = &config.keyset {
            if let Some(record) = last.and_then(|batch| batch.last()) {
                let key = extract::key(record, &keyset.key_field)?;
                request = request.query(&keyset.after_param, key);
            }
            return Ok(request);
        }

        if let Some(page) = query.page() {
            if !config.page_param.is_empty() {
                request = request.query(&config.page_param, page);
            }
        }
        if let (Some(param), Some(offset)) = (&config.offset_param, query.offset()) {
            request = request.query(param, offset);
        }
        Ok(request)
    }
}

#[async_trait]
impl AsyncPageProducer<Vec<Value>> for HttpSource {
    async fn next_page(&mut self, query: &PageQuery, last: Option<&Vec<Value>>) -> Result<Page<Vec<Value>>> {
        let request = self.request_for(query, last)?;
        let body: Value = self.client.get_json(&self.config.url, &request).await?;

        let records = extract::records(&body, &self.config.records_path)?;
        let total = match &self.config.total_path {
            Some(path) => extract::total(&body, path)?,
            None => None,
        };
        debug!(
            url = %self.config.url,
            records = records.len(),
            total = ?total,
            "decoded response"
        );

        let size = records.len();
        Ok(match total {
            Some(total) => Page::with_total(records, size, total),
            None => Page::new(records, size),
        })
    }
}
