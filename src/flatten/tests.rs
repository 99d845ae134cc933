//! Tests for flattening module

use super::*;
use crate::engine::{Termination, DEFAULT_TIMES_LIMIT};
use crate::error::Error;
use pretty_assertions::assert_eq;
use std::cell::Cell;
use test_case::test_case;

fn numbers(n: u32) -> Vec<u32> {
    (1..=n).collect()
}

/// Slice of `data` addressed by the query's offset
fn slice(data: &[u32], query: &PageQuery) -> Vec<u32> {
    let start = query.offset_or_zero().min(data.len());
    let end = start.saturating_add(query.limit()).min(data.len());
    data[start..end].to_vec()
}

/// Up to `limit` elements of `data` strictly after `last`
fn after(data: &[u32], query: &PageQuery, last: Option<&u32>) -> Vec<u32> {
    data.iter()
        .copied()
        .filter(|n| last.map_or(true, |last| n > last))
        .take(query.limit())
        .collect()
}

/// Source-shaped response carrying its own count and total
#[derive(Clone)]
struct Listing {
    rows: Vec<u32>,
    count: usize,
    total: u64,
}

// ============================================================================
// Completeness Tests
// ============================================================================

#[test_case(100, 10 ; "exact multiple")]
#[test_case(100, 3 ; "short tail")]
#[test_case(1, 1 ; "single element")]
#[test_case(0, 4 ; "empty source")]
#[test_case(17, 100 ; "batch larger than source")]
fn test_flattened_walk_is_complete(len: u32, batch_size: usize) {
    let data = numbers(len);
    let pager = ItemPager::new(batch_size, |query: &PageQuery| Ok(slice(&data, query))).unwrap();

    let items: Vec<u32> = pager.into_iter().collect::<Result<_>>().unwrap();
    assert_eq!(items, data);
}

#[test_case(100, 10 ; "exact multiple")]
#[test_case(100, 4 ; "four per batch")]
#[test_case(50, 7 ; "short tail")]
fn test_ordered_matches_offset(len: u32, batch_size: usize) {
    let data = numbers(len);

    let by_offset: Vec<u32> = ItemPager::new(batch_size, |query: &PageQuery| Ok(slice(&data, query)))
        .unwrap()
        .into_iter()
        .collect::<Result<_>>()
        .unwrap();
    let by_key: Vec<u32> = ItemPager::ordered(batch_size, |query: &PageQuery, last: Option<&u32>| {
        Ok(after(&data, query, last))
    })
    .unwrap()
    .into_iter()
    .collect::<Result<_>>()
    .unwrap();

    assert_eq!(by_offset, data);
    assert_eq!(by_key, by_offset);
}

#[test]
fn test_ordered_first_call_has_no_hint() {
    let data = numbers(9);
    let mut hints = Vec::new();
    let pager = ItemPager::ordered(4, |query: &PageQuery, last: Option<&u32>| {
        hints.push(last.copied());
        Ok(after(&data, query, last))
    })
    .unwrap();

    let items: Vec<u32> = pager.into_iter().collect::<Result<_>>().unwrap();
    assert_eq!(items, data);
    assert_eq!(hints, vec![None, Some(4), Some(8)]);
}

// ============================================================================
// Mapping Tests
// ============================================================================

#[test]
fn test_concat_map() {
    let data = numbers(10);
    let mut pager = ItemPager::new(3, |query: &PageQuery| Ok(slice(&data, query))).unwrap();

    let mapped: Vec<String> = pager
        .concat_map(|n| n.to_string())
        .collect::<Result<_>>()
        .unwrap();

    let expected: Vec<String> = data.iter().map(ToString::to_string).collect();
    assert_eq!(mapped, expected);
}

#[test]
fn test_into_map() {
    let data = numbers(5);
    let pager = ItemPager::new(2, |query: &PageQuery| Ok(slice(&data, query))).unwrap();

    let doubled: Vec<u32> = pager.into_map(|n| n * 2).collect::<Result<_>>().unwrap();
    assert_eq!(doubled, vec![2, 4, 6, 8, 10]);
}

#[test]
fn test_of_with_mappers() {
    let data = numbers(20);
    let pager = ItemPager::of(
        6,
        |query: &PageQuery| {
            let rows = slice(&data, query);
            Ok(Listing {
                count: rows.len(),
                rows,
                total: 20,
            })
        },
        Mappers::new(|l: Listing| l.rows, |l: &Listing| l.count),
    )
    .unwrap();

    let items: Vec<u32> = pager.into_iter().collect::<Result<_>>().unwrap();
    assert_eq!(items, data);
}

#[test]
fn test_of_with_total_skips_closing_fetch() {
    let data = numbers(20);
    let calls = Cell::new(0);
    let pager = ItemPager::of(
        5,
        |query: &PageQuery| {
            calls.set(calls.get() + 1);
            let rows = slice(&data, query);
            Ok(Listing {
                count: rows.len(),
                rows,
                total: 20,
            })
        },
        Mappers::new(|l: Listing| l.rows, |l: &Listing| l.count).with_total(|l| l.total),
    )
    .unwrap();

    let mut items = pager.into_iter();
    let collected: Vec<u32> = items.by_ref().collect::<Result<_>>().unwrap();

    assert_eq!(collected, data);
    assert_eq!(calls.get(), 4);
    assert_eq!(items.stats().termination, Some(Termination::TotalReached));
}

#[test]
fn test_of_ordered_with_mappers() {
    let data = numbers(11);
    let pager = ItemPager::of_ordered(
        3,
        |query: &PageQuery, last: Option<&u32>| {
            let rows = after(&data, query, last);
            Ok(Listing {
                count: rows.len(),
                rows,
                total: 0,
            })
        },
        Mappers::new(|l: Listing| l.rows, |l: &Listing| l.count),
    )
    .unwrap();

    let items: Vec<u32> = pager.into_iter().collect::<Result<_>>().unwrap();
    assert_eq!(items, data);
}

// ============================================================================
// Laziness / Failure Tests
// ============================================================================

#[test]
fn test_zero_batch_size_is_rejected() {
    let err = ItemPager::new(0, |query: &PageQuery| Ok(slice(&[1, 2], query))).unwrap_err();
    assert!(matches!(err, Error::InvalidConfigValue { .. }));
}

#[test]
fn test_pager_debug_skips_closure_producer() {
    let data = numbers(5);
    let pager = ItemPager::new(2, |query: &PageQuery| Ok(slice(&data, query))).unwrap();
    assert!(format!("{pager:?}").starts_with("ItemPager { pager: ModelPager {"));

    let mut items = pager.into_iter();
    assert_eq!(items.next().unwrap().unwrap(), 1);
    assert!(format!("{items:?}").contains("buffered: 1"));
}

#[test]
fn test_fetches_only_what_is_consumed() {
    let data = numbers(100);
    let calls = Cell::new(0);
    let pager = ItemPager::new(10, |query: &PageQuery| {
        calls.set(calls.get() + 1);
        Ok(slice(&data, query))
    })
    .unwrap();

    let mut items = pager.into_iter();
    assert_eq!(calls.get(), 0);

    let first: Vec<u32> = items.by_ref().take(10).collect::<Result<_>>().unwrap();
    assert_eq!(first, numbers(10));
    assert_eq!(calls.get(), 1);

    items.next().unwrap().unwrap();
    assert_eq!(calls.get(), 2);
}

#[test]
fn test_elements_before_error_are_kept() {
    let pager = ItemPager::new(2, |query: &PageQuery| -> Result<Vec<u32>> {
        match query.require_page()? {
            1 => Ok(vec![1, 2]),
            2 => Ok(vec![3, 4, 5]),
            _ => Ok(vec![]),
        }
    })
    .unwrap();

    let results: Vec<Result<u32>> = pager.into_iter().collect();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap(), &1);
    assert_eq!(results[1].as_ref().unwrap(), &2);
    assert!(matches!(
        results[2],
        Err(Error::ProducerContractViolation { size: 3, limit: 2 })
    ));
}

#[test]
fn test_times_limit_defaults_and_rewalk() {
    let data = numbers(100);
    let mut pager = ItemPager::new(2, |query: &PageQuery| Ok(slice(&data, query))).unwrap();
    assert_eq!(pager.times_limit(), DEFAULT_ITEM_TIMES_LIMIT);
    assert_ne!(pager.times_limit(), DEFAULT_TIMES_LIMIT);

    pager.set_times_limit(50);
    let mut items = Vec::new();
    for item in &mut pager {
        items.push(item.unwrap());
    }
    assert_eq!(items, data);

    pager.set_times_limit(49);
    let err = pager
        .concat()
        .find_map(std::result::Result::err)
        .unwrap();
    assert!(matches!(err, Error::IterationLimitExceeded { times_limit: 49 }));
}

#[test]
fn test_with_query_walks_from_first_page() {
    let data = numbers(7);
    let pager = ItemPager::with_query(PageQuery::of(3, 2).unwrap(), |query: &PageQuery| {
        Ok(slice(&data, query))
    })
    .with_times_limit(10);
    assert_eq!(pager.batch_size(), 2);

    let items: Vec<u32> = pager.into_iter().collect::<Result<_>>().unwrap();
    assert_eq!(items, data);
}
