//! Producer traits
//!
//! A producer fetches one batch for a given query. Plain closures implement
//! both traits, so most callers never name them.

use crate::error::Result;
use crate::pagination::{Page, PageQuery};

/// Fetches the next batch of a walk
///
/// `last` is the payload of the previous batch, absent on the first call.
/// The returned page must hold at most `query.limit()` elements; returning
/// more is a contract violation and aborts the walk.
pub trait PageProducer<M> {
    /// Produce the batch for `query`
    fn next_page(&mut self, query: &PageQuery, last: Option<&M>) -> Result<Page<M>>;
}

impl<M, F> PageProducer<M> for F
where
    F: FnMut(&PageQuery, Option<&M>) -> Result<Page<M>>,
{
    fn next_page(&mut self, query: &PageQuery, last: Option<&M>) -> Result<Page<M>> {
        self(query, last)
    }
}

/// Raw fetch returning a source-shaped value `D`
///
/// `L` is whatever hint the fetch wants from the previous batch: the whole
/// previous payload, or only its last element for keyset queries.
pub trait DataProducer<L, D> {
    /// Fetch the raw value for `query`
    fn fetch(&mut self, query: &PageQuery, last: Option<&L>) -> Result<D>;
}

impl<L, D, F> DataProducer<L, D> for F
where
    F: FnMut(&PageQuery, Option<&L>) -> Result<D>,
{
    fn fetch(&mut self, query: &PageQuery, last: Option<&L>) -> Result<D> {
        self(query, last)
    }
}

/// A fetch that only looks at the query
#[derive(Debug, Clone)]
pub struct PageFn<F>(pub F);

impl<L, D, F> DataProducer<L, D> for PageFn<F>
where
    F: FnMut(&PageQuery) -> Result<D>,
{
    fn fetch(&mut self, query: &PageQuery, _last: Option<&L>) -> Result<D> {
        (self.0)(query)
    }
}

/// A keyset fetch: receives the last element of the previous batch
/// instead of the whole batch
#[derive(Debug, Clone)]
pub struct LastElement<F>(pub F);

impl<T, D, F> DataProducer<Vec<T>, D> for LastElement<F>
where
    F: FnMut(&PageQuery, Option<&T>) -> Result<D>,
{
    fn fetch(&mut self, query: &PageQuery, last: Option<&Vec<T>>) -> Result<D> {
        (self.0)(query, last.and_then(|batch| batch.last()))
    }
}

/// Borrowed producer, so one pager can be walked more than once
#[derive(Debug)]
pub struct ProducerRef<'a, P: ?Sized>(pub &'a mut P);

impl<M, P> PageProducer<M> for ProducerRef<'_, P>
where
    P: PageProducer<M> + ?Sized,
{
    fn next_page(&mut self, query: &PageQuery, last: Option<&M>) -> Result<Page<M>> {
        self.0.next_page(query, last)
    }
}
