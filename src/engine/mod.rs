//! Execution engine module
//!
//! Main page loop.
//!
//! # Overview
//!
//! The engine module provides:
//! - `ModelPager` - A paginated source, configured once and walked lazily
//! - `PageIter` - One walk: pulls a batch per `next()` and stops on its own
//! - `WalkState` - The termination policy shared with async walks
//!
//! A walk ends when a batch comes back empty, comes back short, or brings
//! the fetched count up to the producer's reported total. A producer that
//! returns more than the limit, or never stops returning full batches,
//! aborts the walk with an error.

mod state;
mod types;

pub use state::{Step, WalkState};
pub use types::{Termination, WalkStats, DEFAULT_ITEM_TIMES_LIMIT, DEFAULT_TIMES_LIMIT};

use crate::error::{Error, Result};
use crate::pagination::{Page, PageQuery};
use crate::producer::{PageProducer, ProducerRef};
use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

/// A paginated source of `M` batches
#[derive(Clone)]
pub struct ModelPager<M, P> {
    /// Starting query for each walk
    query: PageQuery,
    /// Batch producer
    producer: P,
    /// Maximum batches per walk before giving up
    times_limit: usize,
    _marker: PhantomData<fn() -> M>,
}

impl<M, P> ModelPager<M, P>
where
    M: Clone,
    P: PageProducer<M>,
{
    /// Create a pager fetching `batch_size` elements per page, from page 1
    pub fn new(batch_size: usize, producer: P) -> Result<Self> {
        let query = PageQuery::first_page(batch_size)
            .map_err(|_| Error::invalid_value("batch_size", "must be at least 1"))?;
        Ok(Self::with_query(query, producer))
    }

    /// Create a pager that walks a caller-supplied query.
    ///
    /// Each walk starts from a copy of `query` moved back to its first page.
    pub fn with_query(query: PageQuery, producer: P) -> Self {
        Self {
            query,
            producer,
            times_limit: DEFAULT_TIMES_LIMIT,
            _marker: PhantomData,
        }
    }

    /// Set the maximum number of batches per walk
    #[must_use]
    pub fn with_times_limit(mut self, times_limit: usize) -> Self {
        self.times_limit = times_limit;
        self
    }

    /// Change the maximum number of batches per walk
    pub fn set_times_limit(&mut self, times_limit: usize) {
        self.times_limit = times_limit;
    }

    /// Maximum number of batches per walk
    pub fn times_limit(&self) -> usize {
        self.times_limit
    }

    /// Elements requested per batch
    pub fn batch_size(&self) -> usize {
        self.query.limit()
    }

    /// Walk the source, keeping the pager for later walks
    pub fn iter(&mut self) -> PageIter<M, ProducerRef<'_, P>> {
        PageIter::new(
            self.start_query(),
            ProducerRef(&mut self.producer),
            self.times_limit,
        )
    }

    fn start_query(&self) -> PageQuery {
        let mut query = self.query.clone();
        query.first();
        query
    }
}

impl<M, P> fmt::Debug for ModelPager<M, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelPager")
            .field("query", &self.query)
            .field("times_limit", &self.times_limit)
            .finish_non_exhaustive()
    }
}

impl<M, F> ModelPager<M, F>
where
    M: Clone,
    F: FnMut(&PageQuery, Option<&M>) -> Result<Page<M>>,
{
    /// Create a pager from a closure receiving the query and previous payload
    pub fn from_fn(batch_size: usize, producer: F) -> Result<Self> {
        Self::new(batch_size, producer)
    }
}

impl<M, P> IntoIterator for ModelPager<M, P>
where
    M: Clone,
    P: PageProducer<M>,
{
    type Item = Result<M>;
    type IntoIter = PageIter<M, P>;

    fn into_iter(self) -> Self::IntoIter {
        let query = self.start_query();
        PageIter::new(query, self.producer, self.times_limit)
    }
}

impl<'a, M, P> IntoIterator for &'a mut ModelPager<M, P>
where
    M: Clone,
    P: PageProducer<M>,
{
    type Item = Result<M>;
    type IntoIter = PageIter<M, ProducerRef<'a, P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One lazy walk over a paginated source
///
/// Yields `Ok(batch)` per non-empty batch. After the final batch, or after
/// the first error, every call returns `None`.
pub struct PageIter<M, P> {
    producer: P,
    state: WalkState,
    /// Payload of the previous batch, handed to the producer
    previous: Option<M>,
}

impl<M, P> PageIter<M, P>
where
    M: Clone,
    P: PageProducer<M>,
{
    /// Start a walk at `query`
    pub fn new(query: PageQuery, producer: P, times_limit: usize) -> Self {
        Self {
            producer,
            state: WalkState::new(query, times_limit),
            previous: None,
        }
    }

    /// The query of the most recent fetch
    pub fn query(&self) -> &PageQuery {
        self.state.query()
    }

    /// Statistics so far
    pub fn stats(&self) -> &WalkStats {
        self.state.stats()
    }

    /// Give back the query, positioned where the walk left it
    pub fn into_query(self) -> PageQuery {
        self.state.into_query()
    }
}

impl<M, P> fmt::Debug for PageIter<M, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageIter")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<M, P> Iterator for PageIter<M, P>
where
    M: Clone,
    P: PageProducer<M>,
{
    type Item = Result<M>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state.prepare() {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => return Some(Err(e)),
        }

        let page = match self
            .producer
            .next_page(self.state.query(), self.previous.as_ref())
        {
            Ok(page) => page,
            Err(e) => {
                self.state.fail();
                return Some(Err(e));
            }
        };

        match self.state.record(page.size(), page.total()) {
            Ok(Step::Yield) => {
                let data = page.into_data();
                // the producer is never called again after a final batch
                self.previous = if self.state.is_stopping() {
                    None
                } else {
                    Some(data.clone())
                };
                Some(Ok(data))
            }
            Ok(Step::Done) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl<M, P> FusedIterator for PageIter<M, P>
where
    M: Clone,
    P: PageProducer<M>,
{
}
