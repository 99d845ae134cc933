//! Async walk module
//!
//! Drives the same [`WalkState`] as the blocking engine, but awaits an
//! [`AsyncPageProducer`] for every batch. A walk is pulled either batch by
//! batch with [`Walk::next_batch`] or as a `futures::Stream`.
//!
//! ```rust,ignore
//! use futures::TryStreamExt;
//! use pagewalk::stream::{AsyncPaged, AsyncPager};
//!
//! let pager = AsyncPager::new(100, AsyncPaged(|query| async move { api.list(query).await }))?;
//! let rows: Vec<Row> = pager.into_walk().into_items().try_collect().await?;
//! ```

mod types;

pub use types::{AsyncFn, AsyncOrdered, AsyncPageProducer, AsyncPaged};

use crate::engine::{Step, WalkState, WalkStats, DEFAULT_TIMES_LIMIT};
use crate::error::{Error, Result};
use crate::pagination::{Page, PageQuery};
use async_trait::async_trait;
use futures::stream::{self, Stream, TryStreamExt};
use std::fmt;
use std::marker::PhantomData;

#[async_trait]
impl<M, P> AsyncPageProducer<M> for &mut P
where
    M: Send + Sync,
    P: AsyncPageProducer<M> + ?Sized,
{
    async fn next_page(&mut self, query: &PageQuery, last: Option<&M>) -> Result<Page<M>> {
        (**self).next_page(query, last).await
    }
}

/// A paginated async source of `M` batches
#[derive(Clone)]
pub struct AsyncPager<M, P> {
    query: PageQuery,
    producer: P,
    times_limit: usize,
    _marker: PhantomData<fn() -> M>,
}

impl<M, P> AsyncPager<M, P>
where
    M: Clone + Send + Sync,
    P: AsyncPageProducer<M>,
{
    /// Create a pager fetching `batch_size` elements per page, from page 1
    pub fn new(batch_size: usize, producer: P) -> Result<Self> {
        let query = PageQuery::first_page(batch_size)
            .map_err(|_| Error::invalid_value("batch_size", "must be at least 1"))?;
        Ok(Self::with_query(query, producer))
    }

    /// Create a pager that walks a caller-supplied query
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

    /// Maximum number of batches per walk
    pub fn times_limit(&self) -> usize {
        self.times_limit
    }

    /// Elements requested per batch
    pub fn batch_size(&self) -> usize {
        self.query.limit()
    }

    /// Walk the source, keeping the pager for later walks
    pub fn walk(&mut self) -> Walk<M, &mut P> {
        let query = self.start_query();
        Walk::new(query, &mut self.producer, self.times_limit)
    }

    /// Consume the pager into a single walk
    pub fn into_walk(self) -> Walk<M, P> {
        let query = self.start_query();
        Walk::new(query, self.producer, self.times_limit)
    }

    fn start_query(&self) -> PageQuery {
        let mut query = self.query.clone();
        query.first();
        query
    }
}

impl<M, P> fmt::Debug for AsyncPager<M, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncPager")
            .field("query", &self.query)
            .field("times_limit", &self.times_limit)
            .finish_non_exhaustive()
    }
}

/// One async walk over a paginated source
pub struct Walk<M, P> {
    producer: P,
    state: WalkState,
    previous: Option<M>,
}

impl<M, P> fmt::Debug for Walk<M, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Walk")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<M, P> Walk<M, P>
where
    M: Clone + Send + Sync,
    P: AsyncPageProducer<M>,
{
    /// Start a walk at `query`
    pub fn new(query: PageQuery, producer: P, times_limit: usize) -> Self {
        Self {
            producer,
            state: WalkState::new(query, times_limit),
            previous: None,
        }
    }

    /// Statistics so far
    pub fn stats(&self) -> &WalkStats {
        self.state.stats()
    }

    /// The query of the most recent fetch
    pub fn query(&self) -> &PageQuery {
        self.state.query()
    }

    /// Fetch the next batch.
    ///
    /// Returns `None` once the walk is over; after an error every later call
    /// returns `None` without touching the producer.
    pub async fn next_batch(&mut self) -> Option<Result<M>> {
        match self.state.prepare() {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => return Some(Err(e)),
        }

        let fetched = self
            .producer
            .next_page(self.state.query(), self.previous.as_ref())
            .await;
        let page = match fetched {
            Ok(page) => page,
            Err(e) => {
                self.state.fail();
                return Some(Err(e));
            }
        };

        match self.state.record(page.size(), page.total()) {
            Ok(Step::Yield) => {
                let data = page.into_data();
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

    /// Turn the walk into a stream of batches
    pub fn into_stream(self) -> impl Stream<Item = Result<M>> {
        stream::unfold(self, |mut walk| async move {
            let batch = walk.next_batch().await?;
            Some((batch, walk))
        })
    }
}

impl<T, P> Walk<Vec<T>, P>
where
    T: Clone + Send + Sync,
    P: AsyncPageProducer<Vec<T>>,
{
    /// Turn the walk into a stream of single elements, in source order
    pub fn into_items(self) -> impl Stream<Item = Result<T>> {
        self.into_stream()
            .map_ok(|batch| stream::iter(batch.into_iter().map(Ok::<T, Error>)))
            .try_flatten()
    }
}
