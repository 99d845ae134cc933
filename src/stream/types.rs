//! Async producer trait and closure adapters

use crate::error::Result;
use crate::pagination::{Page, PageQuery};
use async_trait::async_trait;
use std::future::Future;

/// Async counterpart of [`PageProducer`](crate::producer::PageProducer)
///
/// Called at most once at a time per walk; the walk awaits each batch
/// before deciding whether to ask for the next.
#[async_trait]
pub trait AsyncPageProducer<M: Send + Sync>: Send {
    /// Fetch the batch addressed by `query`.
    ///
    /// `last` is the payload of the previous batch, absent on the first call.
    async fn next_page(&mut self, query: &PageQuery, last: Option<&M>) -> Result<Page<M>>;
}

/// Closure producer receiving owned copies of the query and previous payload
#[derive(Debug, Clone)]
pub struct AsyncFn<F>(pub F);

#[async_trait]
impl<M, F, Fut> AsyncPageProducer<M> for AsyncFn<F>
where
    M: Clone + Send + Sync,
    F: FnMut(PageQuery, Option<M>) -> Fut + Send,
    Fut: Future<Output = Result<Page<M>>> + Send + 'static,
{
    async fn next_page(&mut self, query: &PageQuery, last: Option<&M>) -> Result<Page<M>> {
        (self.0)(query.clone(), last.cloned()).await
    }
}

/// Page-number collection producer: the fetch sees only the query
#[derive(Debug, Clone)]
pub struct AsyncPaged<F>(pub F);

#[async_trait]
impl<T, F, Fut> AsyncPageProducer<Vec<T>> for AsyncPaged<F>
where
    T: Send + Sync,
    F: FnMut(PageQuery) -> Fut + Send,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
{
    async fn next_page(&mut self, query: &PageQuery, _last: Option<&Vec<T>>) -> Result<Page<Vec<T>>> {
        let rows = (self.0)(query.clone()).await?;
        Ok(Page::from_vec(rows))
    }
}

/// Keyset collection producer: the fetch sees the last element of the
/// previous batch
#[derive(Debug, Clone)]
pub struct AsyncOrdered<F>(pub F);

#[async_trait]
impl<T, F, Fut> AsyncPageProducer<Vec<T>> for AsyncOrdered<F>
where
    T: Clone + Send + Sync,
    F: FnMut(PageQuery, Option<T>) -> Fut + Send,
    Fut: Future<Output = Result<Vec<T>>> + Send + 'static,
{
    async fn next_page(&mut self, query: &PageQuery, last: Option<&Vec<T>>) -> Result<Page<Vec<T>>> {
        let after = last.and_then(|batch| batch.last()).cloned();
        let rows = (self.0)(query.clone(), after).await?;
        Ok(Page::from_vec(rows))
    }
}
