//! Flattening module
//!
//! [`ItemPager`] walks a source whose batches are vectors and hands out the
//! elements one at a time, in source order.
//!
//! ```rust,ignore
//! use pagewalk::flatten::ItemPager;
//!
//! let rows = ItemPager::new(500, |query| db.select(query.offset_or_zero(), query.limit()))?;
//! for row in rows {
//!     handle(row?);
//! }
//! ```

use crate::engine::{ModelPager, PageIter, WalkStats, DEFAULT_ITEM_TIMES_LIMIT};
use crate::error::Result;
use crate::pagination::PageQuery;
use crate::producer::{
    self, CollectionProducer, DelegatedProducer, LastElement, Mappers, PageFn,
    PageProducer, PagedCollectionProducer, ProducerRef,
};
use std::fmt;
use std::iter::FusedIterator;

/// A paginated source of `T` elements
#[derive(Clone)]
pub struct ItemPager<T, P> {
    pager: ModelPager<Vec<T>, P>,
}

impl<T, P> fmt::Debug for ItemPager<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemPager").field("pager", &self.pager).finish()
    }
}

impl<T, P> ItemPager<T, P>
where
    T: Clone,
    P: PageProducer<Vec<T>>,
{
    /// Wrap an existing batch-level pager
    pub fn from_pager(pager: ModelPager<Vec<T>, P>) -> Self {
        Self { pager }
    }

    /// Set the maximum number of batches per walk
    #[must_use]
    pub fn with_times_limit(mut self, times_limit: usize) -> Self {
        self.pager.set_times_limit(times_limit);
        self
    }

    /// Change the maximum number of batches per walk
    pub fn set_times_limit(&mut self, times_limit: usize) {
        self.pager.set_times_limit(times_limit);
    }

    /// Maximum number of batches per walk
    pub fn times_limit(&self) -> usize {
        self.pager.times_limit()
    }

    /// Elements requested per batch
    pub fn batch_size(&self) -> usize {
        self.pager.batch_size()
    }

    /// Walk all elements, keeping the pager for later walks
    pub fn concat(&mut self) -> Items<T, ProducerRef<'_, P>> {
        Items::new(self.pager.iter())
    }

    /// Walk all elements, mapping each one as it is pulled
    pub fn concat_map<'a, U, F>(&'a mut self, mut f: F) -> impl Iterator<Item = Result<U>> + 'a
    where
        F: FnMut(T) -> U + 'a,
        U: 'a,
    {
        self.concat().map(move |item| item.map(&mut f))
    }

    /// Consume the pager, mapping each element as it is pulled
    pub fn into_map<U, F>(self, mut f: F) -> impl Iterator<Item = Result<U>>
    where
        F: FnMut(T) -> U,
    {
        self.into_iter().map(move |item| item.map(&mut f))
    }
}

impl<T, F> ItemPager<T, PagedCollectionProducer<F, T>>
where
    T: Clone + 'static,
    F: FnMut(&PageQuery) -> Result<Vec<T>>,
{
    /// Create a pager from a page-number fetch returning at most
    /// `batch_size` elements per call
    pub fn new(batch_size: usize, fetch: F) -> Result<Self> {
        let pager = ModelPager::new(batch_size, producer::of_paged_collection(fetch))?;
        Ok(Self::from_pager(pager.with_times_limit(DEFAULT_ITEM_TIMES_LIMIT)))
    }

    /// Create a pager that walks a caller-supplied query
    pub fn with_query(query: PageQuery, fetch: F) -> Self {
        let pager = ModelPager::with_query(query, producer::of_paged_collection(fetch));
        Self::from_pager(pager.with_times_limit(DEFAULT_ITEM_TIMES_LIMIT))
    }
}

impl<T, F> ItemPager<T, CollectionProducer<F, T>>
where
    T: Clone + 'static,
    F: FnMut(&PageQuery, Option<&T>) -> Result<Vec<T>>,
{
    /// Create a keyset pager: `fetch` receives the last element of the
    /// previous batch (absent on the first call) and returns the elements
    /// that follow it
    pub fn ordered(batch_size: usize, fetch: F) -> Result<Self> {
        let pager = ModelPager::new(batch_size, producer::of_collection(fetch))?;
        Ok(Self::from_pager(pager.with_times_limit(DEFAULT_ITEM_TIMES_LIMIT)))
    }
}

impl<T, D, F> ItemPager<T, DelegatedProducer<PageFn<F>, D, Vec<T>>>
where
    T: Clone,
    F: FnMut(&PageQuery) -> Result<D>,
{
    /// Create a pager from a page-number fetch returning a source-shaped
    /// value, mapped to elements by `mappers`
    pub fn of(batch_size: usize, fetch: F, mappers: Mappers<D, Vec<T>>) -> Result<Self> {
        let producer = DelegatedProducer::new(PageFn(fetch), mappers);
        let pager = ModelPager::new(batch_size, producer)?;
        Ok(Self::from_pager(pager.with_times_limit(DEFAULT_ITEM_TIMES_LIMIT)))
    }
}

impl<T, D, F> ItemPager<T, DelegatedProducer<LastElement<F>, D, Vec<T>>>
where
    T: Clone,
    F: FnMut(&PageQuery, Option<&T>) -> Result<D>,
{
    /// Keyset flavor of [`ItemPager::of`]
    pub fn of_ordered(batch_size: usize, fetch: F, mappers: Mappers<D, Vec<T>>) -> Result<Self> {
        let producer = DelegatedProducer::new(LastElement(fetch), mappers);
        let pager = ModelPager::new(batch_size, producer)?;
        Ok(Self::from_pager(pager.with_times_limit(DEFAULT_ITEM_TIMES_LIMIT)))
    }
}

impl<T, P> IntoIterator for ItemPager<T, P>
where
    T: Clone,
    P: PageProducer<Vec<T>>,
{
    type Item = Result<T>;
    type IntoIter = Items<T, P>;

    fn into_iter(self) -> Self::IntoIter {
        Items::new(self.pager.into_iter())
    }
}

impl<'a, T, P> IntoIterator for &'a mut ItemPager<T, P>
where
    T: Clone,
    P: PageProducer<Vec<T>>,
{
    type Item = Result<T>;
    type IntoIter = Items<T, ProducerRef<'a, P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.concat()
    }
}

/// Element-level walk over vector batches
///
/// Holds at most one fetched batch; the next batch is requested only once
/// the current one is used up.
pub struct Items<T, P> {
    pages: PageIter<Vec<T>, P>,
    current: std::vec::IntoIter<T>,
}

impl<T, P> Items<T, P>
where
    T: Clone,
    P: PageProducer<Vec<T>>,
{
    fn new(pages: PageIter<Vec<T>, P>) -> Self {
        Self {
            pages,
            current: Vec::new().into_iter(),
        }
    }

    /// Batch-level statistics so far
    pub fn stats(&self) -> &WalkStats {
        self.pages.stats()
    }
}

impl<T, P> fmt::Debug for Items<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Items")
            .field("pages", &self.pages)
            .field("buffered", &self.current.len())
            .finish()
    }
}

impl<T, P> Iterator for Items<T, P>
where
    T: Clone,
    P: PageProducer<Vec<T>>,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.current.next() {
                return Some(Ok(item));
            }
            match self.pages.next()? {
                Ok(batch) => self.current = batch.into_iter(),
                Err(e) => return Some(Err(e)),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (buffered, _) = self.current.size_hint();
        (buffered, None)
    }
}

impl<T, P> FusedIterator for Items<T, P>
where
    T: Clone,
    P: PageProducer<Vec<T>>,
{
}

#[cfg(test)]
mod tests;
