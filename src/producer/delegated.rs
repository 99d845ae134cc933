//! Delegated producers
//!
//! Lets a fetch return whatever its data source naturally returns and maps
//! that value to a [`Page`] afterwards.

use super::types::{DataProducer, LastElement, PageFn, PageProducer};
use crate::error::Result;
use crate::pagination::{Page, PageQuery};
use std::fmt;
use std::marker::PhantomData;

type ElementsFn<D, M> = Box<dyn Fn(D) -> M>;
type SizeFn<D> = Box<dyn Fn(&D) -> usize>;
type TotalFn<D> = Box<dyn Fn(&D) -> u64>;

/// The three functions that turn a raw value `D` into a page of `M`
pub struct Mappers<D, M> {
    elements: ElementsFn<D, M>,
    size: SizeFn<D>,
    total: Option<TotalFn<D>>,
}

impl<D, M> Mappers<D, M> {
    /// Create mappers from an elements extractor and a size extractor
    pub fn new(
        elements: impl Fn(D) -> M + 'static,
        size: impl Fn(&D) -> usize + 'static,
    ) -> Self {
        Self {
            elements: Box::new(elements),
            size: Box::new(size),
            total: None,
        }
    }

    /// Add a total-count extractor
    #[must_use]
    pub fn with_total(mut self, total: impl Fn(&D) -> u64 + 'static) -> Self {
        self.total = Some(Box::new(total));
        self
    }

    /// Whether a total-count extractor is set
    pub fn has_total(&self) -> bool {
        self.total.is_some()
    }

    /// Map a raw value to a page. Size and total are read before the
    /// elements take ownership of the value.
    pub fn apply(&self, raw: D) -> Page<M> {
        let size = (self.size)(&raw);
        let total = self.total.as_ref().map(|total| total(&raw));
        let data = (self.elements)(raw);
        match total {
            Some(total) => Page::with_total(data, size, total),
            None => Page::new(data, size),
        }
    }
}

impl<M: 'static> Mappers<M, M> {
    /// Identity elements with a custom size extractor
    pub fn model(size: impl Fn(&M) -> usize + 'static) -> Self {
        Self::new(|model| model, size)
    }
}

impl<T: 'static> Mappers<Vec<T>, Vec<T>> {
    /// Identity elements sized by vector length
    pub fn collection() -> Self {
        Self::new(|batch| batch, Vec::len)
    }
}

impl<D, M> fmt::Debug for Mappers<D, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mappers")
            .field("has_total", &self.has_total())
            .finish_non_exhaustive()
    }
}

/// A raw fetch composed with [`Mappers`]
pub struct DelegatedProducer<P, D, M> {
    fetch: P,
    mappers: Mappers<D, M>,
    _marker: PhantomData<fn() -> D>,
}

impl<P, D, M> DelegatedProducer<P, D, M>
where
    P: DataProducer<M, D>,
{
    /// Create a producer from a raw fetch and its mappers
    pub fn new(fetch: P, mappers: Mappers<D, M>) -> Self {
        Self {
            fetch,
            mappers,
            _marker: PhantomData,
        }
    }
}

impl<P, D, M> PageProducer<M> for DelegatedProducer<P, D, M>
where
    P: DataProducer<M, D>,
{
    fn next_page(&mut self, query: &PageQuery, last: Option<&M>) -> Result<Page<M>> {
        let raw = self.fetch.fetch(query, last)?;
        Ok(self.mappers.apply(raw))
    }
}

impl<P, D, M> fmt::Debug for DelegatedProducer<P, D, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegatedProducer")
            .field("mappers", &self.mappers)
            .finish_non_exhaustive()
    }
}

/// Producer of vector batches whose fetch sees the last element of the
/// previous batch
pub type CollectionProducer<F, T> = DelegatedProducer<LastElement<F>, Vec<T>, Vec<T>>;

/// Producer of vector batches whose fetch only sees the query
pub type PagedCollectionProducer<F, T> = DelegatedProducer<PageFn<F>, Vec<T>, Vec<T>>;

/// Wrap a keyset fetch returning vectors
pub fn of_collection<T, F>(fetch: F) -> CollectionProducer<F, T>
where
    T: 'static,
    F: FnMut(&PageQuery, Option<&T>) -> Result<Vec<T>>,
{
    DelegatedProducer::new(LastElement(fetch), Mappers::collection())
}

/// Wrap a page-number fetch returning vectors
pub fn of_paged_collection<T, F>(fetch: F) -> PagedCollectionProducer<F, T>
where
    T: 'static,
    F: FnMut(&PageQuery) -> Result<Vec<T>>,
{
    DelegatedProducer::new(PageFn(fetch), Mappers::collection())
}

/// Wrap a fetch whose payload is its own element type, sized by `size`
pub fn of_model<M, F>(fetch: F, size: impl Fn(&M) -> usize + 'static) -> DelegatedProducer<F, M, M>
where
    M: 'static,
    F: FnMut(&PageQuery, Option<&M>) -> Result<M>,
{
    DelegatedProducer::new(fetch, Mappers::model(size))
}

/// Wrap a page-number fetch returning a page directly
pub fn from_fn<M, F>(mut fetch: F) -> impl PageProducer<M>
where
    F: FnMut(&PageQuery) -> Result<Page<M>>,
{
    move |query: &PageQuery, _last: Option<&M>| fetch(query)
}
