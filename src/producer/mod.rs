//! Producer module
//!
//! Producers fetch one batch per call. Two styles are supported:
//!
//! - **Page number**: the fetch reads `query.page()` / `query.offset()`
//! - **Keyset**: the fetch receives the last element of the previous batch
//!   and asks for the next `limit` elements after it
//!
//! A fetch may return any source-shaped value; [`Mappers`] turn it into a
//! [`Page`](crate::pagination::Page) through a [`DelegatedProducer`].

mod delegated;
mod types;

pub use delegated::{
    from_fn, of_collection, of_model, of_paged_collection, CollectionProducer, DelegatedProducer,
    Mappers, PagedCollectionProducer,
};
pub use types::{DataProducer, LastElement, PageFn, PageProducer, ProducerRef};
