//! Pagination module
//!
//! Supports: page number, offset and unpaged queries, plus the fixed
//! "all rows" and "top N" variants.
//!
//! # Overview
//!
//! The pagination module provides the two values passed between a walk and
//! its producer: the [`PageQuery`] describing the next fetch, and the
//! [`Page`] that comes back.

mod query;
mod types;

pub use query::{PageQuery, QueryMode, DEFAULT_LIMIT};
pub use types::Page;
