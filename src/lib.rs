// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]

//! # pagewalk
//!
//! Turn any page-based data source into a single lazy sequence.
//!
//! A caller supplies a fetch function that knows how to read one batch;
//! pagewalk drives it page by page, decides when the source is exhausted,
//! and guards against producers that misbehave.
//!
//! ## Features
//!
//! - **Page number or keyset**: fetch by page/offset, or by the last element seen
//! - **Early stop**: short batches, empty batches, and reported totals end the walk
//! - **Safety valve**: a batch limit stops producers that never run dry
//! - **Flattening**: walk elements instead of batches, optionally mapped
//! - **Async**: the same walk as a `futures::Stream`
//! - **HTTP source**: walk JSON APIs from YAML or the `pagewalk` CLI
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagewalk::{ItemPager, Result};
//!
//! fn main() -> Result<()> {
//!     let rows = ItemPager::new(100, |query| {
//!         db.select("SELECT * FROM events LIMIT ? OFFSET ?", query.limit(), query.offset_or_zero())
//!     })?;
//!
//!     for row in rows {
//!         println!("{:?}", row?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │   ItemPager (elements)          stream::Walk (async)         │
//! └───────────────┬──────────────────────────────┬───────────────┘
//!                 │                              │
//! ┌───────────────┴──────────────────────────────┴───────────────┐
//! │   ModelPager / PageIter  ──  WalkState (termination policy)  │
//! └───────────────┬──────────────────────────────────────────────┘
//!                 │ (PageQuery, previous payload)
//! ┌───────────────┴──────────────────────────────────────────────┐
//! │   PageProducer  ──  DelegatedProducer + Mappers  ──  fetch   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Page queries and batch results
pub mod pagination;

/// Batch producers and adapters
pub mod producer;

/// Lazy batch walk and termination policy
pub mod engine;

/// Element-level walks over vector batches
pub mod flatten;

/// Async walks and streams
pub mod stream;

/// HTTP JSON source
pub mod http;

/// Walk definitions
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use engine::{ModelPager, PageIter, Termination, WalkStats};
pub use error::{Error, Result};
pub use flatten::ItemPager;
pub use pagination::{Page, PageQuery, QueryMode};
pub use producer::{DelegatedProducer, Mappers, PageProducer};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
