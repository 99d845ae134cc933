//! Engine types
//!
//! Walk statistics and the reasons a walk can end.

use serde::Serialize;
use std::fmt;

/// Default cap on batches fetched by a model-level walk
pub const DEFAULT_TIMES_LIMIT: usize = 10_000;

/// Default cap on batches fetched by an element-level (flattened) walk
pub const DEFAULT_ITEM_TIMES_LIMIT: usize = 100_000;

/// Why a walk stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The producer returned an empty batch
    EmptyBatch,
    /// The producer returned fewer elements than the limit
    ShortBatch,
    /// The elements fetched reached the producer's reported total
    TotalReached,
    /// The query cannot move past its first batch (unpaged or pinned)
    SingleRequest,
    /// The producer returned more elements than the limit
    ContractViolation,
    /// The safety valve tripped
    IterationLimit,
    /// The producer or the query reported an error
    Failed,
}

impl Termination {
    /// Whether the walk ended by running out of data
    pub fn is_exhausted(&self) -> bool {
        matches!(
            self,
            Self::EmptyBatch | Self::ShortBatch | Self::TotalReached | Self::SingleRequest
        )
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::EmptyBatch => "empty batch",
            Self::ShortBatch => "short batch",
            Self::TotalReached => "total reached",
            Self::SingleRequest => "single request",
            Self::ContractViolation => "contract violation",
            Self::IterationLimit => "iteration limit",
            Self::Failed => "failed",
        };
        f.write_str(text)
    }
}

/// Statistics from a walk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WalkStats {
    /// Producer calls made
    pub batches: usize,
    /// Elements reported by those calls
    pub elements: u64,
    /// Why the walk ended, once it has
    pub termination: Option<Termination>,
}

impl WalkStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one fetched batch
    pub fn add_batch(&mut self, size: usize) {
        self.batches += 1;
        self.elements += size as u64;
    }

    /// Whether the walk has ended
    pub fn is_finished(&self) -> bool {
        self.termination.is_some()
    }
}
