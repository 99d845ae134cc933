//! Walk state machine
//!
//! Shared by the blocking [`PageIter`](super::PageIter) and the async
//! [`stream`](crate::stream) walks. A driver calls [`WalkState::prepare`]
//! before each fetch and [`WalkState::record`] after it; the state decides
//! whether the batch is yielded and whether another fetch follows.

use super::types::{Termination, WalkStats};
use crate::error::{Error, Result};
use crate::pagination::PageQuery;
use tracing::{debug, warn};

/// What to do with a batch the producer just returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Hand the batch to the consumer
    Yield,
    /// The batch was empty; the walk is over
    Done,
}

/// Per-walk bookkeeping: query, counters, and the stop flag
#[derive(Debug, Clone)]
pub struct WalkState {
    query: PageQuery,
    times_limit: usize,
    started: bool,
    /// Set when the last yielded batch was the final one
    pending_stop: Option<Termination>,
    stats: WalkStats,
}

impl WalkState {
    /// Start a walk at `query`
    pub fn new(query: PageQuery, times_limit: usize) -> Self {
        Self {
            query,
            times_limit,
            started: false,
            pending_stop: None,
            stats: WalkStats::new(),
        }
    }

    /// The query for the upcoming (or most recent) fetch
    pub fn query(&self) -> &PageQuery {
        &self.query
    }

    /// Give the query back
    pub fn into_query(self) -> PageQuery {
        self.query
    }

    /// Statistics so far
    pub fn stats(&self) -> &WalkStats {
        &self.stats
    }

    /// Whether the walk has ended
    pub fn is_finished(&self) -> bool {
        self.stats.is_finished()
    }

    /// Whether the batch just yielded was the last one
    pub fn is_stopping(&self) -> bool {
        self.pending_stop.is_some()
    }

    /// Get ready for the next fetch.
    ///
    /// Returns `Ok(true)` when the driver should call the producer,
    /// `Ok(false)` when the walk is over.
    pub fn prepare(&mut self) -> Result<bool> {
        if self.is_finished() {
            return Ok(false);
        }
        if let Some(reason) = self.pending_stop.take() {
            self.finish(reason);
            return Ok(false);
        }

        if self.started {
            if let Err(e) = self.query.advance() {
                self.finish(Termination::Failed);
                return Err(e);
            }
        }
        self.started = true;

        if self.stats.batches > self.times_limit {
            warn!(
                times_limit = self.times_limit,
                "walk exceeded its batch limit, the producer may never terminate"
            );
            self.finish(Termination::IterationLimit);
            return Err(Error::IterationLimitExceeded {
                times_limit: self.times_limit,
            });
        }
        Ok(true)
    }

    /// Account for a fetched batch of `size` elements and decide its fate
    pub fn record(&mut self, size: usize, total: Option<u64>) -> Result<Step> {
        self.stats.add_batch(size);
        let limit = self.query.limit();
        debug!(
            query = %self.query,
            size,
            limit,
            fetched = self.stats.elements,
            "fetched batch"
        );

        if size == 0 {
            self.finish(Termination::EmptyBatch);
            return Ok(Step::Done);
        }
        if size > limit {
            warn!(size, limit, "producer returned more elements than requested");
            self.finish(Termination::ContractViolation);
            return Err(Error::ProducerContractViolation { size, limit });
        }

        if size < limit {
            self.pending_stop = Some(Termination::ShortBatch);
        } else if total.is_some_and(|total| total > 0 && self.stats.elements >= total) {
            self.pending_stop = Some(Termination::TotalReached);
        } else if !self.query.can_advance() {
            self.pending_stop = Some(Termination::SingleRequest);
        }
        Ok(Step::Yield)
    }

    /// End the walk after the producer failed
    pub fn fail(&mut self) {
        self.finish(Termination::Failed);
    }

    fn finish(&mut self, reason: Termination) {
        if self.stats.termination.is_none() {
            debug!(
                batches = self.stats.batches,
                elements = self.stats.elements,
                reason = %reason,
                "walk finished"
            );
            self.stats.termination = Some(reason);
        }
    }
}
