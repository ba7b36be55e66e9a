// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-bin load accounting for fair batch assignment.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::batch::WorkBatch;
use crate::connection::ConnectionSnapshot;
use crate::item::BinName;

/// Tracks how much work is in flight per resource bin and turns that into a
/// comparable load rating for candidate batches.
///
/// Counters are bumped by many worker threads and read concurrently by the
/// producer. Ratings are a best-effort fairness signal, not a capacity
/// limiter: a rating computed from a count that is a moment stale is still a
/// valid answer.
#[derive(Debug, Default)]
pub struct BinLoadTracker {
    active: Mutex<HashMap<BinName, usize>>,
}

impl BinLoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a worker started on a document with these bins. Exactly
    /// once per document per batch, at the moment the batch starts.
    pub fn begin_processing(&self, bins: &[BinName]) {
        let mut active = self.active.lock();
        for bin in bins {
            *active.entry(bin.clone()).or_insert(0) += 1;
        }
    }

    /// Record that the work on a document with these bins finished, whether
    /// it succeeded or not. Must pair with a prior
    /// [`begin_processing`](Self::begin_processing) call.
    pub fn end_processing(&self, bins: &[BinName]) {
        let mut active = self.active.lock();
        for bin in bins {
            if let Some(count) = active.get_mut(bin.as_str()) {
                *count -= 1;
                if *count == 0 {
                    active.remove(bin.as_str());
                }
            }
        }
    }

    /// Current in-flight count for one bin.
    pub fn in_flight(&self, bin: &str) -> usize {
        self.active.lock().get(bin).copied().unwrap_or(0)
    }

    /// Contention score for one document's bin set against a connection's
    /// concurrency budget: per bin, the in-flight count divided by the
    /// budget, averaged across the bins. Lower is better; an unbinned
    /// document rates 0.0 (nothing to contend on).
    pub fn rating(&self, bins: &[BinName], connection: &ConnectionSnapshot) -> f64 {
        if bins.is_empty() {
            return 0.0;
        }
        let budget = f64::from(connection.max_connections().max(1));
        let active = self.active.lock();
        let total: f64 = bins
            .iter()
            .map(|bin| active.get(bin).copied().unwrap_or(0) as f64 / budget)
            .sum();
        total / bins.len() as f64
    }

    /// A batch's rating is the mean of its documents' scores. Batches with
    /// no connection context (delete/cleanup work) rate 0.0 — they are not
    /// competing for throttled resources.
    pub fn batch_rating(&self, batch: &WorkBatch) -> f64 {
        let Some(connection) = batch.connection() else {
            return 0.0;
        };
        let total: f64 = batch
            .items()
            .iter()
            .map(|item| self.rating(item.bins(), connection))
            .sum();
        // Batches are non-empty by construction.
        total / batch.count() as f64
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
