// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Blocking hand-off queue between the producer and a worker pool.

use parking_lot::{Condvar, Mutex};
use quarry_core::WorkBatch;
use tracing::debug;

/// A thread-safe queue of work batches with blocking take.
///
/// The queue itself enforces no capacity cap; the producer bounds depth by
/// checking [`is_near_empty`](Self::is_near_empty) before stuffing more
/// work. Delivery is last-in-first-served: batch freshness matters more
/// than FIFO fairness here, and fairness across bins is the load tracker's
/// job, not the queue's.
#[derive(Debug, Default)]
pub struct WorkQueue {
    batches: Mutex<Vec<WorkBatch>>,
    takers: Condvar,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch and wake one blocked consumer.
    pub fn add(&self, batch: WorkBatch) {
        let mut batches = self.batches.lock();
        batches.push(batch);
        self.takers.notify_one();
    }

    /// Remove and return one batch, blocking while the queue is empty.
    ///
    /// Returns `None` when a wake delivers nothing — that is the reset (or
    /// shutdown) notification, and the caller should re-check overall pool
    /// state before trying again. Safe for any number of concurrent
    /// callers; each queued batch is delivered to exactly one of them.
    pub fn take(&self) -> Option<WorkBatch> {
        let mut batches = self.batches.lock();
        if let Some(batch) = batches.pop() {
            return Some(batch);
        }
        self.takers.wait(&mut batches);
        batches.pop()
    }

    /// Whether the queue has drained to at most `low_water` batches. The
    /// producer stuffs more work only when this reports true, which keeps it
    /// from front-running the consumers without starving them either.
    pub fn is_near_empty(&self, low_water: usize) -> bool {
        self.batches.lock().len() <= low_water
    }

    /// Wake every blocked [`take`](Self::take) caller without delivering
    /// work, so all of them observe a pool-wide notification.
    pub fn reset(&self) {
        let batches = self.batches.lock();
        self.takers.notify_all();
        drop(batches);
    }

    /// Discard everything queued and return how many batches were dropped.
    ///
    /// Repair-cycle use only. The discarded items are not marked processed;
    /// the job-state repair step is responsible for making their documents
    /// due again.
    pub fn clear(&self) -> usize {
        let mut batches = self.batches.lock();
        let discarded = batches.len();
        batches.clear();
        if discarded > 0 {
            debug!(discarded, "cleared work queue");
        }
        discarded
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
