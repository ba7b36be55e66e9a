// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The producer side of a pool: keeps the work queue stuffed.

use std::sync::Arc;

use quarry_core::{BinLoadTracker, CrawlError, WorkBatch};
use tracing::debug;

use crate::barrier::ResetBarrier;
use crate::queue::WorkQueue;
use crate::store::JobStateStore;
use crate::supervisor::Tick;

/// Single-threaded producer body.
///
/// Each turn waits out any pending reset, checks the queue against the low
/// water mark, and if the consumers are close to starving fetches the next
/// slug of due batches from the store. The fetch size adapts to demand:
/// it doubles whenever the store filled the whole request (the workers are
/// outpacing us) and falls back to the floor after a partial fill.
pub struct Stuffer {
    queue: Arc<WorkQueue>,
    barrier: Arc<ResetBarrier>,
    tracker: Arc<BinLoadTracker>,
    store: Arc<dyn JobStateStore>,
    low_water: usize,
    lowest_stuff: usize,
    max_stuff: usize,
    stuff_amount: usize,
}

impl Stuffer {
    pub fn new(
        queue: Arc<WorkQueue>,
        barrier: Arc<ResetBarrier>,
        tracker: Arc<BinLoadTracker>,
        store: Arc<dyn JobStateStore>,
        low_water: usize,
        lowest_stuff: usize,
        max_stuff: usize,
    ) -> Self {
        let lowest_stuff = lowest_stuff.max(1);
        Self {
            queue,
            barrier,
            tracker,
            store,
            low_water,
            lowest_stuff,
            max_stuff: max_stuff.max(lowest_stuff),
            stuff_amount: lowest_stuff,
        }
    }

    /// Current adaptive fetch size, visible for tests.
    pub fn stuff_amount(&self) -> usize {
        self.stuff_amount
    }

    /// One supervised producer turn.
    pub fn turn(&mut self) -> Result<Tick, CrawlError> {
        self.barrier.wait_for_reset()?;

        if !self.queue.is_near_empty(self.low_water) {
            return Ok(Tick::Idle);
        }

        let asked = self.stuff_amount;
        let batches = self
            .store
            .next_batches(asked)
            .map_err(|err| self.barrier.note_fault(err))?;
        if batches.is_empty() {
            return Ok(Tick::Idle);
        }

        if batches.len() == asked {
            self.stuff_amount = (asked * 2).min(self.max_stuff);
        } else {
            self.stuff_amount = self.lowest_stuff;
        }

        // The queue serves most-recently-added first, so enqueue in
        // descending load-rating order: the least contended batch lands on
        // top and is handed out next.
        let mut rated: Vec<(f64, WorkBatch)> = batches
            .into_iter()
            .map(|batch| (self.tracker.batch_rating(&batch), batch))
            .collect();
        rated.sort_by(|a, b| b.0.total_cmp(&a.0));

        let stuffed = rated.len();
        for (_, batch) in rated {
            self.queue.add(batch);
        }
        debug!(stuffed, asked, "stuffed work queue");
        Ok(Tick::Busy)
    }
}

#[cfg(test)]
#[path = "stuffer_tests.rs"]
mod tests;
