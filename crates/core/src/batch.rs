// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A fixed group of work items handled by one worker thread.

use std::sync::Arc;

use crate::connection::ConnectionSnapshot;
use crate::error::CrawlError;
use crate::item::WorkItem;
use crate::job::JobSnapshot;
use crate::tracker::BinLoadTracker;

/// An immutable, ordered collection of work items bound to one job.
///
/// Built once by the producer, enqueued once, consumed by exactly one worker
/// thread, never mutated after enqueue. All items share the batch's job.
/// Document-processing batches additionally carry the connection snapshot
/// used for load rating; delete and cleanup batches key by job only.
#[derive(Debug)]
pub struct WorkBatch {
    items: Vec<WorkItem>,
    job: Arc<JobSnapshot>,
    connection: Option<Arc<ConnectionSnapshot>>,
}

impl WorkBatch {
    /// A delete or cleanup batch, keyed by job only.
    pub fn new(items: Vec<WorkItem>, job: Arc<JobSnapshot>) -> Result<Self, CrawlError> {
        Self::build(items, job, None)
    }

    /// A document-processing batch, carrying the connection it will fetch
    /// through.
    pub fn with_connection(
        items: Vec<WorkItem>,
        job: Arc<JobSnapshot>,
        connection: Arc<ConnectionSnapshot>,
    ) -> Result<Self, CrawlError> {
        Self::build(items, job, Some(connection))
    }

    fn build(
        items: Vec<WorkItem>,
        job: Arc<JobSnapshot>,
        connection: Option<Arc<ConnectionSnapshot>>,
    ) -> Result<Self, CrawlError> {
        if items.is_empty() {
            return Err(CrawlError::EmptyBatch);
        }
        Ok(Self {
            items,
            job,
            connection,
        })
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn item(&self, i: usize) -> Option<&WorkItem> {
        self.items.get(i)
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn job(&self) -> &JobSnapshot {
        &self.job
    }

    pub fn connection(&self) -> Option<&ConnectionSnapshot> {
        self.connection.as_deref()
    }

    /// Log this batch's bins into the tracker as in-flight.
    ///
    /// Called once by the worker that takes the batch, just before it starts
    /// the work. Brackets the whole batch rather than each item, so the
    /// in-flight accounting matches the actual unit of concurrent execution.
    /// Must always be paired with [`end_processing`](Self::end_processing).
    pub fn begin_processing(&self, tracker: &BinLoadTracker) {
        for item in &self.items {
            tracker.begin_processing(item.bins());
        }
    }

    /// Release this batch's bins from the tracker. Called once when the work
    /// completes, successfully or not.
    pub fn end_processing(&self, tracker: &BinLoadTracker) {
        for item in &self.items {
            tracker.end_processing(item.bins());
        }
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
