// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Seams to the external collaborators the kernel drives.
//!
//! The pools receive these as explicit dependencies at construction — there
//! are no ambient factories to look them up through. Implementations must
//! report faults with the right [`CrawlError`] kind: the recovery machinery
//! keys entirely off the variant (a lost store connection triggers a
//! collective reset; a configuration fault takes the process down).

use quarry_core::{CrawlError, DocumentId, JobId, WorkBatch};

/// Transition size-limited views of persistent job/document state.
///
/// Only the operations the kernel itself needs appear here; job lifecycle
/// management and connection-history logging stay with the maintenance
/// layer outside the kernel.
pub trait JobStateStore: Send + Sync {
    /// Whether the job is still active (not paused, aborted, or deleted).
    /// Batches whose job went inactive are requeued rather than processed.
    fn check_job_active(&self, job: &JobId) -> Result<bool, CrawlError>;

    /// Move one in-progress document back to a retryable status. Used for
    /// every item a worker did not mark processed, so nothing dangles when
    /// a batch is cut short.
    fn requeue_document(&self, job: &JobId, document: &DocumentId) -> Result<(), CrawlError>;

    /// Repair transition: move all of this process's in-progress fetch
    /// documents back to retryable.
    fn reset_fetch_documents(&self) -> Result<(), CrawlError>;

    /// Repair transition: move cleanup-status documents back to retryable.
    fn reset_cleanup_documents(&self) -> Result<(), CrawlError>;

    /// Repair transition: move delete-status documents back to retryable.
    fn reset_delete_documents(&self) -> Result<(), CrawlError>;

    /// Producer fetch: up to `max` batches of due work, already marked
    /// in-progress in the store.
    fn next_batches(&self, max: usize) -> Result<Vec<WorkBatch>, CrawlError>;
}

/// The opaque per-batch work a pool performs between take and loop-back.
///
/// Implementations mark each item processed as they finish with it; items
/// left unmarked on any exit path are requeued by the worker.
pub trait BatchProcessor: Send + Sync {
    fn process(&self, batch: &WorkBatch) -> Result<(), CrawlError>;
}

/// The "signal fatal configuration error" contract.
///
/// Distinct from the reset protocol: a fatal fault is not retried and not
/// repaired — whoever owns the process translates it into a full shutdown.
pub trait FatalErrorSink: Send + Sync {
    fn fatal_error(&self, component: &str, message: &str);
}
