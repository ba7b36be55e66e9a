// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reset barriers specialized for each pool.
//!
//! Each constructor binds the generic [`ResetBarrier`] to its pool's repair
//! and wakeup behavior: which job-state transition re-derives the shared
//! persistent state, and which queues get cleared and re-woken. The repair
//! clears the queues only after the store transition succeeds — the
//! transition is what makes the discarded documents due again.

use std::sync::Arc;

use tracing::info;

use crate::barrier::ResetBarrier;
use crate::queue::WorkQueue;
use crate::store::JobStateStore;

/// Barrier for the document-processing (fetch) pool.
///
/// Repair moves this process's in-progress fetch documents back to
/// retryable, then discards both the fetch queue and the cleanup queue —
/// cleanup work is derived from fetch outcomes, so a store fault
/// invalidates both.
pub fn fetch_reset_barrier(
    store: Arc<dyn JobStateStore>,
    fetch_queue: Arc<WorkQueue>,
    cleanup_queue: Arc<WorkQueue>,
) -> Arc<ResetBarrier> {
    let repair_fetch = Arc::clone(&fetch_queue);
    let repair_cleanup = Arc::clone(&cleanup_queue);
    Arc::new(ResetBarrier::new(
        Box::new(move || {
            store.reset_fetch_documents()?;
            let discarded = repair_fetch.clear() + repair_cleanup.clear();
            info!(discarded, "fetch pool repaired");
            Ok(())
        }),
        Box::new(move || {
            fetch_queue.reset();
            cleanup_queue.reset();
        }),
    ))
}

/// Barrier for the cleanup-only pool: repair re-derives cleanup document
/// status and discards only the cleanup queue.
pub fn cleanup_reset_barrier(
    store: Arc<dyn JobStateStore>,
    cleanup_queue: Arc<WorkQueue>,
) -> Arc<ResetBarrier> {
    let repair_queue = Arc::clone(&cleanup_queue);
    Arc::new(ResetBarrier::new(
        Box::new(move || {
            store.reset_cleanup_documents()?;
            let discarded = repair_queue.clear();
            info!(discarded, "cleanup pool repaired");
            Ok(())
        }),
        Box::new(move || cleanup_queue.reset()),
    ))
}

/// Barrier for the delete pool: repair re-derives delete document status
/// and discards only the delete queue.
pub fn delete_reset_barrier(
    store: Arc<dyn JobStateStore>,
    delete_queue: Arc<WorkQueue>,
) -> Arc<ResetBarrier> {
    let repair_queue = Arc::clone(&delete_queue);
    Arc::new(ResetBarrier::new(
        Box::new(move || {
            store.reset_delete_documents()?;
            let discarded = repair_queue.clear();
            info!(discarded, "delete pool repaired");
            Ok(())
        }),
        Box::new(move || delete_queue.reset()),
    ))
}

#[cfg(test)]
#[path = "reset_tests.rs"]
mod tests;
