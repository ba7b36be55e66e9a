// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fault taxonomy shared by the producer, the worker pools, and the reset
//! barriers.
//!
//! The kinds matter more than the messages: the supervisory loop and the
//! worker bodies branch on which variant they see, so a collaborator that
//! returns the wrong kind gets the wrong recovery (a store outage reported
//! as `Processing` will never trigger a collective reset).

use thiserror::Error;

/// Errors surfaced by kernel operations and by the external collaborators
/// (job-state store, batch processors) the kernel drives.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The backing store connection was lost mid-operation. Recovered
    /// collectively: raise a fault on the pool's reset barrier and retry
    /// after the repair cycle.
    #[error("backing store connection lost: {0}")]
    StoreConnectionLost(String),

    /// Deliberate shutdown. Threads exit their loops cleanly; never logged
    /// as an error.
    #[error("interrupted")]
    Interrupted,

    /// Unrecoverable configuration problem. Not retried and never swallowed
    /// by a repair action; reported to the fatal-error sink so the process
    /// can be taken down.
    #[error("fatal configuration error: {0}")]
    FatalConfig(String),

    /// Process-level resource exhaustion (threads, memory). Fatal: not
    /// retried and never handled by the reset mechanism.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// A batch must contain at least one work item.
    #[error("a work batch must contain at least one item")]
    EmptyBatch,

    /// Anything else that goes wrong inside a worker's processing step.
    /// Logged; the worker keeps looping.
    #[error("processing error: {0}")]
    Processing(String),
}

impl CrawlError {
    /// True for the one fault kind the collective reset protocol recovers.
    pub fn is_store_fault(&self) -> bool {
        matches!(self, CrawlError::StoreConnectionLost(_))
    }

    /// True for faults that must terminate the process rather than retry.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CrawlError::FatalConfig(_) | CrawlError::ResourceExhausted(_)
        )
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
