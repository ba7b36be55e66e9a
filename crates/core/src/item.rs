// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A single document's unit of work.

use std::sync::atomic::{AtomicBool, Ordering};

crate::define_id! {
    /// Opaque key for the target document, as issued by the job-state store.
    pub struct DocumentId;
}

crate::define_id! {
    /// Named resource/throttle group a document belongs to (per-host or
    /// per-throttle-group key). Opaque to the kernel; only ever used as a
    /// counter key in the bin load tracker.
    pub struct BinName;
}

/// What a worker is expected to do with the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkItemKind {
    /// Fetch and ingest the document (document-processing pool).
    Fetch,
    /// Remove the document from the job queue as part of a job deletion.
    Delete,
    /// Clean up after a document that is no longer reachable; optionally
    /// purge it from the index as well.
    Cleanup { remove_from_index: bool },
}

/// A unit of work bound to one document.
///
/// Created by the producer when it reads due documents out of the job-state
/// store; destroyed when the containing batch finishes or is discarded by a
/// pool reset. The `processed` flag is set exactly once, by the consumer
/// that finishes handling the item — a reset discards the item rather than
/// clearing the flag.
#[derive(Debug)]
pub struct WorkItem {
    document: DocumentId,
    bins: Vec<BinName>,
    kind: WorkItemKind,
    processed: AtomicBool,
}

impl WorkItem {
    /// A document to fetch and ingest, classified into the given bins by
    /// upstream scheduling logic.
    pub fn fetch(document: impl Into<DocumentId>, bins: Vec<BinName>) -> Self {
        Self::new(document, bins, WorkItemKind::Fetch)
    }

    /// A document to remove from the job queue. Delete work is keyed by job
    /// only, so it carries no bins.
    pub fn delete(document: impl Into<DocumentId>) -> Self {
        Self::new(document, Vec::new(), WorkItemKind::Delete)
    }

    /// A document to clean up, optionally purging it from the index.
    /// `remove_from_index` is fixed at construction.
    pub fn cleanup(document: impl Into<DocumentId>, remove_from_index: bool) -> Self {
        Self::new(document, Vec::new(), WorkItemKind::Cleanup { remove_from_index })
    }

    fn new(document: impl Into<DocumentId>, bins: Vec<BinName>, kind: WorkItemKind) -> Self {
        Self {
            document: document.into(),
            bins,
            kind,
            processed: AtomicBool::new(false),
        }
    }

    pub fn document(&self) -> &DocumentId {
        &self.document
    }

    pub fn bins(&self) -> &[BinName] {
        &self.bins
    }

    pub fn kind(&self) -> WorkItemKind {
        self.kind
    }

    /// Whether a consumer has finished handling this item. Items still
    /// unprocessed when their batch is done are requeued by the worker so no
    /// document is silently dropped.
    pub fn processed(&self) -> bool {
        self.processed.load(Ordering::Acquire)
    }

    /// Record that the item was handled. Called by the consumer, once, when
    /// it finishes with the document.
    pub fn mark_processed(&self) {
        self.processed.store(true, Ordering::Release);
    }
}

#[cfg(test)]
#[path = "item_tests.rs"]
mod tests;
