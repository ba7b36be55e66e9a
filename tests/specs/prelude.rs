//! Shared fixtures for the behavioral specifications.
//!
//! Everything here goes through the public API only: an in-memory job-state
//! store on one side of a pool, a recording processor on the other.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use quarry_core::{
    BinName, ConnectionSnapshot, CrawlError, DocumentId, JobId, JobSnapshot, WorkBatch, WorkItem,
};
use quarry_engine::{BatchProcessor, FatalErrorSink, JobStateStore, PoolConfig};

/// Poll until `cond` holds, panicking with `what` after five seconds.
pub fn wait_until(what: &str, mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting until {what}");
        std::thread::sleep(Duration::from_millis(5));
    }
}

/// Fast-paced pool sizing for tests.
pub fn test_config(workers: usize) -> PoolConfig {
    PoolConfig {
        workers,
        low_water_factor: 1,
        stuff_size_factor: 1,
        max_stuff_factor: 4,
        idle_poll: Duration::from_millis(5),
        fault_backoff: Duration::from_millis(5),
    }
}

pub fn job() -> Arc<JobSnapshot> {
    Arc::new(JobSnapshot::new("job-1", "web"))
}

pub fn connection(budget: u32) -> Arc<ConnectionSnapshot> {
    Arc::new(ConnectionSnapshot::new("web", budget))
}

/// A single-bin document-processing batch.
pub fn fetch_batch(docs: &[&str], bin: &str, budget: u32) -> WorkBatch {
    let items = docs
        .iter()
        .map(|doc| WorkItem::fetch(*doc, vec![BinName::new(bin)]))
        .collect();
    WorkBatch::with_connection(items, job(), connection(budget)).unwrap()
}

/// A job-deletion batch (no bins, no connection).
pub fn delete_batch(docs: &[&str]) -> WorkBatch {
    let items = docs.iter().map(|doc| WorkItem::delete(*doc)).collect();
    WorkBatch::new(items, job()).unwrap()
}

/// In-memory job-state store. Flip `healthy` off to simulate the backing
/// store dropping out from under the pool.
#[derive(Default)]
pub struct MemoryStore {
    pub healthy: AtomicBool,
    pub due: Mutex<VecDeque<WorkBatch>>,
    pub requeued: Mutex<Vec<String>>,
    pub fetch_resets: AtomicUsize,
    pub cleanup_resets: AtomicUsize,
    pub delete_resets: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        let store = Self::default();
        store.healthy.store(true, Ordering::Release);
        Arc::new(store)
    }

    pub fn push_due(&self, batch: WorkBatch) {
        self.due.lock().push_back(batch);
    }

    fn check(&self) -> Result<(), CrawlError> {
        if self.healthy.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(CrawlError::StoreConnectionLost("connection reset".into()))
        }
    }
}

impl JobStateStore for MemoryStore {
    fn check_job_active(&self, _job: &JobId) -> Result<bool, CrawlError> {
        self.check()?;
        Ok(true)
    }

    fn requeue_document(&self, _job: &JobId, document: &DocumentId) -> Result<(), CrawlError> {
        self.check()?;
        self.requeued.lock().push(document.to_string());
        Ok(())
    }

    fn reset_fetch_documents(&self) -> Result<(), CrawlError> {
        self.check()?;
        self.fetch_resets.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn reset_cleanup_documents(&self) -> Result<(), CrawlError> {
        self.check()?;
        self.cleanup_resets.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn reset_delete_documents(&self) -> Result<(), CrawlError> {
        self.check()?;
        self.delete_resets.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn next_batches(&self, max: usize) -> Result<Vec<WorkBatch>, CrawlError> {
        self.check()?;
        let mut due = self.due.lock();
        let take = max.min(due.len());
        Ok(due.drain(..take).collect())
    }
}

/// Marks every item processed and counts how often each document was seen.
/// While `hold` is set, processing parks until released, so tests can
/// observe a pool with work deliberately in flight.
#[derive(Default)]
pub struct RecordingProcessor {
    pub seen: Mutex<HashMap<String, usize>>,
    pub hold: AtomicBool,
}

impl RecordingProcessor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn total(&self) -> usize {
        self.seen.lock().values().sum()
    }

    pub fn saw(&self, doc: &str) -> bool {
        self.seen.lock().contains_key(doc)
    }

    pub fn release(&self) {
        self.hold.store(false, Ordering::Release);
    }
}

impl BatchProcessor for RecordingProcessor {
    fn process(&self, batch: &WorkBatch) -> Result<(), CrawlError> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while self.hold.load(Ordering::Acquire) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        let mut seen = self.seen.lock();
        for item in batch.items() {
            item.mark_processed();
            *seen.entry(item.document().to_string()).or_insert(0) += 1;
        }
        Ok(())
    }
}

/// Records fatal-error reports instead of shutting anything down.
#[derive(Default)]
pub struct RecordingSink {
    pub reports: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl FatalErrorSink for RecordingSink {
    fn fatal_error(&self, component: &str, message: &str) {
        self.reports
            .lock()
            .push((component.to_string(), message.to_string()));
    }
}
