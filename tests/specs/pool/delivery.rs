//! A pool hands every due document to exactly one worker.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use quarry_core::BinLoadTracker;
use quarry_engine::{fetch_reset_barrier, PoolDeps, WorkQueue, WorkerPool};

use crate::prelude::*;

struct Harness {
    store: Arc<MemoryStore>,
    processor: Arc<RecordingProcessor>,
    tracker: Arc<BinLoadTracker>,
    fatal: Arc<RecordingSink>,
    pool: WorkerPool,
}

fn start_fetch_pool(workers: usize) -> Harness {
    let store = MemoryStore::new();
    let processor = RecordingProcessor::new();
    let tracker = Arc::new(BinLoadTracker::new());
    let fatal = RecordingSink::new();
    let queue = Arc::new(WorkQueue::new());
    let cleanup_queue = Arc::new(WorkQueue::new());
    let barrier = fetch_reset_barrier(store.clone(), Arc::clone(&queue), cleanup_queue);
    let pool = WorkerPool::start(
        "fetch",
        &test_config(workers),
        queue,
        barrier,
        PoolDeps {
            store: store.clone(),
            processor: processor.clone(),
            tracker: Arc::clone(&tracker),
            fatal: fatal.clone(),
        },
    )
    .unwrap();
    Harness {
        store,
        processor,
        tracker,
        fatal,
        pool,
    }
}

#[test]
fn every_due_document_is_processed_exactly_once() {
    let mut h = start_fetch_pool(2);
    for i in 0..40 {
        h.store
            .push_due(fetch_batch(&[&format!("doc-{i}")], "hostA", 4));
    }

    wait_until("all forty documents are processed", || {
        h.processor.total() >= 40
    });
    h.pool.shutdown();

    let seen = h.processor.seen.lock();
    assert_eq!(seen.len(), 40);
    assert!(
        seen.values().all(|&times| times == 1),
        "some document was handed to more than one worker"
    );
    assert!(h.store.requeued.lock().is_empty());
    assert_eq!(h.tracker.in_flight("hostA"), 0);
    assert!(h.fatal.reports.lock().is_empty());
}

#[test]
fn in_flight_load_climbs_while_workers_hold_and_drains_after() {
    let mut h = start_fetch_pool(3);
    h.processor.hold.store(true, Ordering::Release);
    for doc in ["doc-a", "doc-b", "doc-c"] {
        h.store.push_due(fetch_batch(&[doc], "hostA", 3));
    }

    // Three workers each take one batch and park inside the processor.
    wait_until("all three documents are in flight", || {
        h.tracker.in_flight("hostA") == 3
    });

    h.processor.release();
    wait_until("the bin drains back to zero", || {
        h.processor.total() == 3 && h.tracker.in_flight("hostA") == 0
    });
    h.pool.shutdown();
}
