//! A store outage stops a pool collectively, repairs shared state once,
//! and lets every thread resume together.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use quarry_core::BinLoadTracker;
use quarry_engine::{fetch_reset_barrier, PoolDeps, ResetBarrier, WorkQueue, WorkerPool};

use crate::prelude::*;

#[test]
fn pool_resumes_after_a_store_outage() {
    let store = MemoryStore::new();
    let processor = RecordingProcessor::new();
    let queue = Arc::new(WorkQueue::new());
    let cleanup_queue = Arc::new(WorkQueue::new());
    let barrier = fetch_reset_barrier(store.clone(), Arc::clone(&queue), cleanup_queue);
    let mut pool = WorkerPool::start(
        "fetch",
        &test_config(3),
        queue,
        Arc::clone(&barrier),
        PoolDeps {
            store: store.clone(),
            processor: processor.clone(),
            tracker: Arc::new(BinLoadTracker::new()),
            fatal: RecordingSink::new(),
        },
    )
    .unwrap();

    store.push_due(fetch_batch(&["doc-before"], "hostA", 3));
    wait_until("the pool is processing normally", || {
        processor.saw("doc-before")
    });

    store.healthy.store(false, Ordering::Release);
    wait_until("the outage raises a pool fault", || barrier.fault_raised());
    store.healthy.store(true, Ordering::Release);

    // Force one more full cycle against the healthy store; the repair must
    // now succeed.
    barrier.raise_fault();
    wait_until("the repair runs against the healthy store", || {
        store.fetch_resets.load(Ordering::SeqCst) >= 1
    });

    store.push_due(fetch_batch(&["doc-after"], "hostA", 3));
    wait_until("work resumes after the repair", || {
        processor.saw("doc-after")
    });
    pool.shutdown();
}

#[test]
fn repair_discards_stale_queued_work() {
    let store = MemoryStore::new();
    let fetch_queue = Arc::new(WorkQueue::new());
    let cleanup_queue = Arc::new(WorkQueue::new());
    let barrier: Arc<ResetBarrier> = fetch_reset_barrier(
        store.clone(),
        Arc::clone(&fetch_queue),
        Arc::clone(&cleanup_queue),
    );
    barrier.register_participant();

    fetch_queue.add(fetch_batch(&["doc-a"], "hostA", 3));
    fetch_queue.add(fetch_batch(&["doc-b"], "hostA", 3));
    cleanup_queue.add(delete_batch(&["doc-c"]));

    barrier.raise_fault();
    assert!(barrier.wait_for_reset().unwrap());

    // The store transition ran, and both queues were emptied: whatever they
    // held is only reachable again through the store.
    assert_eq!(store.fetch_resets.load(Ordering::SeqCst), 1);
    assert!(fetch_queue.is_near_empty(0));
    assert!(cleanup_queue.is_near_empty(0));
}
