// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Assembles a running pool: one producer plus N workers around a shared
//! queue and reset barrier.
//!
//! The pool owns thread lifecycle only. What the workers do to a batch is
//! the injected [`BatchProcessor`]'s business; where batches come from is
//! the injected [`JobStateStore`]'s. Three pool flavors exist in a full
//! server (fetch, cleanup, delete) and all three are this one type wired to
//! a different barrier and processor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use quarry_core::{BinLoadTracker, CrawlError, WorkBatch};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::barrier::ResetBarrier;
use crate::queue::WorkQueue;
use crate::store::{BatchProcessor, FatalErrorSink, JobStateStore};
use crate::stuffer::Stuffer;
use crate::supervisor::{Supervisor, Tick};

/// Sizing and pacing knobs for one pool.
///
/// The producer-side sizes derive from the worker count so a pool scaled up
/// for throughput gets a proportionally deeper queue without retuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of worker threads.
    pub workers: usize,
    /// Queue low water mark, as a multiple of the worker count. The
    /// producer tops the queue up only when it drains to this level.
    pub low_water_factor: usize,
    /// Smallest producer fetch size, as a multiple of the worker count.
    pub stuff_size_factor: usize,
    /// Cap on the adaptive fetch size, as a multiple of the smallest.
    pub max_stuff_factor: usize,
    /// Sleep between turns when a thread finds nothing to do.
    pub idle_poll: Duration,
    /// Backoff after a store fault before the thread retries.
    pub fault_backoff: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            low_water_factor: 5,
            stuff_size_factor: 2,
            max_stuff_factor: 4,
            idle_poll: Duration::from_secs(1),
            fault_backoff: Duration::from_secs(5),
        }
    }
}

impl PoolConfig {
    fn low_water(&self) -> usize {
        self.low_water_factor * self.workers
    }

    fn lowest_stuff(&self) -> usize {
        (self.stuff_size_factor * self.workers).max(1)
    }

    fn max_stuff(&self) -> usize {
        (self.max_stuff_factor * self.lowest_stuff()).max(self.lowest_stuff())
    }
}

/// External collaborators every pool thread shares. Passed in explicitly at
/// start; the pool never looks anything up through ambient state.
#[derive(Clone)]
pub struct PoolDeps {
    pub store: Arc<dyn JobStateStore>,
    pub processor: Arc<dyn BatchProcessor>,
    pub tracker: Arc<BinLoadTracker>,
    pub fatal: Arc<dyn FatalErrorSink>,
}

/// A running pool. Threads run until [`shutdown`](Self::shutdown) or drop.
pub struct WorkerPool {
    name: String,
    stop: Arc<AtomicBool>,
    queue: Arc<WorkQueue>,
    barrier: Arc<ResetBarrier>,
    threads: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn the producer and `config.workers` workers.
    ///
    /// All threads are registered with the barrier before any of them
    /// spawns, so the arrival threshold is correct from the first fault
    /// onward. If a spawn fails the threads already running are shut down
    /// before the error is returned.
    pub fn start(
        name: impl Into<String>,
        config: &PoolConfig,
        queue: Arc<WorkQueue>,
        barrier: Arc<ResetBarrier>,
        deps: PoolDeps,
    ) -> Result<Self, CrawlError> {
        let mut pool = Self {
            name: name.into(),
            stop: Arc::new(AtomicBool::new(false)),
            queue,
            barrier,
            threads: Vec::with_capacity(config.workers + 1),
        };
        for _ in 0..config.workers + 1 {
            pool.barrier.register_participant();
        }
        if let Err(err) = pool.spawn_threads(config, deps) {
            pool.shutdown();
            return Err(err);
        }
        info!(pool = %pool.name, workers = config.workers, "pool started");
        Ok(pool)
    }

    fn spawn_threads(&mut self, config: &PoolConfig, deps: PoolDeps) -> Result<(), CrawlError> {
        let mut stuffer = Stuffer::new(
            Arc::clone(&self.queue),
            Arc::clone(&self.barrier),
            Arc::clone(&deps.tracker),
            Arc::clone(&deps.store),
            config.low_water(),
            config.lowest_stuff(),
            config.max_stuff(),
        );
        let supervisor = self.supervisor(format!("{} stuffer", self.name), config, &deps);
        self.threads.push(spawn_thread(
            format!("{}-stuffer", self.name),
            move || supervisor.run(|| stuffer.turn()),
        )?);

        for n in 0..config.workers {
            let worker = Worker {
                queue: Arc::clone(&self.queue),
                barrier: Arc::clone(&self.barrier),
                deps: deps.clone(),
            };
            let supervisor = self.supervisor(format!("{} worker {n}", self.name), config, &deps);
            self.threads.push(spawn_thread(
                format!("{}-worker-{n}", self.name),
                move || supervisor.run(|| worker.turn()),
            )?);
        }
        Ok(())
    }

    fn supervisor(&self, thread_name: String, config: &PoolConfig, deps: &PoolDeps) -> Supervisor {
        Supervisor::new(
            thread_name,
            Arc::clone(&self.stop),
            config.idle_poll,
            config.fault_backoff,
            Arc::clone(&deps.fatal),
        )
    }

    /// Stop every thread and join it. Idempotent.
    ///
    /// Threads notice the stop condition between turns, so the queue is
    /// repeatedly reset to kick blocked takers awake, and any in-flight
    /// reset cycle is abandoned so its arrivals do not wait for threads that
    /// have already exited.
    pub fn shutdown(&mut self) {
        if self.threads.is_empty() {
            return;
        }
        info!(pool = %self.name, "pool shutting down");
        self.stop.store(true, Ordering::Release);
        for handle in std::mem::take(&mut self.threads) {
            while !handle.is_finished() {
                self.queue.reset();
                self.barrier.abandon();
                thread::sleep(Duration::from_millis(5));
            }
            if handle.join().is_err() {
                warn!(pool = %self.name, "a pool thread panicked");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_thread(
    name: String,
    body: impl FnOnce() + Send + 'static,
) -> Result<JoinHandle<()>, CrawlError> {
    thread::Builder::new()
        .name(name.clone())
        .spawn(body)
        .map_err(|err| CrawlError::ResourceExhausted(format!("could not spawn {name}: {err}")))
}

/// One worker thread's state and turn logic.
struct Worker {
    queue: Arc<WorkQueue>,
    barrier: Arc<ResetBarrier>,
    deps: PoolDeps,
}

impl Worker {
    /// One supervised consumer turn.
    ///
    /// Whatever happens to the batch, every item not marked processed by
    /// the time the turn ends is handed back to the store, so a batch cut
    /// short by an inactive job or a failed processor leaves no documents
    /// stranded in-progress.
    fn turn(&self) -> Result<Tick, CrawlError> {
        if self.barrier.wait_for_reset()? {
            // Shared state changed under us; start the turn over.
            return Ok(Tick::Busy);
        }
        let Some(batch) = self.queue.take() else {
            // Woken without work: re-check the fault flag and stop condition.
            return Ok(Tick::Busy);
        };
        let outcome = self.handle(&batch);
        let requeue = self.requeue_unprocessed(&batch);
        outcome?;
        requeue?;
        Ok(Tick::Busy)
    }

    fn handle(&self, batch: &WorkBatch) -> Result<(), CrawlError> {
        let active = self
            .deps
            .store
            .check_job_active(batch.job().id())
            .map_err(|err| self.barrier.note_fault(err))?;
        if !active {
            debug!(job = %batch.job().id(), count = batch.count(), "job inactive; requeueing batch");
            return Ok(());
        }
        let bins = BinGuard::arm(batch, &self.deps.tracker);
        let result = self.deps.processor.process(batch);
        drop(bins);
        result.map_err(|err| self.barrier.note_fault(err))
    }

    fn requeue_unprocessed(&self, batch: &WorkBatch) -> Result<(), CrawlError> {
        for item in batch.items() {
            if !item.processed() {
                self.deps
                    .store
                    .requeue_document(batch.job().id(), item.document())
                    .map_err(|err| self.barrier.note_fault(err))?;
            }
        }
        Ok(())
    }
}

/// Brackets a batch's bins in the tracker for the duration of the
/// processing call. Releasing on drop keeps the in-flight accounting
/// paired on every exit path, a panicking processor included.
struct BinGuard<'a> {
    batch: &'a WorkBatch,
    tracker: &'a BinLoadTracker,
}

impl<'a> BinGuard<'a> {
    fn arm(batch: &'a WorkBatch, tracker: &'a BinLoadTracker) -> Self {
        batch.begin_processing(tracker);
        Self { batch, tracker }
    }
}

impl Drop for BinGuard<'_> {
    fn drop(&mut self) {
        self.batch.end_processing(self.tracker);
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
