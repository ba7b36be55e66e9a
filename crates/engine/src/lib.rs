// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! quarry-engine: the concurrency kernel of the Quarry crawl server.
//!
//! Hands batches of document work from one producer to a pool of worker
//! threads, keeps load balanced across rate-limited resource bins, and
//! recovers every pool coherently when the backing store drops out from
//! under it mid-operation.

pub mod barrier;
pub mod pool;
pub mod queue;
pub mod reset;
pub mod store;
pub mod stuffer;
pub mod supervisor;

pub use barrier::ResetBarrier;
pub use pool::{PoolConfig, PoolDeps, WorkerPool};
pub use queue::WorkQueue;
pub use reset::{cleanup_reset_barrier, delete_reset_barrier, fetch_reset_barrier};
pub use store::{BatchProcessor, FatalErrorSink, JobStateStore};
pub use supervisor::{Supervisor, Tick};
