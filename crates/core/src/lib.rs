// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! quarry-core: data types and load accounting for the Quarry crawl kernel.
//!
//! Everything here is passive: work items and batches as they move between
//! the producer and the worker pools, plus the bin load tracker the pools
//! consult for fair assignment. The blocking primitives that move this data
//! live in quarry-engine.

pub mod batch;
pub mod connection;
pub mod error;
pub mod id;
pub mod item;
pub mod job;
pub mod tracker;

pub use batch::WorkBatch;
pub use connection::ConnectionSnapshot;
pub use error::CrawlError;
pub use item::{WorkItem, WorkItemKind};
pub use job::JobSnapshot;
pub use tracker::BinLoadTracker;

pub use connection::ConnectionName;
pub use item::{BinName, DocumentId};
pub use job::JobId;
