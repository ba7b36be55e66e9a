// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervised run-forever loop shared by every kernel thread.
//!
//! The producer, the workers, and any periodic maintenance thread all want
//! the same outer loop: keep calling the body, sleep when there is nothing
//! to do, back off and retry on a store fault, report a configuration fault
//! and die, survive anything else. This loop exists once, parameterized by
//! the body, instead of being copied into every thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use quarry_core::CrawlError;
use tracing::{debug, error, warn};

use crate::store::FatalErrorSink;

/// What a loop body reports when it returns without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Work was done (or a wake needs re-checking); loop again immediately.
    Busy,
    /// Nothing to do right now; sleep before the next turn.
    Idle,
}

/// Drives one thread's body according to the kernel fault taxonomy.
pub struct Supervisor {
    name: String,
    stop: Arc<AtomicBool>,
    idle_sleep: Duration,
    fault_backoff: Duration,
    fatal: Arc<dyn FatalErrorSink>,
}

impl Supervisor {
    pub fn new(
        name: impl Into<String>,
        stop: Arc<AtomicBool>,
        idle_sleep: Duration,
        fault_backoff: Duration,
        fatal: Arc<dyn FatalErrorSink>,
    ) -> Self {
        Self {
            name: name.into(),
            stop,
            idle_sleep,
            fault_backoff,
            fatal,
        }
    }

    /// Whether the externally-set stop condition has been observed.
    pub fn stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Run `body` until shutdown.
    ///
    /// - `Ok(Busy)` loops straight away; `Ok(Idle)` sleeps `idle_sleep`.
    /// - `Interrupted` exits cleanly and silently.
    /// - A store fault sleeps `fault_backoff` before retrying, giving the
    ///   store a chance to come back before the next barrier cycle.
    /// - A fatal fault (bad configuration, resource exhaustion) is reported
    ///   to the sink and ends the thread; retrying cannot fix it.
    /// - Any other error is logged and the thread stays alive.
    pub fn run<F>(&self, mut body: F)
    where
        F: FnMut() -> Result<Tick, CrawlError>,
    {
        debug!(thread = %self.name, "thread started");
        while !self.stopped() {
            match body() {
                Ok(Tick::Busy) => {}
                Ok(Tick::Idle) => self.pause(self.idle_sleep),
                Err(CrawlError::Interrupted) => break,
                Err(err) if err.is_store_fault() => {
                    warn!(thread = %self.name, %err, "store fault; backing off before retry");
                    self.pause(self.fault_backoff);
                }
                Err(CrawlError::FatalConfig(message) | CrawlError::ResourceExhausted(message)) => {
                    self.fatal.fatal_error(&self.name, &message);
                    break;
                }
                Err(err) => {
                    error!(thread = %self.name, %err, "unexpected error; thread stays alive");
                }
            }
        }
        debug!(thread = %self.name, "thread exiting");
    }

    /// Sleep in slices so a shutdown during a long backoff is still prompt.
    fn pause(&self, total: Duration) {
        const SLICE: Duration = Duration::from_millis(25);
        let mut remaining = total;
        while !self.stopped() && !remaining.is_zero() {
            let nap = remaining.min(SLICE);
            thread::sleep(nap);
            remaining = remaining.saturating_sub(nap);
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
