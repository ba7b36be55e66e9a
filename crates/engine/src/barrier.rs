// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reusable collective reset barrier.
//!
//! When the backing store fails under one thread of a pool, every thread in
//! that pool must stop, exactly one must repair the shared state, and all of
//! them must resume together. The barrier is generic over what "repair"
//! means: concrete pools inject a repair closure and a wakeup closure at
//! construction instead of subclassing anything.

use parking_lot::{Condvar, Mutex};
use quarry_core::CrawlError;
use tracing::{debug, warn};

/// Repair action run by the single elected participant per reset cycle.
pub type RepairFn = dyn Fn() -> Result<(), CrawlError> + Send + Sync;

/// Side effect that wakes every participant blocked on the resources this
/// barrier governs (typically the pool's queues).
pub type WakeupFn = dyn Fn() + Send + Sync;

#[derive(Debug, Default)]
struct BarrierState {
    /// Participants that must all arrive before repair fires.
    registered: usize,
    /// Participants currently blocked waiting for the repair.
    arrived: usize,
    fault_raised: bool,
    /// Bumped once per completed reset cycle; waiters key their release off
    /// it so a fault raised right after a release cannot trap them in the
    /// old cycle.
    cycle: u64,
}

/// A reusable barrier coordinating collective fault recovery for one pool.
pub struct ResetBarrier {
    state: Mutex<BarrierState>,
    released: Condvar,
    repair: Box<RepairFn>,
    wakeup: Box<WakeupFn>,
}

impl ResetBarrier {
    pub fn new(repair: Box<RepairFn>, wakeup: Box<WakeupFn>) -> Self {
        Self {
            state: Mutex::new(BarrierState::default()),
            released: Condvar::new(),
            repair,
            wakeup,
        }
    }

    /// Add one participant to the arrival threshold.
    ///
    /// Every long-lived pool thread calls this once, before its first
    /// [`wait_for_reset`](Self::wait_for_reset). Registering after the pool
    /// is already processing is safe but changes the threshold for all
    /// future cycles. There is no deregistration: a registered thread that
    /// exits without arriving stalls the barrier for everyone else.
    pub fn register_participant(&self) {
        self.state.lock().registered += 1;
    }

    /// Number of participants currently registered.
    pub fn registered(&self) -> usize {
        self.state.lock().registered
    }

    /// Whether a fault is pending and a reset cycle is due.
    pub fn fault_raised(&self) -> bool {
        self.state.lock().fault_raised
    }

    /// Flag a shared-resource fault and wake everything blocked on the
    /// governed resources. Any thread may call this, even one outside the
    /// pool. Raising while a fault is already pending just re-wakes.
    pub fn raise_fault(&self) {
        {
            let mut state = self.state.lock();
            if !state.fault_raised {
                debug!("shared-resource fault raised");
            }
            state.fault_raised = true;
        }
        (self.wakeup)();
    }

    /// Raise the fault only if `err` is the kind the reset protocol
    /// recovers, then hand the error back for normal propagation.
    /// Convenience for loop bodies that hit the store mid-turn.
    pub fn note_fault(&self, err: CrawlError) -> CrawlError {
        if err.is_store_fault() {
            self.raise_fault();
        }
        err
    }

    /// Conditionally join a collective reset.
    ///
    /// Fast path: no fault pending, returns `Ok(false)` immediately — this
    /// is what nearly every call sees in steady state. With a fault pending
    /// the caller arrives at the barrier; the last registered participant to
    /// arrive runs the repair with exclusive access, then — whether or not
    /// the repair succeeded — clears the fault, resets the arrival count,
    /// and releases everyone. A failed repair therefore converts into
    /// "everyone retries and most likely re-raises", never a wedged pool,
    /// and its error (a fatal configuration fault in particular) propagates
    /// to the repairer's caller.
    ///
    /// Returns `Ok(true)` to every released participant, the repairer
    /// included: a completed cycle means "shared state changed, re-validate
    /// and retry" for all of them alike.
    pub fn wait_for_reset(&self) -> Result<bool, CrawlError> {
        let mut state = self.state.lock();
        if !state.fault_raised {
            return Ok(false);
        }

        state.arrived += 1;
        if state.arrived == state.registered {
            // Last one in repairs. Everyone else is parked on the condvar,
            // so holding the lock here is what gives the repair exclusive
            // access to the pool's shared state.
            debug!(participants = state.registered, "running reset repair");
            let outcome = (self.repair)();
            state.fault_raised = false;
            state.arrived = 0;
            state.cycle = state.cycle.wrapping_add(1);
            self.released.notify_all();
            if let Err(err) = &outcome {
                warn!(%err, "reset repair failed; pool will retry");
            }
            return outcome.map(|()| true);
        }

        let cycle = state.cycle;
        while state.cycle == cycle {
            self.released.wait(&mut state);
        }
        Ok(true)
    }

    /// Abandon any in-flight cycle: clear the fault and release every
    /// arrived participant without running the repair.
    ///
    /// Shutdown-path escape hatch. Once threads start exiting their loops a
    /// full complement of arrivals can no longer be expected, so a pending
    /// cycle would park the remaining arrivals forever. Released waiters see
    /// a completed cycle (`Ok(true)`) and re-check their stop condition.
    pub fn abandon(&self) {
        let mut state = self.state.lock();
        if state.fault_raised || state.arrived > 0 {
            debug!(arrived = state.arrived, "abandoning reset cycle");
            state.fault_raised = false;
            state.arrived = 0;
            state.cycle = state.cycle.wrapping_add(1);
            self.released.notify_all();
        }
    }
}

impl std::fmt::Debug for ResetBarrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ResetBarrier")
            .field("registered", &state.registered)
            .field("arrived", &state.arrived)
            .field("fault_raised", &state.fault_raised)
            .finish()
    }
}

#[cfg(test)]
#[path = "barrier_tests.rs"]
mod tests;
