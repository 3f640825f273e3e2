// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock-free control block shared by a worker thread and its manager
//!
//! The worker's own thread and the controlling thread both touch this state,
//! so everything here is atomic: taking a mutex on either side could deadlock
//! against the registry lock held by the manager.

use super::state::WorkerState;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Upper bound on how long a paused worker sleeps between flag checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// State field and advisory stop/pause flags for one worker
#[derive(Debug)]
pub struct WorkerControl {
    state: AtomicU8,
    stop_requested: AtomicBool,
    pause_requested: AtomicBool,
    poll_interval_ms: AtomicU64,
}

impl WorkerControl {
    pub fn new() -> Self {
        Self::with_poll_interval(DEFAULT_POLL_INTERVAL)
    }

    pub fn with_poll_interval(interval: Duration) -> Self {
        Self {
            state: AtomicU8::new(WorkerState::Stopped.as_u8()),
            stop_requested: AtomicBool::new(false),
            pause_requested: AtomicBool::new(false),
            poll_interval_ms: AtomicU64::new(clamp_interval(interval)),
        }
    }

    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Move to `target` if the state machine allows it from the current state.
    ///
    /// Returns false (and leaves the state untouched) for illegal moves, which
    /// keeps `Finished` terminal even when several threads race on it.
    pub(crate) fn transition(&self, target: WorkerState) -> bool {
        self.state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |raw| {
                WorkerState::from_u8(raw)
                    .can_transition_to(target)
                    .then_some(target.as_u8())
            })
            .is_ok()
    }

    /// `Stopped -> Running`, performed once as the worker's thread is spawned.
    ///
    /// Reserved for the thread manager's start path; workers and callers
    /// never call it.
    #[doc(hidden)]
    pub fn mark_running(&self) -> bool {
        self.transition(WorkerState::Running)
    }

    /// `Running | Paused -> Finished`, performed once the run body has exited.
    ///
    /// Reserved for the thread that hosts the worker.
    #[doc(hidden)]
    pub fn mark_finished(&self) -> bool {
        self.transition(WorkerState::Finished)
    }

    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    pub fn request_pause(&self) {
        self.pause_requested.store(true, Ordering::SeqCst);
    }

    /// Lift an outstanding pause request
    pub fn request_resume(&self) {
        self.pause_requested.store(false, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    pub fn is_pause_requested(&self) -> bool {
        self.pause_requested.load(Ordering::SeqCst)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.load(Ordering::Relaxed))
    }

    pub fn set_poll_interval(&self, interval: Duration) {
        self.poll_interval_ms
            .store(clamp_interval(interval), Ordering::Relaxed);
    }

    /// Cooperative continuation check.
    ///
    /// Call at every iteration boundary of a run loop. While a pause is
    /// requested (and no stop is), parks the calling thread in poll-interval
    /// sleeps with the state reported as `Paused`. Returns false as soon as a
    /// stop is requested, true otherwise. Level-triggered: calling it again
    /// observes the same flags.
    pub fn should_continue(&self) -> bool {
        loop {
            if self.is_stop_requested() {
                return false;
            }
            if !self.is_pause_requested() {
                if self.state() == WorkerState::Paused {
                    self.transition(WorkerState::Running);
                    tracing::debug!("worker resumed");
                }
                return true;
            }
            if self.state() == WorkerState::Running && self.transition(WorkerState::Paused) {
                tracing::debug!("worker paused");
            }
            thread::sleep(self.poll_interval());
        }
    }

    /// Sleep for `duration`, waking early when a stop is requested.
    ///
    /// Sleeps in slices no longer than the poll interval. Returns false if the
    /// sleep was cut short by a stop request.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_stop_requested() {
                return false;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return true;
            }
            thread::sleep(remaining.min(self.poll_interval()));
        }
    }
}

impl Default for WorkerControl {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_interval(interval: Duration) -> u64 {
    u64::try_from(interval.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
