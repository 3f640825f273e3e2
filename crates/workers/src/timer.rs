// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repeating timer with an optional trigger ceiling

use crate::monitor::millis;
use crate::Callback;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use strand_core::{Worker, WorkerControl, WorkerError};

/// Fires a callback once per interval.
///
/// With a trigger ceiling the timer finishes on its own after that many
/// triggers. A failing callback is reported through `on_error` and the timer
/// keeps going.
pub struct TimerWorker {
    control: WorkerControl,
    interval: Duration,
    callback: Callback,
    /// 0 = no ceiling
    max_triggers: AtomicU32,
    triggers: AtomicU32,
}

impl TimerWorker {
    pub fn new(
        interval: Duration,
        callback: impl Fn() -> Result<(), WorkerError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            control: WorkerControl::new(),
            interval,
            callback: Box::new(callback),
            max_triggers: AtomicU32::new(0),
            triggers: AtomicU32::new(0),
        }
    }

    pub fn with_max_triggers(self, max_triggers: u32) -> Self {
        self.set_max_triggers(Some(max_triggers));
        self
    }

    /// `None` or `Some(0)` means the timer never stops on its own
    pub fn set_max_triggers(&self, max_triggers: Option<u32>) {
        self.max_triggers
            .store(max_triggers.unwrap_or(0), Ordering::SeqCst);
    }

    pub fn max_triggers(&self) -> Option<u32> {
        match self.max_triggers.load(Ordering::SeqCst) {
            0 => None,
            n => Some(n),
        }
    }

    pub fn trigger_count(&self) -> u32 {
        self.triggers.load(Ordering::SeqCst)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn reached_ceiling(&self) -> bool {
        self.max_triggers()
            .is_some_and(|max| self.trigger_count() >= max)
    }
}

impl Worker for TimerWorker {
    fn control(&self) -> &WorkerControl {
        &self.control
    }

    fn run(&self) -> Result<(), WorkerError> {
        while self.should_continue() {
            if self.reached_ceiling() {
                tracing::debug!(triggers = self.trigger_count(), "trigger ceiling reached");
                break;
            }
            if !self.control.sleep(self.interval) || !self.should_continue() {
                break;
            }
            let n = self.triggers.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::trace!(trigger = n, "timer fired");
            if let Err(e) = (self.callback)() {
                self.on_error(&WorkerError::callback("Timer callback failed", e).to_string());
            }
        }
        Ok(())
    }

    fn type_name(&self) -> &str {
        "TimerWorker"
    }

    fn description(&self) -> String {
        let limit = match self.max_triggers() {
            Some(max) => format!("max {max} triggers"),
            None => "infinite".to_string(),
        };
        format!(
            "Timer worker with {}ms interval ({limit})",
            self.interval.as_millis()
        )
    }

    fn on_start(&self) {
        tracing::info!(
            worker_type = self.type_name(),
            interval_ms = millis(self.interval),
            "timer started"
        );
    }

    fn on_stop(&self) {
        tracing::info!(
            worker_type = self.type_name(),
            triggers = self.trigger_count(),
            "timer stopped"
        );
    }

    fn on_error(&self, error: &str) {
        tracing::warn!(worker_type = self.type_name(), error, "timer callback failed");
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
