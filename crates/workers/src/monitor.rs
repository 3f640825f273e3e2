// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic monitor that runs until stopped or disabled

use crate::Callback;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use strand_core::{Worker, WorkerControl, WorkerError};

const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

/// Runs a check every interval.
///
/// Without a callback each check just logs its sequence number.
pub struct MonitorWorker {
    control: WorkerControl,
    interval_ms: AtomicU64,
    callback: Option<Callback>,
    enabled: AtomicBool,
    iterations: AtomicU64,
}

impl MonitorWorker {
    pub fn new(interval: Duration) -> Self {
        Self {
            control: WorkerControl::new(),
            interval_ms: AtomicU64::new(millis(interval)),
            callback: None,
            enabled: AtomicBool::new(true),
            iterations: AtomicU64::new(0),
        }
    }

    pub fn with_callback(
        mut self,
        callback: impl Fn() -> Result<(), WorkerError> + Send + Sync + 'static,
    ) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Checks performed so far
    pub fn iteration_count(&self) -> u64 {
        self.iterations.load(Ordering::SeqCst)
    }

    /// A disabled monitor leaves its loop before the next check
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Takes effect from the next wait
    pub fn set_interval(&self, interval: Duration) {
        self.interval_ms.store(millis(interval), Ordering::SeqCst);
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.load(Ordering::SeqCst))
    }

    fn check(&self, n: u64) {
        match &self.callback {
            Some(callback) => {
                if let Err(e) = callback() {
                    self.on_error(&WorkerError::callback("Monitor callback failed", e).to_string());
                }
            }
            None => tracing::info!(worker_type = self.type_name(), check = n, "monitoring check"),
        }
    }
}

impl Default for MonitorWorker {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl Worker for MonitorWorker {
    fn control(&self) -> &WorkerControl {
        &self.control
    }

    fn run(&self) -> Result<(), WorkerError> {
        while self.should_continue() && self.is_enabled() {
            let n = self.iterations.fetch_add(1, Ordering::SeqCst) + 1;
            self.check(n);
            if !self.control.sleep(self.interval()) {
                break;
            }
        }
        Ok(())
    }

    fn type_name(&self) -> &str {
        "MonitorWorker"
    }

    fn description(&self) -> String {
        format!("Monitor worker with {}ms interval", self.interval().as_millis())
    }

    fn on_stop(&self) {
        self.set_enabled(false);
        tracing::info!(
            worker_type = self.type_name(),
            checks = self.iteration_count(),
            "monitoring stopped"
        );
    }

    fn on_error(&self, error: &str) {
        tracing::warn!(worker_type = self.type_name(), error, "monitor check failed");
    }
}

pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
