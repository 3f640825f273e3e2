// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watches a file's size for changes

use crate::monitor::millis;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;
use strand_core::{Worker, WorkerControl, WorkerError};

const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Polls a path every interval and counts size changes.
///
/// The size starts out as 0, so the first check of a non-empty file counts
/// as a change. An unreadable file is logged and skipped.
pub struct FileMonitorWorker {
    control: WorkerControl,
    path: PathBuf,
    interval: Duration,
    last_size: AtomicU64,
    changes: AtomicU32,
}

impl FileMonitorWorker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            control: WorkerControl::new(),
            path: path.into(),
            interval: DEFAULT_INTERVAL,
            last_size: AtomicU64::new(0),
            changes: AtomicU32::new(0),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn change_count(&self) -> u32 {
        self.changes.load(Ordering::SeqCst)
    }

    /// Compare the current size with the last one seen
    fn check(&self) {
        let size = match std::fs::metadata(&self.path) {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot read file");
                return;
            }
        };
        let previous = self.last_size.swap(size, Ordering::SeqCst);
        if previous != size {
            let n = self.changes.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::info!(path = %self.path.display(), change = n, size, "file changed");
        } else {
            tracing::debug!(path = %self.path.display(), "file unchanged");
        }
    }
}

impl Worker for FileMonitorWorker {
    fn control(&self) -> &WorkerControl {
        &self.control
    }

    fn run(&self) -> Result<(), WorkerError> {
        tracing::info!(path = %self.path.display(), "monitoring file");
        while self.should_continue() {
            self.check();
            if !self.control.sleep(self.interval) {
                break;
            }
        }
        Ok(())
    }

    fn type_name(&self) -> &str {
        "FileMonitorWorker"
    }

    fn description(&self) -> String {
        format!("File monitor for: {}", self.path.display())
    }

    fn on_stop(&self) {
        tracing::info!(
            path = %self.path.display(),
            changes = self.change_count(),
            interval_ms = millis(self.interval),
            "file monitoring stopped"
        );
    }
}

#[cfg(test)]
#[path = "file_monitor_tests.rs"]
mod tests;
