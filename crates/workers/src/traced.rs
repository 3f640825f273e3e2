// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced worker wrapper for consistent observability

use std::time::Instant;
use strand_core::{Worker, WorkerControl, WorkerError};

/// Wrapper that adds tracing to any Worker
pub struct TracedWorker<W> {
    inner: W,
}

impl<W> TracedWorker<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &W {
        &self.inner
    }
}

impl<W: Worker> Worker for TracedWorker<W> {
    fn control(&self) -> &WorkerControl {
        self.inner.control()
    }

    fn run(&self) -> Result<(), WorkerError> {
        let span = tracing::info_span!("worker.run", worker_type = self.inner.type_name());
        let _guard = span.enter();

        tracing::info!(description = %self.inner.description(), "starting");
        let start = Instant::now();
        let result = self.inner.run();
        let elapsed = start.elapsed();

        match &result {
            Ok(()) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "run finished"),
            Err(e) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "run failed"
            ),
        }

        result
    }

    fn type_name(&self) -> &str {
        self.inner.type_name()
    }

    fn description(&self) -> String {
        self.inner.description()
    }

    fn on_initialize(&self) {
        let span = tracing::info_span!("worker.initialize", worker_type = self.inner.type_name());
        let _guard = span.enter();
        tracing::debug!("initializing");
        self.inner.on_initialize();
    }

    fn on_start(&self) {
        let span = tracing::info_span!("worker.start", worker_type = self.inner.type_name());
        let _guard = span.enter();
        tracing::debug!("starting");
        self.inner.on_start();
    }

    fn on_stop(&self) {
        let span = tracing::info_span!("worker.stop", worker_type = self.inner.type_name());
        let _guard = span.enter();
        tracing::info!(state = %self.inner.state(), "stop requested");
        self.inner.on_stop();
    }

    fn on_pause(&self) {
        let span = tracing::info_span!("worker.pause", worker_type = self.inner.type_name());
        let _guard = span.enter();
        tracing::info!("pause requested");
        self.inner.on_pause();
    }

    fn on_resume(&self) {
        let span = tracing::info_span!("worker.resume", worker_type = self.inner.type_name());
        let _guard = span.enter();
        tracing::info!("resume requested");
        self.inner.on_resume();
    }

    fn on_error(&self, error: &str) {
        let span = tracing::info_span!("worker.error", worker_type = self.inner.type_name());
        let _guard = span.enter();
        tracing::error!(error, "worker error");
        self.inner.on_error(error);
    }

    fn should_continue(&self) -> bool {
        self.inner.should_continue()
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
