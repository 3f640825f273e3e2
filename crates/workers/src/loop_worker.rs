// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded loop worker

use std::sync::atomic::{AtomicU32, Ordering};
use strand_core::{Worker, WorkerControl, WorkerError};

type Iteration = Box<dyn Fn(u32) -> Result<(), WorkerError> + Send + Sync>;
type Edge = Box<dyn Fn() + Send + Sync>;

/// Runs a callback a fixed number of times, passing the 1-based index.
///
/// The start and end callbacks run once each, the end one even when the loop
/// was cut short by a stop.
pub struct LoopWorker {
    control: WorkerControl,
    loop_count: u32,
    iteration: Iteration,
    on_begin: Option<Edge>,
    on_end: Option<Edge>,
    current: AtomicU32,
}

impl LoopWorker {
    pub fn new(
        loop_count: u32,
        iteration: impl Fn(u32) -> Result<(), WorkerError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            control: WorkerControl::new(),
            loop_count,
            iteration: Box::new(iteration),
            on_begin: None,
            on_end: None,
            current: AtomicU32::new(0),
        }
    }

    pub fn with_start(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_begin = Some(Box::new(callback));
        self
    }

    pub fn with_end(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_end = Some(Box::new(callback));
        self
    }

    /// Index of the iteration in progress or last completed
    pub fn current_loop(&self) -> u32 {
        self.current.load(Ordering::SeqCst)
    }

    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    /// Percentage of iterations reached; an empty loop counts as done
    pub fn progress(&self) -> f64 {
        if self.loop_count == 0 {
            return 100.0;
        }
        f64::from(self.current_loop()) / f64::from(self.loop_count) * 100.0
    }
}

impl Worker for LoopWorker {
    fn control(&self) -> &WorkerControl {
        &self.control
    }

    fn run(&self) -> Result<(), WorkerError> {
        if let Some(begin) = &self.on_begin {
            begin();
        }
        for i in 1..=self.loop_count {
            if !self.should_continue() {
                break;
            }
            self.current.store(i, Ordering::SeqCst);
            if let Err(e) = (self.iteration)(i) {
                self.on_error(&WorkerError::callback("Loop callback failed", e).to_string());
            }
        }
        if let Some(end) = &self.on_end {
            end();
        }
        Ok(())
    }

    fn type_name(&self) -> &str {
        "LoopWorker"
    }

    fn description(&self) -> String {
        format!("Loop worker with {} iterations", self.loop_count)
    }

    fn on_error(&self, error: &str) {
        tracing::warn!(
            worker_type = self.type_name(),
            iteration = self.current_loop(),
            error,
            "loop iteration failed"
        );
    }
}

#[cfg(test)]
#[path = "loop_worker_tests.rs"]
mod tests;
