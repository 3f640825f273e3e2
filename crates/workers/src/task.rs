// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot task

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use strand_core::{Worker, WorkerControl, WorkerError};

type Job = Box<dyn FnOnce() -> Result<(), WorkerError> + Send>;

/// Runs a closure once and finishes
pub struct TaskWorker {
    control: WorkerControl,
    job: Mutex<Option<Job>>,
    description: String,
    completed: AtomicBool,
}

impl TaskWorker {
    pub fn new(job: impl FnOnce() -> Result<(), WorkerError> + Send + 'static) -> Self {
        Self {
            control: WorkerControl::new(),
            job: Mutex::new(Some(Box::new(job))),
            description: "Unnamed Task".to_string(),
            completed: AtomicBool::new(false),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        if !description.is_empty() {
            self.description = description;
        }
        self
    }

    /// Whether the closure ran to success
    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }
}

impl Worker for TaskWorker {
    fn control(&self) -> &WorkerControl {
        &self.control
    }

    fn run(&self) -> Result<(), WorkerError> {
        // A stop requested before the thread got going skips the job
        if !self.should_continue() {
            return Ok(());
        }
        let job = self.job.lock().unwrap_or_else(|e| e.into_inner()).take();
        let Some(job) = job else {
            return Ok(());
        };
        job().map_err(|e| WorkerError::callback("Task execution failed", e))?;
        self.completed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn type_name(&self) -> &str {
        "TaskWorker"
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn on_start(&self) {
        tracing::info!(worker_type = self.type_name(), task = %self.description, "starting task");
    }

    fn on_stop(&self) {
        tracing::info!(worker_type = self.type_name(), task = %self.description, "task stopped");
    }

    fn on_error(&self, error: &str) {
        tracing::warn!(worker_type = self.type_name(), task = %self.description, error, "task failed");
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
