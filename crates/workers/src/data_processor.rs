// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batch reducer over an owned data set

use std::sync::OnceLock;
use strand_core::{Worker, WorkerControl, WorkerError};

type Reducer = Box<dyn Fn(&[i64]) -> Result<i64, WorkerError> + Send + Sync>;

/// Runs a reducer over its data once and keeps the result
pub struct DataProcessorWorker {
    control: WorkerControl,
    data: Vec<i64>,
    reducer: Reducer,
    result: OnceLock<i64>,
}

impl DataProcessorWorker {
    pub fn new(
        data: Vec<i64>,
        reducer: impl Fn(&[i64]) -> Result<i64, WorkerError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            control: WorkerControl::new(),
            data,
            reducer: Box::new(reducer),
            result: OnceLock::new(),
        }
    }

    /// `None` until the reducer has succeeded
    pub fn result(&self) -> Option<i64> {
        self.result.get().copied()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Worker for DataProcessorWorker {
    fn control(&self) -> &WorkerControl {
        &self.control
    }

    fn run(&self) -> Result<(), WorkerError> {
        if !self.should_continue() {
            return Ok(());
        }
        tracing::info!(items = self.data.len(), "processing data");
        let value = (self.reducer)(&self.data)
            .map_err(|e| WorkerError::callback("Data processing failed", e))?;
        let _ = self.result.set(value);
        tracing::info!(result = value, "data processing complete");
        Ok(())
    }

    fn type_name(&self) -> &str {
        "DataProcessorWorker"
    }

    fn description(&self) -> String {
        format!("Data processor over {} items", self.data.len())
    }

    fn on_start(&self) {
        tracing::debug!(worker_type = self.type_name(), "initializing data processor");
    }

    fn on_error(&self, error: &str) {
        tracing::warn!(worker_type = self.type_name(), error, "data processing failed");
    }
}

#[cfg(test)]
#[path = "data_processor_tests.rs"]
mod tests;
