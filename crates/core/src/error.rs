// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by worker bodies and factories

use thiserror::Error;

/// Failure reported by a worker's `run` body or by a factory
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("{0}")]
    Failed(String),
    #[error("{context}: {message}")]
    Callback { context: String, message: String },
    #[error("worker construction failed: {0}")]
    Construction(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn failed(message: impl Into<String>) -> Self {
        WorkerError::Failed(message.into())
    }

    /// Wrap a callback failure with the worker-specific context prefix
    pub fn callback(context: impl Into<String>, source: impl std::fmt::Display) -> Self {
        WorkerError::Callback {
            context: context.into(),
            message: source.to_string(),
        }
    }
}
