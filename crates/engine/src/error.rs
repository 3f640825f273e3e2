// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the thread manager

use crate::registry::ThreadId;
use strand_core::{WorkerError, WorkerState};
use thiserror::Error;

/// Why a manager operation was refused.
///
/// None of these are fatal: the registry and factory map are left exactly
/// as they were before the failed call.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("thread not found: {0}")]
    ThreadNotFound(ThreadId),
    #[error("factory already registered: {0}")]
    FactoryExists(String),
    #[error("no factory registered for type: {0}")]
    UnknownType(String),
    #[error("no factory accepts config: {0}")]
    NoFactoryForConfig(String),
    #[error("thread limit reached ({max})")]
    AtCapacity { max: usize },
    #[error("factory {type_name} failed to construct a worker: {source}")]
    Construction {
        type_name: String,
        #[source]
        source: WorkerError,
    },
    #[error("thread {id} is {actual}, expected {expected}")]
    InvalidState {
        id: ThreadId,
        expected: WorkerState,
        actual: WorkerState,
    },
    #[error("worker has already been started (state {0})")]
    AlreadyStarted(WorkerState),
    #[error("failed to spawn thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Collapse a creation result into the sentinel-id form
pub trait ManagerResultExt {
    /// The new id, or [`ThreadId::INVALID`] on any failure
    fn or_sentinel(self) -> ThreadId;
}

impl ManagerResultExt for Result<ThreadId, ManagerError> {
    fn or_sentinel(self) -> ThreadId {
        self.unwrap_or(ThreadId::INVALID)
    }
}
