// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry bookkeeping: ids, entries and status snapshots

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle, Thread};
use std::time::{Duration, Instant};
use strand_core::{Clock, Worker, WorkerState};

/// Identifier of a managed thread; never reused within one manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(u64);

impl ThreadId {
    /// Reserved failure value for callers using the sentinel convention
    pub const INVALID: ThreadId = ThreadId(u64::MAX);

    pub fn as_u64(self) -> u64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl From<u64> for ThreadId {
    fn from(raw: u64) -> Self {
        ThreadId(raw)
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Point-in-time view of one managed thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadSnapshot {
    pub id: ThreadId,
    pub name: String,
    pub type_name: String,
    pub description: String,
    pub state: WorkerState,
    #[serde(with = "humantime_serde")]
    pub uptime: Duration,
}

impl fmt::Display for ThreadSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.name, self.type_name, self.state)
    }
}

/// Bookkeeping record pairing a worker with its thread
pub(crate) struct RegistryEntry {
    pub(crate) id: ThreadId,
    pub(crate) name: String,
    pub(crate) worker: Arc<dyn Worker>,
    /// Taken by whoever joins the thread first
    pub(crate) handle: Option<JoinHandle<()>>,
    pub(crate) thread: Thread,
    pub(crate) running: Arc<AtomicBool>,
    pub(crate) start_time: Instant,
}

impl RegistryEntry {
    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Whether the caller is this entry's own hosting thread
    pub(crate) fn is_current_thread(&self) -> bool {
        self.thread.id() == thread::current().id()
    }

    /// Thread has exited and the worker reached its terminal state
    pub(crate) fn is_reapable(&self) -> bool {
        !self.is_running() && self.worker.is_finished()
    }

    pub(crate) fn snapshot(&self, clock: &impl Clock) -> ThreadSnapshot {
        ThreadSnapshot {
            id: self.id,
            name: self.name.clone(),
            type_name: self.worker.type_name().to_string(),
            description: self.worker.description(),
            state: self.worker.state(),
            uptime: clock.elapsed_since(self.start_time),
        }
    }
}

/// Shared between the manager and every hosting thread
#[derive(Default)]
pub(crate) struct Registry {
    entries: Mutex<BTreeMap<ThreadId, RegistryEntry>>,
    /// Signalled by each hosting thread as it exits
    pub(crate) exited: Condvar,
}

impl Registry {
    pub(crate) fn lock(&self) -> MutexGuard<'_, BTreeMap<ThreadId, RegistryEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
