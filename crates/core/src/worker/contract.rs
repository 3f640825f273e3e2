// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The capability every unit of work implements

use super::control::WorkerControl;
use super::state::WorkerState;
use crate::error::WorkerError;
use std::sync::Arc;

/// A unit of work bound to one dedicated thread.
///
/// Only `control`, `run` and `type_name` are required. Hooks default to
/// no-ops. All methods take `&self` and the trait requires `Sync`: `on_stop`,
/// `on_pause` and `on_resume` are called from the controlling thread while
/// `run` is executing on the worker thread, so any state they share with
/// `run` must live in atomics or locks.
///
/// `run` must call [`Worker::should_continue`] at every iteration boundary.
/// A worker that never does cannot be paused or stopped.
///
/// The owning manager holds none of its locks while a hook runs, so `run` and
/// the hooks may call back into it (a worker can stop its own thread).
pub trait Worker: Send + Sync {
    /// The worker's state field and request flags
    fn control(&self) -> &WorkerControl;

    /// Body executed on the dedicated thread.
    ///
    /// The state is already `Running` when this is called; the hosting thread
    /// moves it to `Finished` after this returns, whatever the outcome.
    fn run(&self) -> Result<(), WorkerError>;

    /// Stable identifier used in status output and auto-generated names
    fn type_name(&self) -> &str;

    fn description(&self) -> String {
        format!("{} worker", self.type_name())
    }

    /// Called on the creating thread before the worker thread is spawned
    fn on_initialize(&self) {}

    /// First call made on the new thread
    fn on_start(&self) {}

    /// Called from the controlling thread after a stop was requested
    fn on_stop(&self) {}

    /// Called from the controlling thread after a pause was requested
    fn on_pause(&self) {}

    /// Called from the controlling thread after a pause was lifted
    fn on_resume(&self) {}

    /// Called on the worker thread for failures inside `run`
    fn on_error(&self, _error: &str) {}

    fn state(&self) -> WorkerState {
        self.control().state()
    }

    fn is_running(&self) -> bool {
        self.state() == WorkerState::Running
    }

    fn is_paused(&self) -> bool {
        self.state() == WorkerState::Paused
    }

    fn is_stopped(&self) -> bool {
        self.state() == WorkerState::Stopped
    }

    fn is_finished(&self) -> bool {
        self.state() == WorkerState::Finished
    }

    /// See [`WorkerControl::should_continue`]
    fn should_continue(&self) -> bool {
        self.control().should_continue()
    }
}

macro_rules! forward_worker {
    ($ptr:ident) => {
        impl<W: Worker + ?Sized> Worker for $ptr<W> {
            fn control(&self) -> &WorkerControl {
                (**self).control()
            }

            fn run(&self) -> Result<(), WorkerError> {
                (**self).run()
            }

            fn type_name(&self) -> &str {
                (**self).type_name()
            }

            fn description(&self) -> String {
                (**self).description()
            }

            fn on_initialize(&self) {
                (**self).on_initialize()
            }

            fn on_start(&self) {
                (**self).on_start()
            }

            fn on_stop(&self) {
                (**self).on_stop()
            }

            fn on_pause(&self) {
                (**self).on_pause()
            }

            fn on_resume(&self) {
                (**self).on_resume()
            }

            fn on_error(&self, error: &str) {
                (**self).on_error(error)
            }

            fn should_continue(&self) -> bool {
                (**self).should_continue()
            }
        }
    };
}

// A caller can hand the manager an `Arc` clone and keep the other to read
// worker-specific counters while the manager owns the thread.
forward_worker!(Arc);
forward_worker!(Box);
