// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Ready-made workers for the strand thread manager

pub mod data_processor;
pub mod file_monitor;
pub mod loop_worker;
pub mod monitor;
pub mod network;
pub mod task;
pub mod timer;
pub mod traced;

#[cfg(any(test, feature = "test-support"))]
mod fake;

pub use data_processor::DataProcessorWorker;
pub use file_monitor::FileMonitorWorker;
pub use loop_worker::LoopWorker;
pub use monitor::MonitorWorker;
pub use network::{NetworkCheckerWorker, Probe, TcpProbe};
pub use task::TaskWorker;
pub use timer::TimerWorker;
pub use traced::TracedWorker;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use fake::{HookCall, HookRecorder, ScriptedWorker};

use strand_core::WorkerError;

/// Repeated callback run by periodic workers
pub type Callback = Box<dyn Fn() -> Result<(), WorkerError> + Send + Sync>;
