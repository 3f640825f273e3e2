// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker contract and state machine
//!
//! - **WorkerState** - `Stopped -> Running <-> Paused -> Finished`
//! - **WorkerControl** - lock-free state field plus stop/pause request flags
//! - **Worker** - capability trait every unit of work implements
//! - **WorkerFactory** - named, deferred worker construction

mod contract;
mod control;
mod factory;
mod state;

pub use contract::Worker;
pub use control::{WorkerControl, DEFAULT_POLL_INTERVAL};
pub use factory::{FnFactory, WorkerFactory};
pub use state::WorkerState;
