// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! strand-core: worker contract for the strand thread framework
//!
//! This crate provides:
//! - The worker state machine and its lock-free control block
//! - The `Worker` and `WorkerFactory` capability traits
//! - Manager configuration and a clock abstraction for testable time

pub mod clock;
pub mod config;
pub mod error;
pub mod worker;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, ManagerConfig};
pub use error::WorkerError;
pub use worker::{
    FnFactory, Worker, WorkerControl, WorkerFactory, WorkerState, DEFAULT_POLL_INTERVAL,
};
