// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! strand thread manager
//!
//! Owns one dedicated OS thread per registered worker and drives the
//! start/pause/resume/stop/wait/cleanup protocol across them.

mod error;
mod host;
mod manager;
mod registry;

pub use error::{ManagerError, ManagerResultExt};
pub use manager::ThreadManager;
pub use registry::{ThreadId, ThreadSnapshot};
