// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker state machine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a worker
///
/// A worker starts `Stopped` and is moved to `Running` as its thread is
/// started. It may bounce between `Running` and `Paused` while it cooperates,
/// and ends in `Finished`, which is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerState {
    /// Created but not yet started
    Stopped,
    /// Executing its run body
    Running,
    /// Parked inside the continuation check
    Paused,
    /// Run body has returned; never left again
    Finished,
}

impl WorkerState {
    /// Check whether the state machine allows moving to `target`
    pub fn can_transition_to(self, target: WorkerState) -> bool {
        use WorkerState::*;

        matches!(
            (self, target),
            (Stopped, Running)
                | (Running, Paused)
                | (Paused, Running)
                | (Running, Finished)
                | (Paused, Finished)
        )
    }

    /// Running or paused: the hosting thread is still live
    pub fn is_active(self) -> bool {
        matches!(self, WorkerState::Running | WorkerState::Paused)
    }

    pub fn is_terminal(self) -> bool {
        self == WorkerState::Finished
    }

    pub(crate) fn as_u8(self) -> u8 {
        match self {
            WorkerState::Stopped => 0,
            WorkerState::Running => 1,
            WorkerState::Paused => 2,
            WorkerState::Finished => 3,
        }
    }

    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            1 => WorkerState::Running,
            2 => WorkerState::Paused,
            3 => WorkerState::Finished,
            _ => WorkerState::Stopped,
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkerState::Stopped => "STOPPED",
            WorkerState::Running => "RUNNING",
            WorkerState::Paused => "PAUSED",
            WorkerState::Finished => "FINISHED",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
