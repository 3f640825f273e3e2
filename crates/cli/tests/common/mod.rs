// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test utilities for CLI integration tests.

#![allow(dead_code)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// The `strand` binary with logging kept quiet
pub fn strand() -> Command {
    let mut cmd = Command::cargo_bin("strand").expect("binary should build");
    cmd.env("RUST_LOG", "warn");
    cmd
}

/// Write `contents` to `name` inside a fresh temp dir
pub fn write_file(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("Failed to write file");
    (dir, path)
}

/// A plan whose workers all finish on their own
pub const FINITE_PLAN: &str = r#"
[manager]
poll_interval = "10ms"

[[worker]]
kind = "loop"
name = "counter"
iterations = 3
delay = "5ms"

[[worker]]
kind = "timer"
name = "heartbeat"
interval = "10ms"
max_triggers = 2

[[worker]]
kind = "task"
name = "warmup"
duration = "10ms"
"#;
