// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use serde::Serialize;
use strand_engine::ThreadSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print output in the specified format
pub fn print<T: Serialize + std::fmt::Display>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", value),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string(value) {
                println!("{}", json);
            }
        }
    }
}

/// Print a status report: one line per thread plus the active count
pub fn print_status(snapshots: &[ThreadSnapshot], active: usize, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            for snapshot in snapshots {
                println!("  {}", snapshot);
            }
            println!("active threads: {}", active);
        }
        OutputFormat::Json => {
            let report = serde_json::json!({ "active": active, "threads": snapshots });
            println!("{}", report);
        }
    }
}
