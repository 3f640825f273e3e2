// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod demo;
pub mod run;

use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::{Arc, Weak};
use strand_core::ManagerConfig;
use strand_engine::ThreadManager;

/// Options shared by every command
pub struct Settings {
    pub config: Option<PathBuf>,
    pub max_threads: Option<usize>,
    pub format: OutputFormat,
}

impl Settings {
    /// Layer the config file and `--max-threads` over `base`
    pub fn manager_config(&self, base: ManagerConfig) -> Result<ManagerConfig> {
        let mut config = match &self.config {
            Some(path) => ManagerConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => base,
        };
        if let Some(max_threads) = self.max_threads {
            config.max_threads = max_threads;
        }
        Ok(config)
    }
}

/// Ctrl-C asks every worker to stop; the command's own wait then returns
fn stop_on_interrupt(manager: &Arc<ThreadManager>) -> Result<()> {
    let manager: Weak<ThreadManager> = Arc::downgrade(manager);
    ctrlc::set_handler(move || {
        eprintln!("\nStopping all workers...");
        if let Some(manager) = manager.upgrade() {
            manager.stop_all();
        }
    })?;
    Ok(())
}

fn report(manager: &ThreadManager, format: OutputFormat) {
    output::print_status(&manager.snapshots(), manager.active_thread_count(), format);
}
