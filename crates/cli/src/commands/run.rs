// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `strand run <plan>` - start the workers of a plan file

use super::{report, stop_on_interrupt, Settings};
use crate::plan::Plan;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use strand_engine::ThreadManager;

#[derive(Args)]
pub struct RunArgs {
    /// Plan file (TOML)
    pub plan: PathBuf,

    /// Stop every worker after this long (e.g. "30s")
    #[arg(long, value_parser = humantime::parse_duration)]
    pub duration: Option<Duration>,

    /// How often to print a status report
    #[arg(long, value_parser = humantime::parse_duration, default_value = "1s")]
    pub status_every: Duration,
}

pub fn handle(args: RunArgs, settings: &Settings) -> Result<()> {
    let plan = Plan::load(&args.plan)?;
    let config = settings.manager_config(plan.manager.clone())?;
    let manager = Arc::new(ThreadManager::with_config(config));
    stop_on_interrupt(&manager)?;

    for spec in &plan.workers {
        let id = manager
            .create_thread_with_worker(spec.build(), spec.name())
            .with_context(|| format!("failed to start {} worker", spec.kind()))?;
        tracing::debug!(thread_id = %id, kind = spec.kind(), "plan worker started");
    }
    report(&manager, settings.format);

    let deadline = args.duration.map(|duration| Instant::now() + duration);
    let status_every = args.status_every.max(Duration::from_millis(1));
    while !manager.wait_for_all_timeout(status_every) {
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            tracing::info!("run duration elapsed, stopping workers");
            manager.stop_all();
            manager.wait_for_all();
            break;
        }
        report(&manager, settings.format);
    }

    println!("All workers finished");
    Ok(())
}
