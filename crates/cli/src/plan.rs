// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker plan files for `strand run`

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::thread;
use std::time::Duration;
use strand_core::{ManagerConfig, Worker};
use strand_workers::{LoopWorker, MonitorWorker, TaskWorker, TimerWorker, TracedWorker};

/// Manager settings plus the workers to start, in order
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    #[serde(default)]
    pub manager: ManagerConfig,
    #[serde(default, rename = "worker")]
    pub workers: Vec<WorkerSpec>,
}

impl Plan {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).context("invalid plan")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read plan {}", path.display()))?;
        Self::from_toml_str(&source)
    }
}

fn default_interval() -> Duration {
    Duration::from_secs(1)
}

/// One `[[worker]]` table, selected by its `kind`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkerSpec {
    Monitor {
        name: Option<String>,
        #[serde(default = "default_interval", with = "humantime_serde")]
        interval: Duration,
    },
    Timer {
        name: Option<String>,
        #[serde(default = "default_interval", with = "humantime_serde")]
        interval: Duration,
        max_triggers: Option<u32>,
    },
    Loop {
        name: Option<String>,
        iterations: u32,
        /// Pause between iterations
        #[serde(default, with = "humantime_serde")]
        delay: Duration,
    },
    Task {
        name: Option<String>,
        description: Option<String>,
        /// Simulated work time
        #[serde(default, with = "humantime_serde")]
        duration: Duration,
    },
}

impl WorkerSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerSpec::Monitor { .. } => "monitor",
            WorkerSpec::Timer { .. } => "timer",
            WorkerSpec::Loop { .. } => "loop",
            WorkerSpec::Task { .. } => "task",
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            WorkerSpec::Monitor { name, .. }
            | WorkerSpec::Timer { name, .. }
            | WorkerSpec::Loop { name, .. }
            | WorkerSpec::Task { name, .. } => name.as_deref(),
        }
    }

    /// Build the worker, wrapped for tracing
    pub fn build(&self) -> Box<dyn Worker> {
        let label = self.name().unwrap_or(self.kind()).to_string();
        match self {
            WorkerSpec::Monitor { interval, .. } => {
                Box::new(TracedWorker::new(MonitorWorker::new(*interval)))
            }
            WorkerSpec::Timer {
                interval,
                max_triggers,
                ..
            } => {
                let timer = TimerWorker::new(*interval, move || {
                    tracing::info!(worker = %label, "timer fired");
                    Ok(())
                });
                timer.set_max_triggers(*max_triggers);
                Box::new(TracedWorker::new(timer))
            }
            WorkerSpec::Loop {
                iterations, delay, ..
            } => {
                let delay = *delay;
                Box::new(TracedWorker::new(LoopWorker::new(*iterations, move |i| {
                    tracing::debug!(worker = %label, iteration = i, "loop iteration");
                    thread::sleep(delay);
                    Ok(())
                })))
            }
            WorkerSpec::Task {
                description,
                duration,
                ..
            } => {
                let duration = *duration;
                let task = TaskWorker::new(move || {
                    thread::sleep(duration);
                    tracing::info!(worker = %label, "task done");
                    Ok(())
                })
                .with_description(description.clone().unwrap_or_default());
                Box::new(TracedWorker::new(task))
            }
        }
    }
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
