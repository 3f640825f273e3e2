// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `strand demo` - guided tours of the manager and the stock workers

use super::{report, stop_on_interrupt, Settings};
use crate::output;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::net::TcpListener;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use strand_core::{FnFactory, ManagerConfig, Worker, DEFAULT_POLL_INTERVAL};
use strand_engine::ThreadManager;
use strand_workers::{
    DataProcessorWorker, FileMonitorWorker, MonitorWorker, NetworkCheckerWorker, TaskWorker,
    TimerWorker,
};

#[derive(Args)]
pub struct DemoArgs {
    /// Time scale: 2 runs twice as fast
    #[arg(long, default_value_t = 1.0, value_parser = parse_speed, global = true)]
    pub speed: f64,

    #[command(subcommand)]
    pub command: DemoCommand,
}

#[derive(Subcommand)]
pub enum DemoCommand {
    /// Monitor, task and timer workers with pause, resume and stop
    Basic,
    /// File monitor, data processor and network checker
    Custom,
}

/// Keeps every scaled demo duration well inside `Duration`
const SPEED_RANGE: RangeInclusive<f64> = 0.01..=1000.0;

fn parse_speed(s: &str) -> Result<f64, String> {
    let speed: f64 = s.parse().map_err(|_| format!("invalid speed: {s}"))?;
    if SPEED_RANGE.contains(&speed) {
        Ok(speed)
    } else {
        Err(format!(
            "speed must be between {} and {}, got {s}",
            SPEED_RANGE.start(),
            SPEED_RANGE.end()
        ))
    }
}

/// Scales demo durations
#[derive(Clone, Copy)]
struct Pace(f64);

impl Pace {
    fn ms(self, millis: u64) -> Duration {
        Duration::from_millis(millis).div_f64(self.0)
    }

    fn sleep(self, millis: u64) {
        thread::sleep(self.ms(millis));
    }
}

pub fn handle(args: DemoArgs, settings: &Settings) -> Result<()> {
    let pace = Pace(args.speed);
    let base = ManagerConfig::default().with_poll_interval(DEFAULT_POLL_INTERVAL.div_f64(pace.0));
    let manager = Arc::new(ThreadManager::with_config(settings.manager_config(base)?));
    stop_on_interrupt(&manager)?;

    match args.command {
        DemoCommand::Basic => basic(&manager, pace, settings),
        DemoCommand::Custom => custom(&manager, pace, settings),
    }
}

fn basic(manager: &ThreadManager, pace: Pace, settings: &Settings) -> Result<()> {
    println!("1. Monitor thread (runs until stopped)");
    let checks = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&checks);
    let monitor = MonitorWorker::new(pace.ms(1000)).with_callback(move || {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!(check = n, "system status check: all good");
        Ok(())
    });
    let monitor_id = manager
        .create_thread_with_worker(monitor, Some("SystemMonitor"))
        .context("failed to create monitor thread")?;

    println!("2. Task thread (runs once)");
    let download = TaskWorker::new(move || {
        for percent in (0..=100).step_by(25) {
            if percent > 0 {
                pace.sleep(500);
            }
            tracing::info!(percent, "download progress");
        }
        Ok(())
    })
    .with_description("File download task");
    manager
        .create_thread_with_worker(download, Some("FileDownloader"))
        .context("failed to create task thread")?;

    println!("3. Timer thread (5 triggers)");
    manager
        .add_factory(
            FnFactory::new("maintenance", move || {
                let fired = AtomicU32::new(0);
                let timer = TimerWorker::new(pace.ms(800), move || {
                    let n = fired.fetch_add(1, Ordering::SeqCst) + 1;
                    tracing::info!(run = n, "maintenance run");
                    Ok(())
                })
                .with_max_triggers(5);
                Ok(Box::new(timer) as Box<dyn Worker>)
            }),
            "maintenance",
        )
        .context("failed to register timer factory")?;
    manager
        .create_thread("maintenance", Some("MaintenanceTimer"))
        .context("failed to create timer thread")?;

    println!("4. Status checks");
    for i in 1..=8 {
        pace.sleep(1000);
        println!("--- status check #{i} ---");
        report(manager, settings.format);
    }

    println!("5. Thread control");
    println!("pausing monitor...");
    manager.pause_thread(monitor_id)?;
    pace.sleep(2000);
    println!("resuming monitor...");
    manager.resume_thread(monitor_id)?;
    pace.sleep(2000);
    println!("stopping monitor...");
    manager.stop_thread(monitor_id)?;

    println!("6. Waiting for all threads...");
    manager.wait_for_all();
    output::print(
        &BasicSummary {
            monitor_checks: checks.load(Ordering::SeqCst),
        },
        settings.format,
    );
    Ok(())
}

fn custom(manager: &ThreadManager, pace: Pace, settings: &Settings) -> Result<()> {
    println!("1. File monitor");
    let mut watched = tempfile::Builder::new()
        .prefix("strand-monitor-")
        .suffix(".txt")
        .tempfile()
        .context("failed to create watched file")?;
    writeln!(watched, "Initial content")?;
    watched.flush()?;
    let file_monitor = Arc::new(FileMonitorWorker::new(watched.path()).with_interval(pace.ms(2000)));
    manager.create_thread_with_worker(Arc::clone(&file_monitor), Some("FileMonitor"))?;

    println!("2. Data processor");
    let item_delay = pace.ms(200);
    let processor = Arc::new(DataProcessorWorker::new((1..=10).collect(), move |data| {
        let mut sum = 0;
        for n in data {
            sum += n;
            thread::sleep(item_delay);
        }
        Ok(sum)
    }));
    manager.create_thread_with_worker(Arc::clone(&processor), Some("DataProcessor"))?;

    println!("3. Network checker");
    // One endpoint that answers and one that refuses, so the demo stays offline
    let listener = TcpListener::bind("127.0.0.1:0").context("failed to bind demo endpoint")?;
    let open = listener.local_addr()?.to_string();
    let closed = TcpListener::bind("127.0.0.1:0")?.local_addr()?.to_string();
    let checker = Arc::new(
        NetworkCheckerWorker::new(vec![open, closed]).with_interval(pace.ms(3000)),
    );
    manager.create_thread_with_worker(Arc::clone(&checker), Some("NetworkChecker"))?;

    println!("4. Status checks");
    for i in 1..=10 {
        pace.sleep(1000);
        println!("--- status check #{i} ---");
        report(manager, settings.format);
        if i == 5 {
            writeln!(watched, "Additional content")?;
            watched.flush()?;
            println!("modified the watched file");
        }
    }

    println!("5. Stopping all threads...");
    manager.stop_all();
    manager.wait_for_all();
    drop(listener);

    output::print(
        &CustomSummary {
            data_result: processor.result(),
            file_changes: file_monitor.change_count(),
            network_ok: checker.success_count(),
            network_failed: checker.fail_count(),
        },
        settings.format,
    );
    Ok(())
}

#[derive(Serialize)]
struct BasicSummary {
    monitor_checks: u32,
}

impl fmt::Display for BasicSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "monitor checks: {}", self.monitor_checks)
    }
}

#[derive(Serialize)]
struct CustomSummary {
    data_result: Option<i64>,
    file_changes: u32,
    network_ok: u32,
    network_failed: u32,
}

impl fmt::Display for CustomSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data_result {
            Some(result) => writeln!(f, "data processor result: {result}")?,
            None => writeln!(f, "data processor result: none")?,
        }
        writeln!(f, "file changes: {}", self.file_changes)?;
        write!(
            f,
            "network checks: {} ok, {} failed",
            self.network_ok, self.network_failed
        )
    }
}
