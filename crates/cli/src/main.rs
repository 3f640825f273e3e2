// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! strand - run and supervise dedicated worker threads

mod commands;
mod logging;
mod output;
mod plan;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{demo, run, Settings};
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "strand",
    version,
    about = "strand - dedicated worker threads with cooperative pause and stop"
)]
struct Cli {
    /// Manager config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Thread ceiling, overriding any config (0 = unbounded)
    #[arg(long, global = true)]
    max_threads: Option<usize>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Output format for status reports
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one of the bundled demonstrations
    Demo(demo::DemoArgs),
    /// Start the workers described in a plan file and wait for them
    Run(run::RunArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::setup_logging(cli.log_file.as_deref())?;

    let settings = Settings {
        config: cli.config,
        max_threads: cli.max_threads,
        format: cli.format,
    };

    match cli.command {
        Commands::Demo(args) => demo::handle(args, &settings),
        Commands::Run(args) => run::handle(args, &settings),
    }
}
