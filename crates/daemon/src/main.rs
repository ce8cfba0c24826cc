// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! yardd - Switchyard coordinator
//!
//! Loads a yard, runs one simulated train per client against the
//! coordinator, and exits once every train has reached its destination.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use yard_config::{load_legacy, load_yard, YardConfig};
use yard_daemon::{run, RunConfig, RunOutcome, TrainConfig};

#[derive(Parser, Debug)]
#[command(
    name = "yardd",
    version,
    about = "Switchyard - deadlock-free train coordination"
)]
struct Cli {
    /// TOML yard definition
    #[arg(long, conflicts_with_all = ["intersections", "trains"])]
    config: Option<PathBuf>,

    /// Legacy intersections file (`Name:capacity` per line)
    #[arg(long, requires = "trains")]
    intersections: Option<PathBuf>,

    /// Legacy trains file (`Train:A,B,...` per line)
    #[arg(long, requires = "intersections")]
    trains: Option<PathBuf>,

    /// Serve trains over a Unix socket at this path
    #[arg(long)]
    socket: Option<PathBuf>,

    /// Write diagnostics here instead of stderr
    #[arg(long)]
    log: Option<PathBuf>,

    /// Write the simulation log here
    #[arg(long)]
    sim_log: Option<PathBuf>,

    /// Time a train spends inside each intersection
    #[arg(long, default_value_t = 50)]
    travel_ms: u64,

    /// Pause before a waiting train asks again
    #[arg(long, default_value_t = 10)]
    retry_ms: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = match setup_logging(cli.log.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match execute(cli).await {
        Ok(outcome) => {
            println!("run complete: {}", outcome.summary);
            for train in &outcome.trains {
                println!(
                    "  {}: {} grants, {} waits, {} preemptions",
                    train.id, train.grants, train.waits, train.preemptions
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> Result<RunOutcome> {
    let yard = load(&cli)?;
    info!(
        resources = yard.resources.len(),
        clients = yard.clients.len(),
        "yard loaded"
    );

    let config = RunConfig {
        socket_path: cli.socket,
        sim_log_path: cli.sim_log,
        train: TrainConfig {
            travel_time: Duration::from_millis(cli.travel_ms),
            retry_interval: Duration::from_millis(cli.retry_ms),
            ..TrainConfig::default()
        },
        ..RunConfig::default()
    };

    Ok(run(&yard, config, None).await?)
}

/// Load the TOML yard, or the legacy pair (defaulting to the current directory)
fn load(cli: &Cli) -> Result<YardConfig> {
    if let Some(path) = &cli.config {
        return load_yard(path).with_context(|| format!("loading {}", path.display()));
    }

    let intersections = cli
        .intersections
        .clone()
        .unwrap_or_else(|| PathBuf::from("intersections.txt"));
    let trains = cli
        .trains
        .clone()
        .unwrap_or_else(|| PathBuf::from("trains.txt"));
    load_legacy(&intersections, &trains).with_context(|| {
        format!(
            "loading {} and {}",
            intersections.display(),
            trains.display()
        )
    })
}

fn setup_logging(
    log_path: Option<&Path>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let Some(log_path) = log_path else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
        return Ok(None);
    };

    let dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;
    let file_name = log_path
        .file_name()
        .context("log path has no file name")?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(Some(guard))
}
