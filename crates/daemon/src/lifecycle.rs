// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run lifecycle: startup, spawning trains, waiting for completion, cleanup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::net::UnixListener;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use yard_config::{ParseError, YardConfig};
use yard_core::{ClientId, Event, ResourceName};

use crate::coordinator::Coordinator;
use crate::listener::serve_socket;
use crate::server::{serve, RunSummary, ServerError};
use crate::sim_log::{spawn_writer, Fanout, SimulationLog};
use crate::train::{run_train, TrainConfig, TrainError, TrainReport};
use crate::transport::{ChannelTransport, SocketTransport, Transport};

/// How a run is wired up
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Serve trains over this Unix socket instead of in-process channels
    pub socket_path: Option<PathBuf>,
    /// Write the `[HH:MM:SS]` simulation log here
    pub sim_log_path: Option<PathBuf>,
    pub train: TrainConfig,
    /// Depth of the coordinator's request channel
    pub queue_depth: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            socket_path: None,
            sim_log_path: None,
            train: TrainConfig::default(),
            queue_depth: 64,
        }
    }
}

/// A finished run
#[derive(Debug)]
pub struct RunOutcome {
    pub summary: RunSummary,
    pub trains: Vec<TrainReport>,
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Invalid yard: {0}")]
    Config(#[from] ParseError),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("Failed to create simulation log at {0}: {1}")]
    SimLog(PathBuf, std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Train failed: {0}")]
    Train(#[from] TrainError),

    #[error("Coordinator stopped: {0}")]
    Server(#[from] ServerError),

    #[error("Task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Run every client in `yard` to completion.
///
/// `events`, when given, receives a copy of every coordinator event.
pub async fn run(
    yard: &YardConfig,
    config: RunConfig,
    events: Option<mpsc::UnboundedSender<Event>>,
) -> Result<RunOutcome, LifecycleError> {
    // Validate before touching the filesystem
    let coordinator = Coordinator::from_yard(yard)?;

    let mut sink = Fanout::new();
    let mut sim_writer = None;
    if let Some(path) = &config.sim_log_path {
        let log =
            SimulationLog::create(path).map_err(|e| LifecycleError::SimLog(path.clone(), e))?;
        let (tx, handle) = spawn_writer(log);
        sink = sink.with(tx);
        sim_writer = Some(handle);
    }
    if let Some(tx) = events {
        sink = sink.with(tx);
    }

    let (tx, rx) = mpsc::channel(config.queue_depth.max(1));
    let channel = ChannelTransport::new(tx);

    let mut listener_task = None;
    let transport: Arc<dyn Transport> = match &config.socket_path {
        Some(path) => {
            let listener = bind(path)?;
            info!(socket = %path.display(), "listening");
            listener_task = Some(tokio::spawn(serve_socket(listener, channel)));
            Arc::new(SocketTransport::new(path))
        }
        None => Arc::new(channel),
    };

    let server = tokio::spawn(serve(coordinator, rx, sink));

    let mut trains = JoinSet::new();
    for client in &yard.clients {
        let transport = Arc::clone(&transport);
        let id = ClientId::new(client.id.as_str());
        let itinerary: Vec<ResourceName> = client
            .itinerary
            .iter()
            .map(|r| ResourceName::new(r.as_str()))
            .collect();
        let train_config = config.train.clone();
        trains.spawn(async move { run_train(&*transport, id, itinerary, &train_config).await });
    }
    // Only trains and the listener hold senders from here on
    drop(transport);

    let result = collect(trains, server).await;

    if let Some(task) = listener_task {
        task.abort();
    }
    if let Some(path) = &config.socket_path {
        cleanup_socket(path);
    }
    // Done once the server has dropped its sink
    if let Some(writer) = sim_writer {
        if let Err(e) = writer.await {
            warn!(error = %e, "simulation log writer failed");
        }
    }

    let outcome = result?;
    info!(summary = %outcome.summary, "run finished");
    Ok(outcome)
}

async fn collect(
    mut trains: JoinSet<Result<TrainReport, TrainError>>,
    server: tokio::task::JoinHandle<Result<RunSummary, ServerError>>,
) -> Result<RunOutcome, LifecycleError> {
    let mut reports = Vec::new();
    while let Some(joined) = trains.join_next().await {
        match joined {
            Ok(Ok(report)) => reports.push(report),
            Ok(Err(e)) => {
                error!(error = %e, "train failed, stopping run");
                trains.abort_all();
                server.abort();
                return Err(e.into());
            }
            Err(e) => {
                trains.abort_all();
                server.abort();
                return Err(e.into());
            }
        }
    }

    let summary = server.await??;
    reports.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(RunOutcome {
        summary,
        trains: reports,
    })
}

fn bind(path: &Path) -> Result<UnixListener, LifecycleError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    // Remove stale socket
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    UnixListener::bind(path).map_err(|e| LifecycleError::BindFailed(path.to_path_buf(), e))
}

fn cleanup_socket(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Failed to remove socket file: {}", e);
        }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
