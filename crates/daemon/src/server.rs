// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator event loop.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use yard_core::Event;

use crate::coordinator::{Coordinator, Stats};
use crate::protocol::{Request, Response};
use crate::sim_log::EventSink;

/// A request paired with the channel its reply goes back on
#[derive(Debug)]
pub struct Envelope {
    pub request: Request,
    pub reply: oneshot::Sender<Response>,
}

/// What the loop reports once every client has completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub clients: usize,
    pub stats: Stats,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} clients, {} requests, {} grants, {} waits, {} denials, {} deadlocks, {} preemptions",
            self.clients,
            self.stats.requests,
            self.stats.grants,
            self.stats.waits,
            self.stats.denials,
            self.stats.deadlocks,
            self.stats.preemptions
        )
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("request channel closed with {completed} of {total} clients complete")]
    ChannelClosed { completed: usize, total: usize },
}

fn trace_event(event: &Event) {
    match event {
        Event::RequestReceived {
            client,
            resource,
            command,
        } => debug!(%client, %resource, %command, "request received"),
        Event::DeadlockDetected { cycle } => {
            info!(cycle = %yard_core::format_cycle(cycle), "deadlock detected")
        }
        Event::Preempted { victim, resource } => info!(%victim, %resource, "preempted"),
        Event::RunComplete { clients } => info!(clients, "run complete"),
        other => debug!(event = other.name(), client = ?other.client(), "event"),
    }
}

/// Process requests until every client has completed.
///
/// Requests are handled strictly one at a time, in receive order. A reply
/// whose receiver has gone away is logged and dropped.
pub async fn serve(
    mut coordinator: Coordinator,
    mut requests: mpsc::Receiver<Envelope>,
    mut sink: impl EventSink,
) -> Result<RunSummary, ServerError> {
    let summary = |c: &Coordinator| RunSummary {
        clients: c.client_count(),
        stats: c.stats(),
    };

    while let Some(Envelope { request, reply }) = requests.recv().await {
        let step = coordinator.handle(request);
        for event in &step.events {
            trace_event(event);
            sink.emit(event);
        }

        if reply.send(step.response).is_err() {
            warn!("client went away before its reply was delivered");
        }

        if coordinator.is_finished() {
            sink.flush();
            return Ok(summary(&coordinator));
        }
    }

    sink.flush();
    let snapshot = coordinator.snapshot();
    Err(ServerError::ChannelClosed {
        completed: snapshot
            .clients
            .iter()
            .filter(|c| c.state == yard_core::ClientState::Complete)
            .count(),
        total: snapshot.clients.len(),
    })
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
