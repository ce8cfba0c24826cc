// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events emitted by the coordinator, one per state transition

use crate::id::{ClientId, ResourceName};
use crate::resource::ResourceKind;
use serde::{Deserialize, Serialize};

/// Why a request was denied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    UnknownResource,
    UnknownClient,
    NotHolder,
    /// The client was preempted and must re-request this resource
    Preempted,
    ClientComplete,
    /// The client still holds a resource besides the one it is handing over from
    HoldLimit,
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DenyReason::UnknownResource => "unknown resource",
            DenyReason::UnknownClient => "unknown client",
            DenyReason::NotHolder => "client is not a holder",
            DenyReason::Preempted => "client was preempted",
            DenyReason::ClientComplete => "client already complete",
            DenyReason::HoldLimit => "client must release before acquiring more",
        };
        write!(f, "{}", s)
    }
}

/// Observable coordinator events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    RequestReceived {
        client: ClientId,
        resource: ResourceName,
        command: String,
    },
    Granted {
        client: ClientId,
        resource: ResourceName,
        /// Free slots left after the grant
        available: u32,
    },
    Waiting {
        client: ClientId,
        resource: ResourceName,
        kind: ResourceKind,
        holders: Vec<ClientId>,
    },
    Released {
        client: ClientId,
        resource: ResourceName,
    },
    Denied {
        client: ClientId,
        resource: ResourceName,
        reason: DenyReason,
    },
    DeadlockDetected {
        cycle: Vec<ClientId>,
    },
    Preempted {
        victim: ClientId,
        resource: ResourceName,
    },
    ClientCompleted {
        client: ClientId,
    },
    RunComplete {
        clients: usize,
    },
}

impl Event {
    /// Stable event name used in logs and subscriptions
    pub fn name(&self) -> &'static str {
        match self {
            Event::RequestReceived { .. } => "request:received",
            Event::Granted { .. } => "resource:granted",
            Event::Waiting { .. } => "resource:waiting",
            Event::Released { .. } => "resource:released",
            Event::Denied { .. } => "resource:denied",
            Event::DeadlockDetected { .. } => "deadlock:detected",
            Event::Preempted { .. } => "deadlock:preempted",
            Event::ClientCompleted { .. } => "client:complete",
            Event::RunComplete { .. } => "run:complete",
        }
    }

    /// The client this event concerns, if it concerns exactly one
    pub fn client(&self) -> Option<&ClientId> {
        match self {
            Event::RequestReceived { client, .. }
            | Event::Granted { client, .. }
            | Event::Waiting { client, .. }
            | Event::Released { client, .. }
            | Event::Denied { client, .. }
            | Event::ClientCompleted { client } => Some(client),
            Event::Preempted { victim, .. } => Some(victim),
            Event::DeadlockDetected { .. } | Event::RunComplete { .. } => None,
        }
    }
}

/// Render a cycle as `a -> b -> a`
pub fn format_cycle(cycle: &[ClientId]) -> String {
    let mut parts: Vec<&str> = cycle.iter().map(ClientId::as_str).collect();
    if let Some(first) = cycle.first() {
        parts.push(first.as_str());
    }
    parts.join(" -> ")
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
