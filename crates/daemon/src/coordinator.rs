// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The coordinator: single owner of allocation, client and wait-for state.
//!
//! Each request is processed to completion, followed by one deadlock
//! detection and recovery pass, before the next request is looked at.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use yard_config::{ParseError, YardConfig};
use yard_core::{
    detect, recover, AllocationError, AllocationTable, ClientId, ClientSnapshot, ClientTable,
    DenyReason, Event, RecoveryOutcome, ResourceName, ResourceSnapshot, WaitEntry, WaitForGraph,
};

use crate::protocol::{Request, RequestCommand, Response, ResponseCommand};

/// Result of processing one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub response: Response,
    pub events: Vec<Event>,
}

/// Running counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub requests: u64,
    pub grants: u64,
    pub waits: u64,
    pub releases: u64,
    pub denials: u64,
    pub deadlocks: u64,
    pub preemptions: u64,
}

/// Diagnostic view of the whole coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorSnapshot {
    pub resources: Vec<ResourceSnapshot>,
    pub waits: Vec<(ClientId, WaitEntry)>,
    pub clients: Vec<ClientSnapshot>,
}

pub struct Coordinator {
    table: AllocationTable,
    graph: WaitForGraph,
    clients: ClientTable,
    stats: Stats,
    finished: bool,
}

impl Coordinator {
    pub fn new(table: AllocationTable, clients: ClientTable) -> Self {
        Self {
            table,
            graph: WaitForGraph::new(),
            clients,
            stats: Stats::default(),
            finished: false,
        }
    }

    /// Build from a validated yard
    pub fn from_yard(yard: &YardConfig) -> Result<Self, ParseError> {
        yard.validate()?;
        Ok(Self::new(yard.allocation_table()?, yard.client_table()?))
    }

    /// Process one request
    pub fn handle(&mut self, request: Request) -> Step {
        self.stats.requests += 1;
        let mut events = vec![Event::RequestReceived {
            client: request.client_id.clone(),
            resource: request.resource.clone(),
            command: request.command.to_string(),
        }];

        let response = match request.command {
            RequestCommand::Acquire => self.acquire(&request, &mut events),
            RequestCommand::Release => self.release(&request, &mut events),
            RequestCommand::Complete => self.complete(&request, &mut events),
        };

        self.detect_and_recover(&mut events);

        if !self.finished && self.clients.all_complete() {
            self.finished = true;
            info!(clients = self.clients.len(), "all clients complete");
            events.push(Event::RunComplete {
                clients: self.clients.len(),
            });
        }

        Step { response, events }
    }

    /// True once every configured client has completed
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Resources the client currently holds
    pub fn held_by(&self, client: &ClientId) -> Vec<ResourceName> {
        self.table.held_by(client)
    }

    pub fn holders(&self, resource: &ResourceName) -> Vec<ClientId> {
        self.table
            .holders(resource)
            .map(<[ClientId]>::to_vec)
            .unwrap_or_default()
    }

    pub fn wait_for_graph(&self) -> &WaitForGraph {
        &self.graph
    }

    pub fn snapshot(&self) -> CoordinatorSnapshot {
        CoordinatorSnapshot {
            resources: self.table.snapshot(),
            waits: self.graph.snapshot(),
            clients: self.clients.snapshot(),
        }
    }

    fn deny(&mut self, request: &Request, reason: DenyReason, events: &mut Vec<Event>) -> Response {
        warn!(
            client = %request.client_id,
            resource = %request.resource,
            command = %request.command,
            %reason,
            "request denied"
        );
        self.stats.denials += 1;
        events.push(Event::Denied {
            client: request.client_id.clone(),
            resource: request.resource.clone(),
            reason,
        });
        Response::to(request, ResponseCommand::Deny)
    }

    fn acquire(&mut self, request: &Request, events: &mut Vec<Event>) -> Response {
        let id = &request.client_id;
        let Some(client) = self.clients.get_mut(id) else {
            return self.deny(request, DenyReason::UnknownClient, events);
        };
        if client.is_complete() {
            return self.deny(request, DenyReason::ClientComplete, events);
        }
        if !self.table.contains(&request.resource) {
            return self.deny(request, DenyReason::UnknownResource, events);
        }

        // A preempted client learns about it on its next acquire
        if let Some(lost) = client.preempted.take() {
            if lost != request.resource {
                self.graph.clear(id);
                self.stats.denials += 1;
                info!(client = %id, resource = %lost, "delivering preemption notice");
                events.push(Event::Denied {
                    client: id.clone(),
                    resource: lost.clone(),
                    reason: DenyReason::Preempted,
                });
                return Response {
                    command: ResponseCommand::Deny,
                    client_id: id.clone(),
                    resource: lost,
                };
            }
        }

        // Besides a repeat acquire, only a hand-over from a single hold is allowed
        let held = self.table.held_by(id);
        if !held.contains(&request.resource) && held.len() > 1 {
            return self.deny(request, DenyReason::HoldLimit, events);
        }

        match self.table.acquire(&request.resource, id) {
            Ok(true) => {
                self.graph.clear(id);
                if let Some(client) = self.clients.get_mut(id) {
                    client.record_grant(&request.resource);
                }
                let available = self
                    .table
                    .get(&request.resource)
                    .map(|r| r.available())
                    .unwrap_or(0);
                self.stats.grants += 1;
                debug!(client = %id, resource = %request.resource, available, "granted");
                events.push(Event::Granted {
                    client: id.clone(),
                    resource: request.resource.clone(),
                    available,
                });
                Response::to(request, ResponseCommand::Grant)
            }
            Ok(false) => {
                let (holders, kind) = match self.table.get(&request.resource) {
                    Some(r) => (r.holders().to_vec(), r.kind()),
                    None => return self.deny(request, DenyReason::UnknownResource, events),
                };
                self.graph.record_wait(id, &request.resource, &holders);
                self.stats.waits += 1;
                debug!(client = %id, resource = %request.resource, ?holders, "must wait");
                events.push(Event::Waiting {
                    client: id.clone(),
                    resource: request.resource.clone(),
                    kind,
                    holders,
                });
                Response::to(request, ResponseCommand::Wait)
            }
            Err(_) => self.deny(request, DenyReason::UnknownResource, events),
        }
    }

    fn release(&mut self, request: &Request, events: &mut Vec<Event>) -> Response {
        let id = &request.client_id;
        if self.clients.get(id).is_none() {
            return self.deny(request, DenyReason::UnknownClient, events);
        }

        match self.table.release(&request.resource, id) {
            Ok(()) => {
                let still_held = self.table.held_by(id);
                if let Some(client) = self.clients.get_mut(id) {
                    client.record_release(&request.resource, &still_held);
                }
                // Waiters on this resource no longer wait on this client
                self.graph.remove_edges_to(id, &request.resource);
                self.stats.releases += 1;
                debug!(client = %id, resource = %request.resource, "released");
                events.push(Event::Released {
                    client: id.clone(),
                    resource: request.resource.clone(),
                });
                Response::to(request, ResponseCommand::Released)
            }
            Err(AllocationError::NotHolder { .. }) => {
                self.deny(request, DenyReason::NotHolder, events)
            }
            Err(_) => self.deny(request, DenyReason::UnknownResource, events),
        }
    }

    fn complete(&mut self, request: &Request, events: &mut Vec<Event>) -> Response {
        let id = &request.client_id;
        let Some(client) = self.clients.get(id) else {
            return self.deny(request, DenyReason::UnknownClient, events);
        };
        if client.is_complete() {
            debug!(client = %id, "duplicate completion acknowledged");
            return Response::to(request, ResponseCommand::Released);
        }

        self.graph.clear(id);
        for resource in self.table.held_by(id) {
            warn!(
                client = %id,
                resource = %resource,
                "client completed while still holding a resource, releasing it"
            );
            if let Ok(true) = self.table.force_release(&resource, id) {
                self.graph.remove_edges_to(id, &resource);
                events.push(Event::Released {
                    client: id.clone(),
                    resource,
                });
            }
        }

        if let Some(client) = self.clients.get_mut(id) {
            client.mark_complete();
        }
        info!(
            client = %id,
            completed = self.clients.completed(),
            total = self.clients.len(),
            "client complete"
        );
        events.push(Event::ClientCompleted { client: id.clone() });
        Response::to(request, ResponseCommand::Released)
    }

    fn detect_and_recover(&mut self, events: &mut Vec<Event>) {
        let Some(cycle) = detect(&self.graph) else {
            return;
        };
        self.stats.deadlocks += 1;
        warn!(cycle = %yard_core::format_cycle(&cycle), "deadlock detected");
        events.push(Event::DeadlockDetected {
            cycle: cycle.clone(),
        });

        if let RecoveryOutcome::Preempted {
            victim, resource, ..
        } = recover(&cycle, &mut self.table, &mut self.graph, &mut self.clients)
        {
            self.stats.preemptions += 1;
            events.push(Event::Preempted { victim, resource });
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
