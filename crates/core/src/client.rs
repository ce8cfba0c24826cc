// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client process state as seen by the coordinator

use crate::id::{ClientId, ResourceName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle of a client
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientState {
    /// Has not been granted anything yet
    Pending,
    /// Working through its itinerary
    Active,
    /// Sent COMPLETE
    Complete,
}

/// A client and its progress through its itinerary
#[derive(Clone, Debug)]
pub struct ClientProcess {
    pub id: ClientId,
    pub itinerary: Vec<ResourceName>,
    /// Index of the next itinerary entry to acquire
    pub position: usize,
    /// The resource the client is currently inside
    pub current_resource: Option<ResourceName>,
    pub state: ClientState,
    /// Set by recovery; cleared once the client has been told
    pub preempted: Option<ResourceName>,
}

impl ClientProcess {
    pub fn new(id: impl Into<ClientId>, itinerary: Vec<ResourceName>) -> Self {
        Self {
            id: id.into(),
            itinerary,
            position: 0,
            current_resource: None,
            state: ClientState::Pending,
            preempted: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == ClientState::Complete
    }

    /// The itinerary entry the client should request next
    pub fn next_resource(&self) -> Option<&ResourceName> {
        self.itinerary.get(self.position)
    }

    /// Record a grant. The position only moves when the grant is for the
    /// expected itinerary entry.
    pub fn record_grant(&mut self, resource: &ResourceName) {
        if self.next_resource() == Some(resource) {
            self.position += 1;
        }
        self.current_resource = Some(resource.clone());
        if self.state == ClientState::Pending {
            self.state = ClientState::Active;
        }
    }

    /// Record a client-initiated release. `still_held` is what the allocation
    /// table lists for this client afterwards; releasing the current resource
    /// out of order leaves the client inside the one it still holds.
    pub fn record_release(&mut self, resource: &ResourceName, still_held: &[ResourceName]) {
        if self.current_resource.as_ref() == Some(resource) {
            self.current_resource = still_held.last().cloned();
        }
    }

    /// Record forced removal from `resource`: the client is no longer inside
    /// it and must request it again before moving on.
    pub fn record_preemption(&mut self, resource: &ResourceName) {
        if self.current_resource.as_ref() == Some(resource) {
            self.current_resource = None;
        }
        if let Some(idx) = self.itinerary[..self.position]
            .iter()
            .rposition(|r| r == resource)
        {
            self.position = idx;
        }
        self.preempted = Some(resource.clone());
    }

    pub fn mark_complete(&mut self) {
        self.state = ClientState::Complete;
        self.current_resource = None;
        self.preempted = None;
    }
}

/// Summary row for diagnostics
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSnapshot {
    pub id: ClientId,
    pub state: ClientState,
    pub position: usize,
    pub itinerary_len: usize,
    pub current_resource: Option<ResourceName>,
}

/// All configured clients, keyed by id
#[derive(Clone, Debug, Default)]
pub struct ClientTable {
    clients: BTreeMap<ClientId, ClientProcess>,
}

impl ClientTable {
    pub fn new() -> Self {
        Self {
            clients: BTreeMap::new(),
        }
    }

    /// Insert a client. Returns false if the id was already present.
    pub fn insert(&mut self, client: ClientProcess) -> bool {
        if self.clients.contains_key(&client.id) {
            return false;
        }
        self.clients.insert(client.id.clone(), client);
        true
    }

    pub fn get(&self, id: &ClientId) -> Option<&ClientProcess> {
        self.clients.get(id)
    }

    pub fn get_mut(&mut self, id: &ClientId) -> Option<&mut ClientProcess> {
        self.clients.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn completed(&self) -> usize {
        self.clients.values().filter(|c| c.is_complete()).count()
    }

    pub fn all_complete(&self) -> bool {
        self.clients.values().all(ClientProcess::is_complete)
    }

    pub fn snapshot(&self) -> Vec<ClientSnapshot> {
        self.clients
            .values()
            .map(|c| ClientSnapshot {
                id: c.id.clone(),
                state: c.state,
                position: c.position,
                itinerary_len: c.itinerary.len(),
                current_resource: c.current_resource.clone(),
            })
            .collect()
    }
}
