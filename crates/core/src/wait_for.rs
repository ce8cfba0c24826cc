// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wait-for graph built from denied requests
//!
//! An edge `A -> B` means A's last request was denied for a resource B holds.
//! Only clients whose most recent request failed have an entry; it is not a
//! copy of the allocation table.

use crate::id::{ClientId, ResourceName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a blocked client is waiting for
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitEntry {
    /// The resource the client asked for
    pub resource: ResourceName,
    /// Clients holding that resource when the request was denied
    pub holders: Vec<ClientId>,
}

/// Blocked client -> holders of the resource it wants.
///
/// Iteration is in ascending client id order so detection is reproducible.
#[derive(Clone, Debug, Default)]
pub struct WaitForGraph {
    entries: BTreeMap<ClientId, WaitEntry>,
}

impl WaitForGraph {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Record that `client` was denied `resource`, replacing any previous entry.
    ///
    /// A client is never made to wait on itself; such a holder is dropped and
    /// reported. Returns the number of edges recorded.
    pub fn record_wait(
        &mut self,
        client: &ClientId,
        resource: &ResourceName,
        holders: &[ClientId],
    ) -> usize {
        let mut edges: Vec<ClientId> = Vec::with_capacity(holders.len());
        for holder in holders {
            if holder == client {
                tracing::warn!(
                    client = %client,
                    resource = %resource,
                    "internal inconsistency: refusing self-edge in wait-for graph"
                );
                continue;
            }
            if !edges.contains(holder) {
                edges.push(holder.clone());
            }
        }

        if edges.is_empty() {
            self.entries.remove(client);
            return 0;
        }

        let count = edges.len();
        self.entries.insert(
            client.clone(),
            WaitEntry {
                resource: resource.clone(),
                holders: edges,
            },
        );
        count
    }

    /// Drop the client's entry (after a grant, completion, or preemption)
    pub fn clear(&mut self, client: &ClientId) -> Option<WaitEntry> {
        self.entries.remove(client)
    }

    /// Remove every `X -> holder` edge where X waits on `resource`.
    /// Entries left without edges are dropped. Returns the number of edges removed.
    pub fn remove_edges_to(&mut self, holder: &ClientId, resource: &ResourceName) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            if &entry.resource == resource {
                let before = entry.holders.len();
                entry.holders.retain(|h| h != holder);
                removed += before - entry.holders.len();
            }
            !entry.holders.is_empty()
        });
        removed
    }

    /// Clients that `client` waits on (empty if it is not blocked)
    pub fn successors(&self, client: &ClientId) -> &[ClientId] {
        self.entries
            .get(client)
            .map(|e| e.holders.as_slice())
            .unwrap_or(&[])
    }

    pub fn entry(&self, client: &ClientId) -> Option<&WaitEntry> {
        self.entries.get(client)
    }

    /// Blocked clients, in iteration order
    pub fn nodes(&self) -> impl Iterator<Item = &ClientId> {
        self.entries.keys()
    }

    pub fn contains(&self, client: &ClientId) -> bool {
        self.entries.contains_key(client)
    }

    pub fn has_edge(&self, from: &ClientId, to: &ClientId) -> bool {
        self.successors(from).contains(to)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.entries.values().map(|e| e.holders.len()).sum()
    }

    /// Read-only copy for diagnostics
    pub fn snapshot(&self) -> Vec<(ClientId, WaitEntry)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
#[path = "wait_for_tests.rs"]
mod tests;
