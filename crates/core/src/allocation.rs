// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Allocation table: the single source of truth for who holds what
//!
//! Owned and mutated only by the coordinator. Readers get a [`ResourceSnapshot`]
//! copy, never a reference into the live table.

use crate::id::{ClientId, ResourceName};
use crate::resource::{Resource, ResourceKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from allocation operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("unknown resource: {0}")]
    UnknownResource(ResourceName),
    #[error("{client} does not hold {resource}")]
    NotHolder {
        client: ClientId,
        resource: ResourceName,
    },
    #[error("duplicate resource: {0}")]
    DuplicateResource(ResourceName),
}

/// Point-in-time copy of one resource
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub name: ResourceName,
    pub capacity: u32,
    pub kind: ResourceKind,
    pub holders: Vec<ClientId>,
}

/// All resources, keyed by name
#[derive(Clone, Debug, Default)]
pub struct AllocationTable {
    resources: BTreeMap<ResourceName, Resource>,
}

impl AllocationTable {
    pub fn new() -> Self {
        Self {
            resources: BTreeMap::new(),
        }
    }

    /// Build a table from `(name, capacity)` pairs
    pub fn from_resources<I, N>(defs: I) -> Result<Self, AllocationError>
    where
        I: IntoIterator<Item = (N, u32)>,
        N: Into<ResourceName>,
    {
        let mut table = Self::new();
        for (name, capacity) in defs {
            table.add_resource(Resource::new(name, capacity))?;
        }
        Ok(table)
    }

    pub fn add_resource(&mut self, resource: Resource) -> Result<(), AllocationError> {
        if self.resources.contains_key(resource.name()) {
            return Err(AllocationError::DuplicateResource(resource.name().clone()));
        }
        self.resources.insert(resource.name().clone(), resource);
        Ok(())
    }

    pub fn get(&self, name: &ResourceName) -> Option<&Resource> {
        self.resources.get(name)
    }

    pub fn contains(&self, name: &ResourceName) -> bool {
        self.resources.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    fn resource_mut(&mut self, name: &ResourceName) -> Result<&mut Resource, AllocationError> {
        self.resources
            .get_mut(name)
            .ok_or_else(|| AllocationError::UnknownResource(name.clone()))
    }

    /// Attempt to acquire a resource. `Ok(false)` means the resource is full.
    pub fn acquire(
        &mut self,
        name: &ResourceName,
        client: &ClientId,
    ) -> Result<bool, AllocationError> {
        Ok(self.resource_mut(name)?.acquire(client))
    }

    /// Client-initiated release
    pub fn release(&mut self, name: &ResourceName, client: &ClientId) -> Result<(), AllocationError> {
        if self.resource_mut(name)?.release(client) {
            Ok(())
        } else {
            Err(AllocationError::NotHolder {
                client: client.clone(),
                resource: name.clone(),
            })
        }
    }

    /// Preemption: remove the client regardless of protocol state.
    /// Returns whether the client was actually a holder.
    pub fn force_release(
        &mut self,
        name: &ResourceName,
        client: &ClientId,
    ) -> Result<bool, AllocationError> {
        Ok(self.resource_mut(name)?.force_release(client))
    }

    /// Current holders of a resource, in grant order
    pub fn holders(&self, name: &ResourceName) -> Result<&[ClientId], AllocationError> {
        self.resources
            .get(name)
            .map(Resource::holders)
            .ok_or_else(|| AllocationError::UnknownResource(name.clone()))
    }

    /// Every resource the client currently holds
    pub fn held_by(&self, client: &ClientId) -> Vec<ResourceName> {
        self.resources
            .values()
            .filter(|r| r.is_held_by(client))
            .map(|r| r.name().clone())
            .collect()
    }

    /// Read-only copy of every resource and its holders
    pub fn snapshot(&self) -> Vec<ResourceSnapshot> {
        self.resources
            .values()
            .map(|r| ResourceSnapshot {
                name: r.name().clone(),
                capacity: r.capacity(),
                kind: r.kind(),
                holders: r.holders().to_vec(),
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "allocation_tests.rs"]
mod tests;
