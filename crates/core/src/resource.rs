// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capacity-limited resource
//!
//! A resource with `capacity == 1` behaves like a mutex, anything larger like a
//! counting semaphore. The resource never queues: a denied request leaves no trace
//! here, retrying is the coordinator's business.

use crate::id::{ClientId, ResourceName};
use serde::{Deserialize, Serialize};

/// Exclusive vs. shared access, derived from capacity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    Mutex,
    Semaphore,
}

impl ResourceKind {
    pub fn for_capacity(capacity: u32) -> Self {
        if capacity == 1 {
            ResourceKind::Mutex
        } else {
            ResourceKind::Semaphore
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Mutex => write!(f, "mutex"),
            ResourceKind::Semaphore => write!(f, "semaphore"),
        }
    }
}

/// A named resource and the clients currently inside it
#[derive(Clone, Debug)]
pub struct Resource {
    name: ResourceName,
    capacity: u32,
    /// Current holders, in grant order
    holders: Vec<ClientId>,
}

impl Resource {
    /// Create an empty resource. Capacity is clamped to at least one slot;
    /// configuration loading rejects zero before it gets here.
    pub fn new(name: impl Into<ResourceName>, capacity: u32) -> Self {
        Self {
            name: name.into(),
            capacity: capacity.max(1),
            holders: Vec::new(),
        }
    }

    pub fn name(&self) -> &ResourceName {
        &self.name
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn kind(&self) -> ResourceKind {
        ResourceKind::for_capacity(self.capacity)
    }

    pub fn holders(&self) -> &[ClientId] {
        &self.holders
    }

    /// Free slots
    pub fn available(&self) -> u32 {
        self.capacity.saturating_sub(self.holders.len() as u32)
    }

    /// True iff another client could be granted right now
    pub fn is_open(&self) -> bool {
        (self.holders.len() as u32) < self.capacity
    }

    pub fn is_held_by(&self, client: &ClientId) -> bool {
        self.holders.contains(client)
    }

    /// Grant the resource if a slot is free.
    ///
    /// A client that already holds the resource is granted again without
    /// taking a second slot.
    pub fn acquire(&mut self, client: &ClientId) -> bool {
        if self.is_held_by(client) {
            return true;
        }
        if !self.is_open() {
            return false;
        }
        self.holders.push(client.clone());
        true
    }

    /// Client-initiated release. Returns false, without mutating, when the
    /// client is not a current holder.
    pub fn release(&mut self, client: &ClientId) -> bool {
        self.remove_holder(client)
    }

    /// Coordinator-initiated removal during deadlock recovery.
    ///
    /// Same mutation as [`Resource::release`], kept separate so the protocol
    /// check on client releases stays distinct from preemption.
    pub fn force_release(&mut self, client: &ClientId) -> bool {
        let removed = self.remove_holder(client);
        if removed {
            tracing::debug!(resource = %self.name, client = %client, "holder preempted");
        }
        removed
    }

    fn remove_holder(&mut self, client: &ClientId) -> bool {
        match self.holders.iter().position(|h| h == client) {
            Some(idx) => {
                self.holders.remove(idx);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
