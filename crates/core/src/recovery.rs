// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deadlock recovery by forced preemption
//!
//! Victim policy: the first client of the detected cycle. This is deterministic
//! and breaks the cycle it was given; it makes no fairness promise, so the same
//! client can be chosen again on a later pass.

use crate::allocation::AllocationTable;
use crate::client::ClientTable;
use crate::id::{ClientId, ResourceName};
use crate::wait_for::WaitForGraph;
use tracing::{info, warn};

/// What a recovery pass did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// The victim was removed from `resource`
    Preempted {
        victim: ClientId,
        resource: ResourceName,
        /// Wait-for edges removed because the victim no longer holds `resource`
        edges_cleared: usize,
    },
    /// Called with an empty cycle; nothing to do
    EmptyCycle,
    /// The allocation table shows the victim holding nothing; wait-for and
    /// allocation state disagree
    VictimNotHolding { victim: ClientId },
}

impl RecoveryOutcome {
    pub fn is_preempted(&self) -> bool {
        matches!(self, RecoveryOutcome::Preempted { .. })
    }
}

/// Break `cycle` by preempting its first client.
///
/// The victim is removed from its current resource (or, if that is stale, from
/// whatever the allocation table says it holds), rewound so that it must
/// request that resource again, and every wait-for edge pointing at it because
/// of that resource is dropped along with its own wait entry.
pub fn recover(
    cycle: &[ClientId],
    table: &mut AllocationTable,
    graph: &mut WaitForGraph,
    clients: &mut ClientTable,
) -> RecoveryOutcome {
    let Some(victim) = cycle.first() else {
        warn!("recovery invoked with an empty cycle");
        return RecoveryOutcome::EmptyCycle;
    };

    let current = clients
        .get(victim)
        .and_then(|c| c.current_resource.clone());
    let confirmed = current
        .clone()
        .filter(|r| table.get(r).is_some_and(|res| res.is_held_by(victim)));
    if confirmed.is_none() && current.is_some() {
        warn!(
            victim = %victim,
            "internal inconsistency: current resource is not held, falling back to the allocation table"
        );
    }

    // The allocation table is authoritative when the client's view is stale
    let Some(resource) = confirmed.or_else(|| table.held_by(victim).pop()) else {
        warn!(
            victim = %victim,
            "internal inconsistency: deadlock victim holds no resource"
        );
        return RecoveryOutcome::VictimNotHolding {
            victim: victim.clone(),
        };
    };

    match table.force_release(&resource, victim) {
        Ok(true) => {}
        Ok(false) => {
            warn!(
                victim = %victim,
                resource = %resource,
                "internal inconsistency: victim's current resource does not list it as holder"
            );
        }
        Err(e) => {
            warn!(victim = %victim, error = %e, "internal inconsistency during preemption");
            return RecoveryOutcome::VictimNotHolding {
                victim: victim.clone(),
            };
        }
    }

    if let Some(client) = clients.get_mut(victim) {
        client.record_preemption(&resource);
    }

    let edges_cleared = graph.remove_edges_to(victim, &resource);
    graph.clear(victim);

    info!(
        victim = %victim,
        resource = %resource,
        edges_cleared,
        "preempted deadlock victim"
    );

    RecoveryOutcome::Preempted {
        victim: victim.clone(),
        resource,
        edges_cleared,
    }
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
