// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Yard definitions: resources and the clients that traverse them

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use yard_core::{AllocationTable, ClientProcess, ClientTable, ResourceName};

/// A resource definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDef {
    pub name: String,
    /// 1 for exclusive access, more for shared
    pub capacity: u32,
}

/// A client definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDef {
    pub id: String,
    /// Resources to traverse, in order
    pub itinerary: Vec<String>,
}

/// A parsed yard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YardConfig {
    pub resources: Vec<ResourceDef>,
    pub clients: Vec<ClientDef>,
}

impl YardConfig {
    pub fn get_resource(&self, name: &str) -> Option<&ResourceDef> {
        self.resources.iter().find(|r| r.name == name)
    }

    pub fn get_client(&self, id: &str) -> Option<&ClientDef> {
        self.clients.iter().find(|c| c.id == id)
    }

    /// Check the yard is runnable: at least one resource and client, unique
    /// non-empty names, positive capacities, and itineraries that only name
    /// configured resources.
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.resources.is_empty() {
            return Err(ParseError::Empty("resource"));
        }
        if self.clients.is_empty() {
            return Err(ParseError::Empty("client"));
        }

        let mut names = BTreeSet::new();
        for res in &self.resources {
            if res.name.is_empty() {
                return Err(ParseError::MissingField("resource name".to_string()));
            }
            if res.capacity == 0 {
                return Err(ParseError::InvalidCapacity {
                    resource: res.name.clone(),
                });
            }
            if !names.insert(res.name.as_str()) {
                return Err(ParseError::Duplicate(format!("resource.{}", res.name)));
            }
        }

        let mut ids = BTreeSet::new();
        for client in &self.clients {
            if client.id.is_empty() {
                return Err(ParseError::MissingField("client id".to_string()));
            }
            if !ids.insert(client.id.as_str()) {
                return Err(ParseError::Duplicate(format!("client.{}", client.id)));
            }
            if let Some(missing) = client.itinerary.iter().find(|r| !names.contains(r.as_str())) {
                return Err(ParseError::UnknownResource {
                    client: client.id.clone(),
                    resource: missing.clone(),
                });
            }
        }

        Ok(())
    }

    /// Build the coordinator's allocation table
    pub fn allocation_table(&self) -> Result<AllocationTable, ParseError> {
        AllocationTable::from_resources(
            self.resources
                .iter()
                .map(|r| (r.name.clone(), r.capacity)),
        )
        .map_err(|e| ParseError::InvalidFormat(e.to_string()))
    }

    /// Build the coordinator's client table
    pub fn client_table(&self) -> Result<ClientTable, ParseError> {
        let mut table = ClientTable::new();
        for def in &self.clients {
            let itinerary = def
                .itinerary
                .iter()
                .map(|r| ResourceName::new(r.clone()))
                .collect();
            if !table.insert(ClientProcess::new(def.id.clone(), itinerary)) {
                return Err(ParseError::Duplicate(format!("client.{}", def.id)));
            }
        }
        Ok(table)
    }
}

#[cfg(test)]
#[path = "yard_tests.rs"]
mod tests;
