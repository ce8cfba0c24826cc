// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Yard TOML parsing
//!
//! ```toml
//! [resource.IntersectionA]
//! capacity = 1
//!
//! [client.Train1]
//! itinerary = ["IntersectionA", "IntersectionB"]
//! ```

use crate::legacy;
use crate::yard::{ClientDef, ResourceDef, YardConfig};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading a yard
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("missing required field: {0}")]
    MissingField(String),
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    #[error("invalid capacity for resource {resource}: must be at least 1")]
    InvalidCapacity { resource: String },
    #[error("duplicate definition: {0}")]
    Duplicate(String),
    #[error("client {client} references unknown resource {resource}")]
    UnknownResource { client: String, resource: String },
    #[error("no {0} definitions")]
    Empty(&'static str),
    #[error("line {line}: {message}")]
    Line { line: usize, message: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Parse a yard from TOML content. The result is not validated.
pub fn parse_yard(content: &str) -> Result<YardConfig, ParseError> {
    let raw: toml::Value = toml::from_str(content)?;
    let table = raw
        .as_table()
        .ok_or_else(|| ParseError::InvalidFormat("root must be a table".to_string()))?;

    let mut yard = YardConfig::default();

    if let Some(resources) = table.get("resource") {
        let resources = resources
            .as_table()
            .ok_or_else(|| ParseError::InvalidFormat("resource must be a table".to_string()))?;
        for (name, value) in resources {
            yard.resources.push(parse_resource(name, value)?);
        }
    }

    if let Some(clients) = table.get("client") {
        let clients = clients
            .as_table()
            .ok_or_else(|| ParseError::InvalidFormat("client must be a table".to_string()))?;
        for (id, value) in clients {
            yard.clients.push(parse_client(id, value)?);
        }
    }

    Ok(yard)
}

fn parse_resource(name: &str, value: &toml::Value) -> Result<ResourceDef, ParseError> {
    let table = value
        .as_table()
        .ok_or_else(|| ParseError::InvalidFormat(format!("resource.{} must be a table", name)))?;

    let capacity = table
        .get("capacity")
        .ok_or_else(|| ParseError::MissingField(format!("resource.{}.capacity", name)))?
        .as_integer()
        .ok_or_else(|| {
            ParseError::InvalidFormat(format!("resource.{}.capacity must be an integer", name))
        })?;

    let capacity = u32::try_from(capacity).map_err(|_| ParseError::InvalidCapacity {
        resource: name.to_string(),
    })?;

    Ok(ResourceDef {
        name: name.to_string(),
        capacity,
    })
}

fn parse_client(id: &str, value: &toml::Value) -> Result<ClientDef, ParseError> {
    let table = value
        .as_table()
        .ok_or_else(|| ParseError::InvalidFormat(format!("client.{} must be a table", id)))?;

    let itinerary = table
        .get("itinerary")
        .ok_or_else(|| ParseError::MissingField(format!("client.{}.itinerary", id)))?
        .as_array()
        .ok_or_else(|| {
            ParseError::InvalidFormat(format!("client.{}.itinerary must be an array", id))
        })?
        .iter()
        .map(|v| {
            v.as_str().map(String::from).ok_or_else(|| {
                ParseError::InvalidFormat(format!(
                    "client.{}.itinerary entries must be strings",
                    id
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ClientDef {
        id: id.to_string(),
        itinerary,
    })
}

/// Load and validate a TOML yard file
pub fn load_yard(path: &Path) -> Result<YardConfig, ParseError> {
    let content = read(path)?;
    let yard = parse_yard(&content)?;
    yard.validate()?;
    Ok(yard)
}

/// Load and validate a legacy `intersections.txt` / `trains.txt` pair
pub fn load_legacy(intersections: &Path, trains: &Path) -> Result<YardConfig, ParseError> {
    let yard = YardConfig {
        resources: legacy::parse_intersections(&read(intersections)?)?,
        clients: legacy::parse_trains(&read(trains)?)?,
    };
    yard.validate()?;
    Ok(yard)
}

fn read(path: &Path) -> Result<String, ParseError> {
    std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
