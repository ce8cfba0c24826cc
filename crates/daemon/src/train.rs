// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Simulated trains: one task per client walking its itinerary.

use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use yard_core::{ClientId, ResourceName};

use crate::protocol::{Request, Response, ResponseCommand};
use crate::transport::{Transport, TransportError};

/// Timing knobs for a train
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Time spent inside each resource before moving on
    pub travel_time: Duration,
    /// Pause before asking again after a WAIT
    pub retry_interval: Duration,
    /// Consecutive transport failures tolerated per request
    pub max_transport_retries: u32,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            travel_time: Duration::from_millis(50),
            retry_interval: Duration::from_millis(10),
            max_transport_retries: 5,
        }
    }
}

/// What a train went through on its way
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainReport {
    pub id: ClientId,
    pub grants: u32,
    pub waits: u32,
    pub preemptions: u32,
}

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("{client}: transport failed: {source}")]
    Transport {
        client: ClientId,
        #[source]
        source: TransportError,
    },

    #[error("{client}: request for {resource} denied")]
    Denied {
        client: ClientId,
        resource: ResourceName,
    },

    #[error("{client}: unexpected {command} reply to {request}")]
    UnexpectedResponse {
        client: ClientId,
        request: String,
        command: ResponseCommand,
    },
}

/// Exponential backoff capped at 64x the base, saturating instead of overflowing
fn backoff(base: Duration, attempt: u32) -> Duration {
    base.checked_mul(2u32.saturating_pow(attempt.min(6)))
        .unwrap_or(Duration::MAX)
}

struct Train<'a, T: Transport + ?Sized> {
    transport: &'a T,
    id: ClientId,
    config: &'a TrainConfig,
}

impl<T: Transport + ?Sized> Train<'_, T> {
    /// Send with bounded exponential backoff on retryable transport errors
    async fn send(&self, request: Request) -> Result<Response, TrainError> {
        let mut attempt = 0u32;
        loop {
            match self.transport.request(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.config.max_transport_retries => {
                    let delay = backoff(self.config.retry_interval, attempt);
                    warn!(
                        client = %self.id,
                        attempt = attempt + 1,
                        error = %e,
                        "transport error, retrying in {:?}",
                        delay
                    );
                    attempt += 1;
                    sleep(delay).await;
                }
                Err(source) => {
                    return Err(TrainError::Transport {
                        client: self.id.clone(),
                        source,
                    })
                }
            }
        }
    }

    async fn release(&self, resource: &ResourceName) -> Result<(), TrainError> {
        let response = self
            .send(Request::release(self.id.clone(), resource.clone()))
            .await?;
        match response.command {
            ResponseCommand::Released => Ok(()),
            // Preempted holds are dropped before we get here, so this is a violation
            ResponseCommand::Deny => Err(TrainError::Denied {
                client: self.id.clone(),
                resource: resource.clone(),
            }),
            command => Err(TrainError::UnexpectedResponse {
                client: self.id.clone(),
                request: format!("RELEASE {}", resource),
                command,
            }),
        }
    }
}

/// Walk `itinerary` to the end, then report completion.
///
/// The previous resource is released only after the next one is granted.
/// A DENY naming an earlier resource means the train was preempted out of
/// it and must go back and request it again.
pub async fn run_train<T: Transport + ?Sized>(
    transport: &T,
    id: ClientId,
    itinerary: Vec<ResourceName>,
    config: &TrainConfig,
) -> Result<TrainReport, TrainError> {
    let train = Train {
        transport,
        id: id.clone(),
        config,
    };
    let mut report = TrainReport {
        id: id.clone(),
        ..TrainReport::default()
    };
    let mut held: Option<ResourceName> = None;
    let mut position = 0;

    info!(client = %id, stops = itinerary.len(), "train departing");

    while let Some(target) = itinerary.get(position) {
        let response = train
            .send(Request::acquire(id.clone(), target.clone()))
            .await?;

        match response.command {
            ResponseCommand::Grant => {
                report.grants += 1;
                if let Some(previous) = held.replace(target.clone()) {
                    if &previous != target {
                        train.release(&previous).await?;
                    }
                }
                debug!(client = %id, resource = %target, "entered");
                sleep(config.travel_time).await;
                position += 1;
            }
            ResponseCommand::Wait => {
                report.waits += 1;
                sleep(config.retry_interval).await;
            }
            ResponseCommand::Deny => {
                let lost = response.resource;
                let Some(rewind) = itinerary[..position].iter().rposition(|r| r == &lost) else {
                    return Err(TrainError::Denied {
                        client: id,
                        resource: lost,
                    });
                };
                if held.as_ref() == Some(&lost) {
                    held = None;
                }
                report.preemptions += 1;
                info!(client = %id, resource = %lost, "preempted, going back");
                position = rewind;
            }
            command => {
                return Err(TrainError::UnexpectedResponse {
                    client: id,
                    request: format!("ACQUIRE {}", target),
                    command,
                })
            }
        }
    }

    if let Some(last) = held.take() {
        train.release(&last).await?;
    }

    let last = itinerary.last().cloned().unwrap_or_default();
    let response = train.send(Request::complete(id.clone(), last)).await?;
    if response.command != ResponseCommand::Released {
        return Err(TrainError::UnexpectedResponse {
            client: id,
            request: "COMPLETE".to_string(),
            command: response.command,
        });
    }

    info!(client = %id, grants = report.grants, waits = report.waits, "train arrived");
    Ok(report)
}

#[cfg(test)]
#[path = "train_tests.rs"]
mod tests;
