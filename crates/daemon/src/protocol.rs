// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol between trains and the coordinator.
//!
//! Every message is a 4-byte big-endian length prefix followed by a JSON body.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use yard_core::{ClientId, ResourceName};

/// Default timeout for a single read or write on a connection
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on a single message body
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Commands a train can send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestCommand {
    Acquire,
    Release,
    Complete,
}

impl std::fmt::Display for RequestCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RequestCommand::Acquire => "ACQUIRE",
            RequestCommand::Release => "RELEASE",
            RequestCommand::Complete => "COMPLETE",
        };
        write!(f, "{}", s)
    }
}

/// Replies the coordinator can send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseCommand {
    Grant,
    Wait,
    Released,
    Deny,
}

impl std::fmt::Display for ResponseCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResponseCommand::Grant => "GRANT",
            ResponseCommand::Wait => "WAIT",
            ResponseCommand::Released => "RELEASED",
            ResponseCommand::Deny => "DENY",
        };
        write!(f, "{}", s)
    }
}

/// Train -> coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub command: RequestCommand,
    pub client_id: ClientId,
    pub resource: ResourceName,
}

impl Request {
    pub fn new(
        command: RequestCommand,
        client_id: impl Into<ClientId>,
        resource: impl Into<ResourceName>,
    ) -> Self {
        Self {
            command,
            client_id: client_id.into(),
            resource: resource.into(),
        }
    }

    pub fn acquire(client_id: impl Into<ClientId>, resource: impl Into<ResourceName>) -> Self {
        Self::new(RequestCommand::Acquire, client_id, resource)
    }

    pub fn release(client_id: impl Into<ClientId>, resource: impl Into<ResourceName>) -> Self {
        Self::new(RequestCommand::Release, client_id, resource)
    }

    pub fn complete(client_id: impl Into<ClientId>, resource: impl Into<ResourceName>) -> Self {
        Self::new(RequestCommand::Complete, client_id, resource)
    }
}

/// Coordinator -> train
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub command: ResponseCommand,
    pub client_id: ClientId,
    pub resource: ResourceName,
}

impl Response {
    /// Reply to `request` with `command`, echoing its client and resource
    pub fn to(request: &Request, command: ResponseCommand) -> Self {
        Self {
            command,
            client_id: request.client_id.clone(),
            resource: request.resource.clone(),
        }
    }

    pub fn is_grant(&self) -> bool {
        self.command == ResponseCommand::Grant
    }
}

/// Protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("Timeout")]
    Timeout,

    #[error("Connection closed")]
    ConnectionClosed,
}

/// Serialize a message to JSON (no length prefix)
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(message)?)
}

/// Deserialize a JSON body
pub fn decode<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Read one length-prefixed message body
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::ConnectionClosed)
        }
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ProtocolError::ConnectionClosed
        } else {
            ProtocolError::Io(e)
        }
    })?;
    Ok(body)
}

/// Write one message body with its length prefix
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    data: &[u8],
) -> Result<(), ProtocolError> {
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: data.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    let len = data.len() as u32;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

async fn read_typed<R, T>(reader: &mut R, timeout: Duration) -> Result<T, ProtocolError>
where
    R: AsyncRead + Unpin,
    T: for<'de> Deserialize<'de>,
{
    let body = tokio::time::timeout(timeout, read_message(reader))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    decode(&body)
}

async fn write_typed<W, T>(writer: &mut W, message: &T, timeout: Duration) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let body = encode(message)?;
    tokio::time::timeout(timeout, write_message(writer, &body))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

pub async fn read_request<R: AsyncRead + Unpin>(
    reader: &mut R,
    timeout: Duration,
) -> Result<Request, ProtocolError> {
    read_typed(reader, timeout).await
}

pub async fn write_request<W: AsyncWrite + Unpin>(
    writer: &mut W,
    request: &Request,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    write_typed(writer, request, timeout).await
}

pub async fn read_response<R: AsyncRead + Unpin>(
    reader: &mut R,
    timeout: Duration,
) -> Result<Response, ProtocolError> {
    read_typed(reader, timeout).await
}

pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    write_typed(writer, response, timeout).await
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
