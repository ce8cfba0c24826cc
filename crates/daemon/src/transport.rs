// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! How a train reaches the coordinator.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::net::UnixStream;
use tokio::sync::{mpsc, oneshot};

use crate::protocol::{self, ProtocolError, Request, Response, DEFAULT_TIMEOUT};
use crate::server::Envelope;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("coordinator is no longer accepting requests")]
    Closed,

    #[error("coordinator dropped the request without replying")]
    NoReply,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl TransportError {
    /// Whether trying the same request again could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Closed => false,
            TransportError::NoReply | TransportError::Io(_) => true,
            TransportError::Protocol(e) => matches!(
                e,
                ProtocolError::Timeout | ProtocolError::ConnectionClosed | ProtocolError::Io(_)
            ),
        }
    }
}

/// Request/response channel to the coordinator
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, request: Request) -> Result<Response, TransportError>;
}

/// In-process transport over the coordinator's request channel
#[derive(Clone, Debug)]
pub struct ChannelTransport {
    tx: mpsc::Sender<Envelope>,
}

impl ChannelTransport {
    pub fn new(tx: mpsc::Sender<Envelope>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn request(&self, request: Request) -> Result<Response, TransportError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Envelope { request, reply })
            .await
            .map_err(|_| TransportError::Closed)?;
        rx.await.map_err(|_| TransportError::NoReply)
    }
}

/// One connection per request over a Unix socket
#[derive(Clone, Debug)]
pub struct SocketTransport {
    socket_path: PathBuf,
    timeout: Duration,
}

impl SocketTransport {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

#[async_trait]
impl Transport for SocketTransport {
    async fn request(&self, request: Request) -> Result<Response, TransportError> {
        let stream = UnixStream::connect(&self.socket_path).await?;
        let (mut reader, mut writer) = stream.into_split();

        protocol::write_request(&mut writer, &request, self.timeout).await?;
        let response = protocol::read_response(&mut reader, self.timeout).await?;
        Ok(response)
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
