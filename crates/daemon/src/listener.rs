// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix socket front end: forwards each connection's request into the
//! coordinator channel and writes the reply back.

use thiserror::Error;
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error};

use crate::protocol::{self, ProtocolError, DEFAULT_TIMEOUT};
use crate::transport::{ChannelTransport, Transport, TransportError};

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Coordinator unavailable: {0}")]
    Coordinator(#[from] TransportError),

    #[error("Request timeout")]
    Timeout,
}

/// Accept connections forever, one task per connection
pub async fn serve_socket(listener: UnixListener, coordinator: ChannelTransport) {
    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let coordinator = coordinator.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(&coordinator, stream).await {
                        error!("Error handling connection: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
            }
        }
    }
}

/// Handle a single request on one connection
pub async fn handle_connection(
    coordinator: &ChannelTransport,
    stream: UnixStream,
) -> Result<(), ListenerError> {
    let (mut reader, mut writer) = stream.into_split();

    let request = match protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await {
        Ok(req) => req,
        Err(ProtocolError::Timeout) => {
            error!("Request read timeout");
            return Err(ListenerError::Timeout);
        }
        Err(ProtocolError::ConnectionClosed) => {
            debug!("Client disconnected before sending request");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    debug!(?request, "received request");
    let response = coordinator.request(request).await?;
    debug!(?response, "sending response");

    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT).await?;
    Ok(())
}
