// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Switchyard coordinator: protocol, coordinator loop, transports and
//! simulated trains.

pub mod coordinator;
pub mod lifecycle;
pub mod listener;
pub mod protocol;
pub mod server;
pub mod sim_log;
pub mod train;
pub mod transport;

pub use coordinator::{Coordinator, CoordinatorSnapshot, Stats, Step};
pub use lifecycle::{run, LifecycleError, RunConfig, RunOutcome};
pub use protocol::{Request, RequestCommand, Response, ResponseCommand};
pub use server::{serve, Envelope, RunSummary, ServerError};
pub use sim_log::{spawn_writer, EventSink, Fanout, NoopSink, SimulationLog};
pub use train::{run_train, TrainConfig, TrainError, TrainReport};
pub use transport::{ChannelTransport, SocketTransport, Transport, TransportError};
