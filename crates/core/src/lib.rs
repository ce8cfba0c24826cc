// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! yard-core: resource coordination engine for the switchyard simulator
//!
//! This crate provides:
//! - Capacity-limited resources with mutex and semaphore semantics
//! - The allocation table and client table owned by the coordinator
//! - The wait-for graph built from denied requests
//! - Cycle detection and preemption-based recovery

pub mod id;

pub mod allocation;
pub mod client;
pub mod detector;
pub mod event;
pub mod recovery;
pub mod resource;
pub mod wait_for;

pub use allocation::{AllocationError, AllocationTable, ResourceSnapshot};
pub use client::{ClientProcess, ClientSnapshot, ClientState, ClientTable};
pub use detector::detect;
pub use event::{format_cycle, DenyReason, Event};
pub use id::{ClientId, ResourceName};
pub use recovery::{recover, RecoveryOutcome};
pub use resource::{Resource, ResourceKind};
pub use wait_for::{WaitEntry, WaitForGraph};
