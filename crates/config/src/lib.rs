// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Yard configuration loading and validation

mod legacy;
mod parser;
mod yard;

pub use legacy::{parse_intersections, parse_trains};
pub use parser::{load_legacy, load_yard, parse_yard, ParseError};
pub use yard::{ClientDef, ResourceDef, YardConfig};
