// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the telerelay signaling API.
//!
//! [`RelayClient`] wraps each endpoint and remembers the poll cursor between
//! calls. [`spawn_poller`] and [`spawn_keepalive`] run the short-poll and
//! heartbeat loops a browser peer would.

pub mod client;
pub mod tasks;

pub use client::{HealthInfo, RelayClient};
pub use tasks::{spawn_keepalive, spawn_poller};
