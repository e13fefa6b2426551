// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for telerelay.
//!
//! Provides the shared error type, the quality and connection-state types, the
//! raw statistics report model, and the adapter traits the relay and monitor
//! are composed from.

pub mod error;
pub mod stats;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TelerelayError;
pub use stats::{MediaKind, RtcStats, StatsReport};
pub use types::{AdapterType, ConnectionState, HealthStatus, QualityGrade, QualityReport};

pub use traits::{PeerConnection, PluginAdapter, QualitySink};
