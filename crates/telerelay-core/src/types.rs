// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the relay, monitor and their adapters.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter implementing [`PluginAdapter`](crate::PluginAdapter).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Gateway,
    Observability,
}

/// Discrete connection quality grade.
///
/// Variants are declared from worst to best so the derived ordering gives
/// `Disconnected < Poor < Fair < Good < Excellent`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum QualityGrade {
    Disconnected,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl QualityGrade {
    /// Grades that warrant an immediate out-of-band report.
    pub fn is_degraded(self) -> bool {
        matches!(self, Self::Poor | Self::Disconnected)
    }
}

/// Peer connection state as exposed by the underlying WebRTC stack.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

/// The record pushed to a [`QualitySink`](crate::QualitySink).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    /// Bitrate in kbps.
    pub bitrate: f64,
    /// Round-trip latency in milliseconds.
    pub latency: f64,
    /// Packet loss percentage.
    pub packet_loss: f64,
    pub quality: QualityGrade,
}
