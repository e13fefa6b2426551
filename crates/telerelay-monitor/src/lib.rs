// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection quality monitoring.
//!
//! Samples a WebRTC peer connection's statistics on an interval, grades the
//! link, and optionally pushes the grade to an external reporting sink.

pub mod monitor;
pub mod quality;
pub mod reporting;
pub mod sample;

pub use monitor::{MonitorObserver, MonitorSettings, QualityMonitor};
pub use quality::classify;
pub use reporting::ReportingMonitor;
pub use sample::{
    parse_report, AudioStreamStats, ConnectionSample, DetailedStats, Directional, TransportStats,
    VideoStreamStats,
};
