// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Peer connection handle consumed by the quality monitor.

use async_trait::async_trait;

use crate::error::TelerelayError;
use crate::stats::StatsReport;
use crate::types::ConnectionState;

/// A live peer connection supplied by the host's WebRTC stack.
///
/// The monitor only reads from it; media and negotiation stay with the host.
#[async_trait]
pub trait PeerConnection: Send + Sync {
    /// Current transport connection state.
    fn connection_state(&self) -> ConnectionState;

    /// Reads the raw per-transport-object statistics report.
    ///
    /// Fails when the connection is closed or the stack cannot produce stats.
    async fn get_stats(&self) -> Result<StatsReport, TelerelayError>;
}
