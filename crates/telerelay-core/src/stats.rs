// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw transport statistics as returned by a peer connection.
//!
//! The JSON shape follows a browser `RTCPeerConnection.getStats()` dump so a
//! host can forward the report verbatim. Entry types the monitor does not use
//! deserialize to [`RtcStats::Other`].

use serde::{Deserialize, Serialize};

/// Media kind of an RTP stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Audio,
    Video,
}

/// ICE candidate pair state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidatePairState {
    Frozen,
    Waiting,
    InProgress,
    Failed,
    Succeeded,
    #[serde(other)]
    Unknown,
}

/// Statistics for an outgoing RTP stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundRtp {
    pub kind: Option<MediaKind>,
    #[serde(default)]
    pub bytes_sent: u64,
    #[serde(default)]
    pub packets_sent: u64,
    #[serde(default)]
    pub packets_lost: u64,
    pub frames_per_second: Option<f64>,
    pub frame_width: Option<u32>,
    pub frame_height: Option<u32>,
}

/// Statistics for an incoming RTP stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundRtp {
    pub kind: Option<MediaKind>,
    #[serde(default)]
    pub bytes_received: u64,
    #[serde(default)]
    pub packets_received: u64,
    /// Signed because receivers may count duplicates as negative loss.
    #[serde(default)]
    pub packets_lost: i64,
    /// Jitter in seconds.
    pub jitter: Option<f64>,
    pub frames_per_second: Option<f64>,
    pub frame_width: Option<u32>,
    pub frame_height: Option<u32>,
}

/// Statistics for an ICE candidate pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePair {
    pub state: CandidatePairState,
    /// Current round-trip time in seconds.
    pub current_round_trip_time: Option<f64>,
    /// Available outgoing bitrate in bits per second.
    pub available_outgoing_bitrate: Option<f64>,
}

/// One entry of a statistics report, tagged by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RtcStats {
    OutboundRtp(OutboundRtp),
    InboundRtp(InboundRtp),
    CandidatePair(CandidatePair),
    #[serde(other)]
    Other,
}

/// A full statistics report: every transport object the connection knows about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsReport {
    pub entries: Vec<RtcStats>,
}

impl StatsReport {
    pub fn new(entries: Vec<RtcStats>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RtcStats> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
