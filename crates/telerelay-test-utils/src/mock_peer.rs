// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock peer connection for deterministic monitor tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use tokio::sync::Mutex;

use telerelay_core::stats::{CandidatePair, CandidatePairState, InboundRtp};
use telerelay_core::{ConnectionState, MediaKind, PeerConnection, RtcStats, StatsReport, TelerelayError};

type Scripted = Result<StatsReport, String>;

/// A peer connection that replays scripted stats reports.
///
/// Each `get_stats` call pops the next scripted result. Once the script runs
/// out, the last successful report is repeated (an empty report if there was
/// none).
pub struct MockPeerConnection {
    script: Mutex<VecDeque<Scripted>>,
    last: Mutex<StatsReport>,
    state: RwLock<ConnectionState>,
    calls: AtomicUsize,
}

impl MockPeerConnection {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            last: Mutex::new(StatsReport::default()),
            state: RwLock::new(ConnectionState::Connected),
            calls: AtomicUsize::new(0),
        }
    }

    /// A connection that keeps returning `report`.
    pub fn steady(report: StatsReport) -> Self {
        Self {
            last: Mutex::new(report),
            ..Self::new()
        }
    }

    pub async fn push_report(&self, report: StatsReport) {
        self.script.lock().await.push_back(Ok(report));
    }

    /// Make the next `get_stats` call fail with `message`.
    pub async fn push_failure(&self, message: impl Into<String>) {
        self.script.lock().await.push_back(Err(message.into()));
    }

    pub fn set_state(&self, state: ConnectionState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Number of `get_stats` calls so far.
    pub fn stats_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockPeerConnection {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PeerConnection for MockPeerConnection {
    fn connection_state(&self) -> ConnectionState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    async fn get_stats(&self) -> Result<StatsReport, TelerelayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().await.pop_front() {
            Some(Ok(report)) => {
                *self.last.lock().await = report.clone();
                Ok(report)
            }
            Some(Err(message)) => {
                tracing::debug!(%message, "mock peer returning scripted stats failure");
                Err(TelerelayError::Stats {
                    message,
                    source: None,
                })
            }
            None => Ok(self.last.lock().await.clone()),
        }
    }
}

/// A report whose parsed sample has exactly the given headline metrics.
///
/// One inbound video stream carries the bitrate, loss and jitter; a succeeded
/// candidate pair carries the round-trip time. Loss is rounded to 0.1%.
pub fn synthetic_report(bitrate_kbps: f64, rtt_ms: f64, loss_pct: f64, jitter_ms: f64) -> StatsReport {
    let lost = (loss_pct * 10.0).round() as i64;
    StatsReport::new(vec![
        RtcStats::InboundRtp(InboundRtp {
            kind: Some(MediaKind::Video),
            bytes_received: (bitrate_kbps * 1000.0 / 8.0).round() as u64,
            packets_received: (1000 - lost) as u64,
            packets_lost: lost,
            jitter: Some(jitter_ms / 1000.0),
            frames_per_second: Some(30.0),
            frame_width: Some(1280),
            frame_height: Some(720),
        }),
        RtcStats::CandidatePair(CandidatePair {
            state: CandidatePairState::Succeeded,
            current_round_trip_time: Some(rtt_ms / 1000.0),
            available_outgoing_bitrate: Some(bitrate_kbps * 1000.0),
        }),
    ])
}
