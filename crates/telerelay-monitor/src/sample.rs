// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reduction of a raw statistics report to a [`ConnectionSample`] and its
//! per-stream [`DetailedStats`] breakdown.

use serde::Serialize;

use telerelay_core::stats::{CandidatePairState, InboundRtp, OutboundRtp};
use telerelay_core::{ConnectionState, MediaKind, QualityGrade, QualityReport, RtcStats, StatsReport};

use crate::quality::classify;

/// A point-in-time measurement of the connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSample {
    /// Mean kbps over every active stream.
    pub bitrate: f64,
    /// Round-trip time in milliseconds.
    pub latency: f64,
    /// Worst receive-side packet loss, in percent.
    pub packet_loss: f64,
    /// Worst receive-side jitter in milliseconds.
    pub jitter: f64,
    pub quality: QualityGrade,
    /// Unix milliseconds.
    pub timestamp: i64,
}

impl ConnectionSample {
    /// The subset of the sample a reporting sink persists.
    pub fn to_report(&self) -> QualityReport {
        QualityReport {
            bitrate: self.bitrate,
            latency: self.latency,
            packet_loss: self.packet_loss,
            quality: self.quality,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStreamStats {
    pub bitrate: f64,
    pub fps: f64,
    /// `"{width}x{height}"`, empty when no stream was seen.
    pub resolution: String,
    pub packets_lost: i64,
    pub total_packets: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioStreamStats {
    pub bitrate: f64,
    pub packets_lost: i64,
    pub total_packets: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Directional<T> {
    pub sent: T,
    pub received: T,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportStats {
    /// Milliseconds.
    pub current_round_trip_time: f64,
    /// kbps.
    pub available_outgoing_bitrate: f64,
    pub state: ConnectionState,
}

/// Per-kind, per-direction figures from the same report as a sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetailedStats {
    pub video: Directional<VideoStreamStats>,
    pub audio: Directional<AudioStreamStats>,
    pub connection: TransportStats,
}

fn kbps(bytes: u64) -> f64 {
    bytes as f64 * 8.0 / 1000.0
}

fn resolution(width: Option<u32>, height: Option<u32>) -> String {
    format!("{}x{}", width.unwrap_or(0), height.unwrap_or(0))
}

#[derive(Default)]
struct Accumulator {
    bitrate_sum: f64,
    bitrate_count: u32,
    latency: f64,
    packet_loss: f64,
    jitter: f64,
}

impl Accumulator {
    fn add_bitrate(&mut self, kbps: f64) {
        self.bitrate_sum += kbps;
        self.bitrate_count += 1;
    }

    fn mean_bitrate(&self) -> f64 {
        if self.bitrate_count == 0 {
            0.0
        } else {
            self.bitrate_sum / f64::from(self.bitrate_count)
        }
    }

    fn outbound(&mut self, detailed: &mut DetailedStats, rtp: &OutboundRtp) {
        if rtp.bytes_sent == 0 {
            return;
        }
        let bitrate = kbps(rtp.bytes_sent);
        let packets_lost = i64::try_from(rtp.packets_lost).unwrap_or(i64::MAX);
        match rtp.kind {
            Some(MediaKind::Video) => {
                detailed.video.sent = VideoStreamStats {
                    bitrate,
                    fps: rtp.frames_per_second.unwrap_or(0.0),
                    resolution: resolution(rtp.frame_width, rtp.frame_height),
                    packets_lost,
                    total_packets: rtp.packets_sent,
                };
            }
            Some(MediaKind::Audio) => {
                detailed.audio.sent = AudioStreamStats {
                    bitrate,
                    packets_lost,
                    total_packets: rtp.packets_sent,
                };
            }
            None => {}
        }
        self.add_bitrate(bitrate);
    }

    fn inbound(&mut self, detailed: &mut DetailedStats, rtp: &InboundRtp) {
        if rtp.bytes_received == 0 {
            return;
        }
        let bitrate = kbps(rtp.bytes_received);
        match rtp.kind {
            Some(MediaKind::Video) => {
                detailed.video.received = VideoStreamStats {
                    bitrate,
                    fps: rtp.frames_per_second.unwrap_or(0.0),
                    resolution: resolution(rtp.frame_width, rtp.frame_height),
                    packets_lost: rtp.packets_lost,
                    total_packets: rtp.packets_received,
                };
            }
            Some(MediaKind::Audio) => {
                detailed.audio.received = AudioStreamStats {
                    bitrate,
                    packets_lost: rtp.packets_lost,
                    total_packets: rtp.packets_received,
                };
            }
            None => {}
        }
        self.add_bitrate(bitrate);

        if let Some(jitter) = rtp.jitter.filter(|j| *j != 0.0) {
            self.jitter = self.jitter.max(jitter * 1000.0);
        }
        if rtp.packets_lost != 0 && rtp.packets_received != 0 {
            let lost = rtp.packets_lost as f64;
            let loss = lost / (lost + rtp.packets_received as f64) * 100.0;
            self.packet_loss = self.packet_loss.max(loss);
        }
    }
}

/// Reduce `report` to a sample stamped with `timestamp` plus the detailed
/// breakdown. Streams that have not moved any bytes are ignored.
pub fn parse_report(
    report: &StatsReport,
    state: ConnectionState,
    timestamp: i64,
) -> (ConnectionSample, DetailedStats) {
    let mut acc = Accumulator::default();
    let mut detailed = DetailedStats::default();
    detailed.connection.state = state;

    for entry in report.iter() {
        match entry {
            RtcStats::OutboundRtp(rtp) => acc.outbound(&mut detailed, rtp),
            RtcStats::InboundRtp(rtp) => acc.inbound(&mut detailed, rtp),
            RtcStats::CandidatePair(pair) if pair.state == CandidatePairState::Succeeded => {
                if let Some(rtt) = pair.current_round_trip_time.filter(|r| *r != 0.0) {
                    acc.latency = rtt * 1000.0;
                    detailed.connection.current_round_trip_time = acc.latency;
                }
                if let Some(bps) = pair.available_outgoing_bitrate.filter(|b| *b != 0.0) {
                    detailed.connection.available_outgoing_bitrate = bps / 1000.0;
                }
            }
            _ => {}
        }
    }

    let bitrate = acc.mean_bitrate();
    let sample = ConnectionSample {
        bitrate,
        latency: acc.latency,
        packet_loss: acc.packet_loss,
        jitter: acc.jitter,
        quality: classify(bitrate, acc.latency, acc.packet_loss, acc.jitter),
        timestamp,
    };
    (sample, detailed)
}

#[cfg(test)]
mod tests {
    use telerelay_core::stats::CandidatePair;

    use super::*;

    fn healthy_call() -> StatsReport {
        StatsReport::new(vec![
            RtcStats::OutboundRtp(OutboundRtp {
                kind: Some(MediaKind::Video),
                bytes_sent: 250_000,
                packets_sent: 900,
                packets_lost: 3,
                frames_per_second: Some(30.0),
                frame_width: Some(1280),
                frame_height: Some(720),
            }),
            RtcStats::OutboundRtp(OutboundRtp {
                kind: Some(MediaKind::Audio),
                bytes_sent: 50_000,
                packets_sent: 400,
                ..Default::default()
            }),
            RtcStats::InboundRtp(InboundRtp {
                kind: Some(MediaKind::Video),
                bytes_received: 200_000,
                packets_received: 995,
                packets_lost: 5,
                jitter: Some(0.004),
                frames_per_second: Some(24.0),
                frame_width: Some(640),
                frame_height: Some(480),
            }),
            RtcStats::InboundRtp(InboundRtp {
                kind: Some(MediaKind::Audio),
                bytes_received: 100_000,
                packets_received: 500,
                packets_lost: 0,
                jitter: Some(0.012),
                ..Default::default()
            }),
            RtcStats::CandidatePair(CandidatePair {
                state: CandidatePairState::Succeeded,
                current_round_trip_time: Some(0.045),
                available_outgoing_bitrate: Some(2_500_000.0),
            }),
            RtcStats::Other,
        ])
    }

    #[test]
    fn aggregates_headline_metrics() {
        let (sample, _) = parse_report(&healthy_call(), ConnectionState::Connected, 7);
        // (2000 + 400 + 1600 + 800) / 4
        assert!((sample.bitrate - 1200.0).abs() < 1e-9);
        assert!((sample.latency - 45.0).abs() < 1e-9);
        assert!((sample.jitter - 12.0).abs() < 1e-9);
        assert!((sample.packet_loss - 0.5).abs() < 1e-9);
        assert_eq!(sample.timestamp, 7);
        assert_eq!(sample.quality, QualityGrade::Excellent);
    }

    #[test]
    fn fills_detailed_breakdown() {
        let (_, detailed) = parse_report(&healthy_call(), ConnectionState::Connected, 0);
        assert_eq!(detailed.video.sent.resolution, "1280x720");
        assert_eq!(detailed.video.sent.fps, 30.0);
        assert_eq!(detailed.video.sent.packets_lost, 3);
        assert_eq!(detailed.video.sent.total_packets, 900);
        assert_eq!(detailed.video.received.resolution, "640x480");
        assert_eq!(detailed.audio.received.total_packets, 500);
        assert!((detailed.audio.sent.bitrate - 400.0).abs() < 1e-9);
        assert!((detailed.connection.current_round_trip_time - 45.0).abs() < 1e-9);
        assert!((detailed.connection.available_outgoing_bitrate - 2500.0).abs() < 1e-9);
        assert_eq!(detailed.connection.state, ConnectionState::Connected);
    }

    #[test]
    fn idle_streams_and_unsettled_pairs_are_ignored() {
        let report = StatsReport::new(vec![
            RtcStats::OutboundRtp(OutboundRtp {
                kind: Some(MediaKind::Video),
                ..Default::default()
            }),
            RtcStats::CandidatePair(CandidatePair {
                state: CandidatePairState::InProgress,
                current_round_trip_time: Some(0.5),
                available_outgoing_bitrate: None,
            }),
        ]);
        let (sample, detailed) = parse_report(&report, ConnectionState::Connecting, 0);
        assert_eq!(sample.bitrate, 0.0);
        assert_eq!(sample.latency, 0.0);
        assert_eq!(sample.quality, QualityGrade::Disconnected);
        assert_eq!(detailed.video.sent.resolution, "");
    }

    #[test]
    fn missing_frame_size_renders_zeroes() {
        let report = StatsReport::new(vec![RtcStats::InboundRtp(InboundRtp {
            kind: Some(MediaKind::Video),
            bytes_received: 10_000,
            packets_received: 10,
            frame_width: Some(320),
            ..Default::default()
        })]);
        let (_, detailed) = parse_report(&report, ConnectionState::Connected, 0);
        assert_eq!(detailed.video.received.resolution, "320x0");
        assert_eq!(detailed.video.received.fps, 0.0);
    }

    #[test]
    fn negative_loss_does_not_lower_worst_case() {
        let report = StatsReport::new(vec![
            RtcStats::InboundRtp(InboundRtp {
                kind: Some(MediaKind::Audio),
                bytes_received: 10_000,
                packets_received: 100,
                packets_lost: -2,
                ..Default::default()
            }),
        ]);
        let (sample, _) = parse_report(&report, ConnectionState::Connected, 0);
        assert_eq!(sample.packet_loss, 0.0);
    }

    #[test]
    fn report_carries_headline_fields() {
        let (sample, _) = parse_report(&healthy_call(), ConnectionState::Connected, 0);
        let report = sample.to_report();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["quality"], "excellent");
        assert!(json.get("packetLoss").is_some());
        assert!(json.get("jitter").is_none());
    }
}
