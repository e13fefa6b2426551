// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quality grading from the four headline metrics.

use telerelay_core::QualityGrade;

/// Upper/lower limits a grade tolerates. Exceeding any one drops the grade.
struct Limits {
    grade: QualityGrade,
    max_latency_ms: f64,
    max_packet_loss_pct: f64,
    max_jitter_ms: f64,
    min_bitrate_kbps: f64,
}

/// Checked in order; the first set of limits a sample breaks decides its grade.
const TIERS: [Limits; 3] = [
    Limits {
        grade: QualityGrade::Poor,
        max_latency_ms: 300.0,
        max_packet_loss_pct: 5.0,
        max_jitter_ms: 50.0,
        min_bitrate_kbps: 100.0,
    },
    Limits {
        grade: QualityGrade::Fair,
        max_latency_ms: 150.0,
        max_packet_loss_pct: 2.0,
        max_jitter_ms: 30.0,
        min_bitrate_kbps: 300.0,
    },
    Limits {
        grade: QualityGrade::Good,
        max_latency_ms: 80.0,
        max_packet_loss_pct: 0.5,
        max_jitter_ms: 15.0,
        min_bitrate_kbps: 500.0,
    },
];

/// Grade a sample. Zero bitrate means nothing is flowing.
pub fn classify(
    bitrate_kbps: f64,
    latency_ms: f64,
    packet_loss_pct: f64,
    jitter_ms: f64,
) -> QualityGrade {
    if bitrate_kbps == 0.0 {
        return QualityGrade::Disconnected;
    }
    TIERS
        .iter()
        .find(|t| {
            latency_ms > t.max_latency_ms
                || packet_loss_pct > t.max_packet_loss_pct
                || jitter_ms > t.max_jitter_ms
                || bitrate_kbps < t.min_bitrate_kbps
        })
        .map_or(QualityGrade::Excellent, |t| t.grade)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn reference_points() {
        assert_eq!(classify(0.0, 10.0, 0.0, 0.0), QualityGrade::Disconnected);
        assert_eq!(classify(50.0, 0.0, 0.0, 0.0), QualityGrade::Poor);
        assert_eq!(classify(1000.0, 50.0, 0.0, 5.0), QualityGrade::Excellent);
        assert_eq!(classify(1000.0, 301.0, 0.0, 0.0), QualityGrade::Poor);
        assert_eq!(classify(1000.0, 0.0, 2.5, 0.0), QualityGrade::Fair);
        assert_eq!(classify(1000.0, 0.0, 0.0, 20.0), QualityGrade::Good);
        assert_eq!(classify(400.0, 0.0, 0.0, 0.0), QualityGrade::Good);
    }

    #[test]
    fn thresholds_are_exclusive() {
        assert_eq!(classify(1000.0, 300.0, 0.0, 0.0), QualityGrade::Fair);
        assert_eq!(classify(1000.0, 150.0, 0.0, 0.0), QualityGrade::Good);
        assert_eq!(classify(1000.0, 80.0, 0.0, 0.0), QualityGrade::Excellent);
        assert_eq!(classify(500.0, 0.0, 0.5, 15.0), QualityGrade::Excellent);
        assert_eq!(classify(100.0, 0.0, 0.0, 0.0), QualityGrade::Fair);
    }

    proptest! {
        #[test]
        fn worse_metrics_never_improve_grade(
            bitrate in 1.0f64..5000.0,
            latency in 0.0f64..600.0,
            loss in 0.0f64..20.0,
            jitter in 0.0f64..100.0,
            extra in 0.0f64..200.0,
        ) {
            let base = classify(bitrate, latency, loss, jitter);
            prop_assert!(classify(bitrate, latency + extra, loss, jitter) <= base);
            prop_assert!(classify(bitrate, latency, loss + extra, jitter) <= base);
            prop_assert!(classify(bitrate, latency, loss, jitter + extra) <= base);
            prop_assert!(classify((bitrate - extra).max(0.5), latency, loss, jitter) <= base);
        }
    }
}
