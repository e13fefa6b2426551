// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Recording goes through the metrics-rs facade and is a no-op until a
//! recorder is installed, so library crates call these unconditionally.

use metrics::{describe_counter, describe_gauge};

/// Register all telerelay metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "telerelay_messages_relayed_total",
        "Signaling messages appended to a room log, by type"
    );
    describe_counter!(
        "telerelay_messages_dropped_total",
        "Messages discarded by room log truncation"
    );
    describe_counter!(
        "telerelay_participants_evicted_total",
        "Participants removed for a missed heartbeat"
    );
    describe_counter!(
        "telerelay_rooms_removed_total",
        "Empty rooms removed after the idle timeout"
    );
    describe_gauge!("telerelay_active_rooms", "Rooms currently held in memory");
    describe_gauge!(
        "telerelay_active_participants",
        "Participants currently joined to a room"
    );
    describe_counter!(
        "telerelay_quality_samples_total",
        "Connection quality samples taken, by grade"
    );
    describe_counter!(
        "telerelay_quality_reports_total",
        "Quality reports delivered to the sink, by outcome"
    );
    describe_gauge!("telerelay_memory_heap_bytes", "Allocated heap bytes");
    describe_gauge!("telerelay_memory_resident_bytes", "Resident memory bytes");
}

/// Record a message appended to a room log.
pub fn record_relayed(message_type: &str) {
    metrics::counter!("telerelay_messages_relayed_total", "type" => message_type.to_string())
        .increment(1);
}

/// Record messages lost to log truncation.
pub fn record_dropped(count: u64) {
    metrics::counter!("telerelay_messages_dropped_total").increment(count);
}

/// Record participants evicted by the cleanup sweep.
pub fn record_evicted(count: u64) {
    metrics::counter!("telerelay_participants_evicted_total").increment(count);
}

/// Record idle rooms removed by the cleanup sweep.
pub fn record_rooms_removed(count: u64) {
    metrics::counter!("telerelay_rooms_removed_total").increment(count);
}

/// Set the room and participant gauges.
pub fn set_occupancy(rooms: usize, participants: usize) {
    metrics::gauge!("telerelay_active_rooms").set(rooms as f64);
    metrics::gauge!("telerelay_active_participants").set(participants as f64);
}

/// Record a quality sample with its grade label.
pub fn record_quality_sample(grade: &str) {
    metrics::counter!("telerelay_quality_samples_total", "grade" => grade.to_string())
        .increment(1);
}

/// Record a report delivery attempt.
pub fn record_quality_report(delivered: bool) {
    let outcome = if delivered { "delivered" } else { "failed" };
    metrics::counter!("telerelay_quality_reports_total", "outcome" => outcome).increment(1);
}

/// Set allocator memory gauges.
pub fn set_memory(heap: f64, resident: f64) {
    metrics::gauge!("telerelay_memory_heap_bytes").set(heap);
    metrics::gauge!("telerelay_memory_resident_bytes").set(resident);
}
