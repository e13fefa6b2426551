// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.
//!
//! Every failing check is collected so the operator sees all problems at once.

use crate::diagnostic::ConfigError;
use crate::model::TelerelayConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
pub fn validate_config(config: &TelerelayConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let level = config.log.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "log.level `{}` is not one of {}",
            config.log.level,
            LOG_LEVELS.join(", ")
        ));
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else {
        let is_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_hostname = host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
        if !is_ip && !is_hostname {
            fail(format!(
                "gateway.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if config.gateway.service_name.trim().is_empty() {
        fail("gateway.service_name must not be empty".to_string());
    }

    let relay = &config.relay;
    for (key, value) in [
        ("relay.max_messages_per_room", relay.max_messages_per_room as u64),
        ("relay.poll_batch_limit", relay.poll_batch_limit as u64),
        ("relay.heartbeat_timeout_secs", relay.heartbeat_timeout_secs),
        ("relay.cleanup_interval_secs", relay.cleanup_interval_secs),
        ("relay.room_idle_timeout_secs", relay.room_idle_timeout_secs),
        ("monitor.sample_interval_ms", config.monitor.sample_interval_ms),
        ("monitor.report_interval_ms", config.monitor.report_interval_ms),
        ("client.poll_interval_ms", config.client.poll_interval_ms),
        ("client.ping_interval_ms", config.client.ping_interval_ms),
        ("client.request_timeout_secs", config.client.request_timeout_secs),
    ] {
        if value == 0 {
            fail(format!("{key} must be greater than zero"));
        }
    }

    if relay.poll_batch_limit > relay.max_messages_per_room {
        fail(format!(
            "relay.poll_batch_limit ({}) must not exceed relay.max_messages_per_room ({})",
            relay.poll_batch_limit, relay.max_messages_per_room
        ));
    }

    if relay.callee_role.trim().is_empty() {
        fail("relay.callee_role must not be empty".to_string());
    }

    let heartbeat_ms = relay.heartbeat_timeout_secs.saturating_mul(1000);
    if config.client.ping_interval_ms >= heartbeat_ms {
        fail(format!(
            "client.ping_interval_ms ({}) must be below relay.heartbeat_timeout_secs ({}s) \
             or clients will be evicted between pings",
            config.client.ping_interval_ms, relay.heartbeat_timeout_secs
        ));
    }

    let url = config.client.signaling_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        fail(format!(
            "client.signaling_url `{url}` must start with http:// or https://"
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
