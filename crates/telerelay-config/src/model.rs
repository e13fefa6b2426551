// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level telerelay configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelerelayConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// HTTP gateway (bind address, CORS).
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Signaling relay limits and timeouts.
    #[serde(default)]
    pub relay: RelayConfig,

    /// Connection quality monitor cadence.
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Relay client settings (used by `probe` and embedding hosts).
    #[serde(default)]
    pub client: ClientConfig,

    /// Prometheus metrics exporter.
    #[serde(default)]
    pub prometheus: PrometheusConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind. `0` picks an ephemeral port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Service name reported by `/health`.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// `Access-Control-Max-Age` for CORS preflight responses.
    #[serde(default = "default_cors_max_age_secs")]
    pub cors_max_age_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            service_name: default_service_name(),
            cors_max_age_secs: default_cors_max_age_secs(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

fn default_service_name() -> String {
    "telerelay-http-signaling".to_string()
}

fn default_cors_max_age_secs() -> u64 {
    86_400
}

/// Signaling relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Messages retained per room; older ones are dropped silently.
    #[serde(default = "default_max_messages_per_room")]
    pub max_messages_per_room: usize,

    /// Maximum messages returned by a single poll.
    #[serde(default = "default_poll_batch_limit")]
    pub poll_batch_limit: usize,

    /// Participants without a heartbeat for this long are evicted.
    #[serde(default = "default_heartbeat_timeout_secs")]
    pub heartbeat_timeout_secs: u64,

    /// How often the cleanup sweep runs.
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,

    /// Empty rooms idle for this long are removed by the sweep.
    #[serde(default = "default_room_idle_timeout_secs")]
    pub room_idle_timeout_secs: u64,

    /// Role that receives replayed incoming-call invitations on join.
    #[serde(default = "default_callee_role")]
    pub callee_role: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_messages_per_room: default_max_messages_per_room(),
            poll_batch_limit: default_poll_batch_limit(),
            heartbeat_timeout_secs: default_heartbeat_timeout_secs(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
            room_idle_timeout_secs: default_room_idle_timeout_secs(),
            callee_role: default_callee_role(),
        }
    }
}

fn default_max_messages_per_room() -> usize {
    100
}

fn default_poll_batch_limit() -> usize {
    20
}

fn default_heartbeat_timeout_secs() -> u64 {
    30
}

fn default_cleanup_interval_secs() -> u64 {
    30
}

fn default_room_idle_timeout_secs() -> u64 {
    3600
}

fn default_callee_role() -> String {
    "patient".to_string()
}

/// Connection quality monitor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    /// Sampling interval in milliseconds.
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,

    /// Reporting interval in milliseconds.
    #[serde(default = "default_report_interval_ms")]
    pub report_interval_ms: u64,

    /// Push samples to the reporting sink automatically.
    #[serde(default = "default_auto_report")]
    pub auto_report: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: default_sample_interval_ms(),
            report_interval_ms: default_report_interval_ms(),
            auto_report: default_auto_report(),
        }
    }
}

fn default_sample_interval_ms() -> u64 {
    1000
}

fn default_report_interval_ms() -> u64 {
    5000
}

fn default_auto_report() -> bool {
    true
}

/// Relay client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the relay, without a trailing slash.
    #[serde(default = "default_signaling_url")]
    pub signaling_url: String,

    /// Interval between polls in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Interval between keep-alive pings in milliseconds.
    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            signaling_url: default_signaling_url(),
            poll_interval_ms: default_poll_interval_ms(),
            ping_interval_ms: default_ping_interval_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_signaling_url() -> String {
    "http://127.0.0.1:8787".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_ping_interval_ms() -> u64 {
    10_000
}

fn default_request_timeout_secs() -> u64 {
    10
}

/// Prometheus metrics configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PrometheusConfig {
    /// Install the Prometheus recorder and serve `/metrics`.
    #[serde(default)]
    pub enabled: bool,
}
