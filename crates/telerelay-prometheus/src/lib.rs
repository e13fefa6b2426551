// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus metrics for telerelay.
//!
//! Uses the metrics-rs facade with the Prometheus exporter. The rendered
//! text is served by the gateway's `/metrics` route.

pub mod recording;

use async_trait::async_trait;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use telerelay_core::{AdapterType, HealthStatus, PluginAdapter, TelerelayError};

pub use recording::{
    record_dropped, record_evicted, record_quality_report, record_quality_sample, record_relayed,
    record_rooms_removed, set_memory, set_occupancy,
};

/// Owns the installed Prometheus recorder.
pub struct PrometheusAdapter {
    handle: PrometheusHandle,
}

impl PrometheusAdapter {
    /// Install the Prometheus recorder globally.
    ///
    /// Only one recorder can exist per process; a second call fails.
    pub fn new() -> Result<Self, TelerelayError> {
        let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
            TelerelayError::Internal(format!("failed to install Prometheus recorder: {e}"))
        })?;

        recording::register_metrics();

        tracing::info!("prometheus metrics recorder installed");

        Ok(Self { handle })
    }

    /// Handle for rendering, shareable with the gateway.
    pub fn handle(&self) -> &PrometheusHandle {
        &self.handle
    }

    /// Render all collected metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

#[async_trait]
impl PluginAdapter for PrometheusAdapter {
    fn name(&self) -> &str {
        "prometheus"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Observability
    }

    async fn health_check(&self) -> Result<HealthStatus, TelerelayError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TelerelayError> {
        Ok(())
    }
}
