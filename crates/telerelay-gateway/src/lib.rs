// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP signaling gateway.
//!
//! Exposes a [`Relay`](telerelay_relay::Relay) over a small JSON API that
//! browsers can reach with plain `fetch` and short polling. Every route is
//! CORS-enabled; failures render as `{"error": ...}` with a matching status.

pub mod error;
pub mod handlers;
pub mod server;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use telerelay_core::{AdapterType, HealthStatus, PluginAdapter, TelerelayError};
use telerelay_relay::Relay;

pub use crate::error::{ApiError, ErrorResponse};
pub use crate::server::{build_router, GatewayState, HealthState, MetricsRender, ServerConfig};

/// Runs the axum server as a background task.
pub struct GatewayServer {
    config: ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
    server_handle: Mutex<Option<JoinHandle<()>>>,
}

impl GatewayServer {
    pub fn new(
        config: ServerConfig,
        relay: Arc<Relay>,
        service_name: impl Into<String>,
        prometheus_render: Option<MetricsRender>,
    ) -> Self {
        Self {
            config,
            state: GatewayState {
                relay,
                health: HealthState {
                    start_time: Instant::now(),
                    service_name: service_name.into(),
                    prometheus_render,
                },
            },
            cancel: CancellationToken::new(),
            server_handle: Mutex::new(None),
        }
    }

    /// Stop serving when `parent` is cancelled as well as on [`shutdown`](PluginAdapter::shutdown).
    pub fn with_shutdown(mut self, parent: &CancellationToken) -> Self {
        self.cancel = parent.child_token();
        self
    }

    /// Bind and start serving. Returns the bound address.
    pub async fn start(&self) -> Result<SocketAddr, TelerelayError> {
        let mut handle = self.server_handle.lock().await;
        if handle.is_some() {
            return Err(TelerelayError::Internal(
                "gateway server already started".to_string(),
            ));
        }

        let listener = server::bind(&self.config).await?;
        let addr = server::local_addr(&listener)?;
        let router = build_router(self.state.clone(), self.config.cors_max_age);
        let cancel = self.cancel.clone();

        *handle = Some(tokio::spawn(async move {
            if let Err(e) = server::serve(listener, router, cancel).await {
                tracing::error!("gateway server error: {e}");
            }
        }));

        tracing::info!(%addr, "gateway started");
        Ok(addr)
    }

    /// Wait for the server task to finish.
    pub async fn wait(&self) {
        let handle = self.server_handle.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!("gateway server task failed: {e}");
            }
        }
    }
}

#[async_trait]
impl PluginAdapter for GatewayServer {
    fn name(&self) -> &str {
        "gateway"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Gateway
    }

    async fn health_check(&self) -> Result<HealthStatus, TelerelayError> {
        let handle = self.server_handle.lock().await;
        Ok(match handle.as_ref() {
            Some(h) if !h.is_finished() => HealthStatus::Healthy,
            Some(_) => HealthStatus::Unhealthy("server task exited".to_string()),
            None => HealthStatus::Unhealthy("server not started".to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), TelerelayError> {
        self.cancel.cancel();
        self.wait().await;
        Ok(())
    }
}
