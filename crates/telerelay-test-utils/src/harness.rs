// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP harness for end-to-end tests.
//!
//! `TestServer` runs a real [`GatewayServer`] over a fresh [`Relay`] on an
//! ephemeral loopback port, so tests can drive the signaling API with an
//! ordinary HTTP client.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use telerelay_core::{PluginAdapter, TelerelayError};
use telerelay_gateway::{GatewayServer, ServerConfig};
use telerelay_relay::{Relay, RelaySettings};

pub struct TestServer {
    relay: Arc<Relay>,
    server: GatewayServer,
    addr: SocketAddr,
}

impl TestServer {
    /// Start with default relay settings.
    pub async fn start() -> Result<Self, TelerelayError> {
        Self::with_settings(RelaySettings::default()).await
    }

    pub async fn with_settings(settings: RelaySettings) -> Result<Self, TelerelayError> {
        let relay = Arc::new(Relay::new(settings));
        let server = GatewayServer::new(
            ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_max_age: Duration::from_secs(86_400),
            },
            Arc::clone(&relay),
            "telerelay-http-signaling",
            None,
        );
        let addr = server.start().await?;
        tracing::debug!(%addr, "test server started");
        Ok(Self {
            relay,
            server,
            addr,
        })
    }

    /// `http://127.0.0.1:<port>`, no trailing slash.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The relay behind the server, for direct state assertions.
    pub fn relay(&self) -> &Arc<Relay> {
        &self.relay
    }

    pub async fn shutdown(self) -> Result<(), TelerelayError> {
        tracing::debug!(addr = %self.addr, "test server shutting down");
        self.server.shutdown().await
    }
}
