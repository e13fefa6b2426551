// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, CORS, request tracing and shared state.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use telerelay_core::TelerelayError;
use telerelay_relay::Relay;

use crate::handlers;

/// Renders the Prometheus exposition text.
pub type MetricsRender = Arc<dyn Fn() -> String + Send + Sync>;

/// State for the unauthenticated health and metrics endpoints.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: Instant,
    /// Name reported as `service` by `/health`.
    pub service_name: String,
    pub prometheus_render: Option<MetricsRender>,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub relay: Arc<Relay>,
    pub health: HealthState,
}

/// Gateway server configuration (mirrors `GatewayConfig` from telerelay-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    /// `0` binds an ephemeral port.
    pub port: u16,
    /// `Access-Control-Max-Age` for preflight responses.
    pub cors_max_age: Duration,
}

/// Build the router with every route and middleware layer.
///
/// - GET /health, GET /metrics
/// - POST /api/join, /api/leave, /api/message, /api/ping
/// - GET /api/poll, /api/room
pub fn build_router(state: GatewayState, cors_max_age: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(cors_max_age);

    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/metrics", get(handlers::get_metrics))
        .route("/api/join", post(handlers::post_join))
        .route("/api/leave", post(handlers::post_leave))
        .route("/api/message", post(handlers::post_message))
        .route("/api/poll", get(handlers::get_poll))
        .route("/api/room", get(handlers::get_room))
        .route("/api/ping", post(handlers::post_ping))
        .fallback(handlers::fallback)
        .method_not_allowed_fallback(handlers::fallback)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Bind the listener so bind failures surface before serving starts.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, TelerelayError> {
    let addr = format!("{}:{}", config.host, config.port);
    TcpListener::bind(&addr)
        .await
        .map_err(|e| TelerelayError::Transport {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })
}

/// Serve `router` on `listener` until `cancel` fires.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    cancel: CancellationToken,
) -> Result<(), TelerelayError> {
    let addr = local_addr(&listener)?;
    tracing::info!("gateway server listening on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| TelerelayError::Transport {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })
}

/// Bind and serve in one step.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), TelerelayError> {
    let listener = bind(config).await?;
    serve(listener, build_router(state, config.cors_max_age), cancel).await
}

pub(crate) fn local_addr(listener: &TcpListener) -> Result<SocketAddr, TelerelayError> {
    listener.local_addr().map_err(|e| TelerelayError::Transport {
        message: format!("gateway listener has no local address: {e}"),
        source: Some(Box::new(e)),
    })
}

#[cfg(test)]
mod tests {
    use telerelay_relay::RelaySettings;

    use super::*;

    #[test]
    fn gateway_state_is_clone() {
        let state = GatewayState {
            relay: Arc::new(Relay::new(RelaySettings::default())),
            health: HealthState {
                start_time: Instant::now(),
                service_name: "svc".to_string(),
                prometheus_render: None,
            },
        };
        let cloned = state.clone();
        assert!(Arc::ptr_eq(&state.relay, &cloned.relay));
    }

    #[tokio::test]
    async fn bind_failure_is_transport_error() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port,
            cors_max_age: Duration::from_secs(60),
        };
        let err = bind(&config).await.unwrap_err();
        assert!(matches!(err, TelerelayError::Transport { .. }));
        assert!(err.to_string().contains("transport error"));
    }
}
