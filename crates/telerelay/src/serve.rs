// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `telerelay serve` command implementation.
//!
//! Builds the relay, optionally installs the Prometheus recorder, starts the
//! HTTP gateway and the cleanup sweep, and runs until SIGINT or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use telerelay_config::model::TelerelayConfig;
use telerelay_core::{PluginAdapter, TelerelayError};
use telerelay_gateway::{GatewayServer, MetricsRender, ServerConfig};
use telerelay_prometheus::PrometheusAdapter;
use telerelay_relay::{spawn_cleanup, Relay, RelaySettings};

use crate::shutdown;

/// Runs the relay until a shutdown signal arrives.
pub async fn run_serve(config: TelerelayConfig) -> Result<(), TelerelayError> {
    init_tracing(&config.log.level);

    let relay = Arc::new(Relay::new(RelaySettings::from(&config.relay)));

    let prometheus_render: Option<MetricsRender> = if config.prometheus.enabled {
        let adapter = Arc::new(PrometheusAdapter::new()?);
        Some(Arc::new(move || adapter.render()))
    } else {
        None
    };

    let cancel = shutdown::install_signal_handler();

    let gateway = GatewayServer::new(
        ServerConfig {
            host: config.gateway.host.clone(),
            port: config.gateway.port,
            cors_max_age: Duration::from_secs(config.gateway.cors_max_age_secs),
        },
        Arc::clone(&relay),
        config.gateway.service_name.clone(),
        prometheus_render,
    )
    .with_shutdown(&cancel);
    let addr = gateway.start().await?;

    let sweeper = spawn_cleanup(
        Arc::clone(&relay),
        Duration::from_secs(config.relay.cleanup_interval_secs),
        cancel.clone(),
    );

    let mem_cancel = cancel.clone();
    let memory = tokio::spawn(async move {
        memory_monitor(mem_cancel).await;
    });

    info!(
        %addr,
        service = %config.gateway.service_name,
        metrics = config.prometheus.enabled,
        "telerelay serving"
    );

    cancel.cancelled().await;

    gateway.shutdown().await?;
    for (name, handle) in [("cleanup sweep", sweeper), ("memory monitor", memory)] {
        if let Err(e) = handle.await {
            warn!(task = name, error = %e, "background task failed");
        }
    }

    info!("telerelay serve shutdown complete");
    Ok(())
}

/// Exports jemalloc heap and resident bytes every 5 seconds.
#[cfg(not(target_env = "msvc"))]
async fn memory_monitor(cancel: tokio_util::sync::CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(5));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // Stats are cached until the epoch advances.
                let _ = tikv_jemalloc_ctl::epoch::advance();
                let allocated = tikv_jemalloc_ctl::stats::allocated::read().unwrap_or(0);
                let resident = tikv_jemalloc_ctl::stats::resident::read().unwrap_or(0);
                telerelay_prometheus::set_memory(allocated as f64, resident as f64);
            }
            _ = cancel.cancelled() => {
                info!("memory monitor shutting down");
                break;
            }
        }
    }
}

/// Stub memory monitor for MSVC (no jemalloc).
#[cfg(target_env = "msvc")]
async fn memory_monitor(cancel: tokio_util::sync::CancellationToken) {
    cancel.cancelled().await;
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("telerelay={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
