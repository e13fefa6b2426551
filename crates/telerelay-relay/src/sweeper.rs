// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic cleanup sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::relay::Relay;

/// Run [`Relay::cleanup`] every `every` until `cancel` fires.
pub fn spawn_cleanup(
    relay: Arc<Relay>,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // Skip the first immediate tick.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let stats = relay.cleanup().await;
                    if stats.evicted_participants > 0 || stats.removed_rooms > 0 {
                        info!(
                            evicted = stats.evicted_participants,
                            removed_rooms = stats.removed_rooms,
                            "relay cleanup sweep"
                        );
                    } else {
                        debug!("relay cleanup sweep found nothing to remove");
                    }
                }
                _ = cancel.cancelled() => {
                    info!("relay cleanup task shutting down");
                    break;
                }
            }
        }
    })
}
