// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background short-poll and keep-alive loops.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use telerelay_relay::RelayMessage;

use crate::client::RelayClient;

/// Poll `room_id` every `every`, forwarding each message to `tx` in order.
///
/// The first poll runs immediately. Failed polls are logged and retried on
/// the next tick. The task ends on cancellation or when `tx` is closed.
pub fn spawn_poller(
    client: Arc<RelayClient>,
    room_id: String,
    user_id: String,
    every: Duration,
    tx: mpsc::Sender<RelayMessage>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(%room_id, %user_id, "poller shutting down");
                    break;
                }
                _ = interval.tick() => {
                    let messages = match client.poll(&room_id, &user_id).await {
                        Ok(messages) => messages,
                        Err(e) => {
                            warn!(%room_id, %user_id, error = %e, "poll failed, retrying");
                            continue;
                        }
                    };
                    for message in messages {
                        if tx.send(message).await.is_err() {
                            debug!(%room_id, %user_id, "message receiver dropped, stopping poller");
                            return;
                        }
                    }
                }
            }
        }
    })
}

/// Ping every `every` so the relay keeps `user_id`'s session alive.
pub fn spawn_keepalive(
    client: Arc<RelayClient>,
    user_id: String,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Joining already counts as a heartbeat.
        interval.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(%user_id, "keep-alive shutting down");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = client.ping(&user_id).await {
                        warn!(%user_id, error = %e, "keep-alive ping failed");
                    }
                }
            }
        }
    })
}
