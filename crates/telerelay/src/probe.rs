// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `telerelay probe` command implementation.
//!
//! Checks a running relay end to end: health, join, room visibility, a
//! message round trip between two throwaway participants, and leave.

use std::time::Duration;

use telerelay_client::RelayClient;
use telerelay_config::model::TelerelayConfig;
use telerelay_core::TelerelayError;
use telerelay_relay::{OutgoingMessage, Signal};

/// One line of probe output.
#[derive(Debug)]
pub struct ProbeStep {
    pub name: &'static str,
    pub detail: String,
}

/// Run the probe and print each step.
pub async fn run_probe(
    config: &TelerelayConfig,
    url: Option<String>,
    room: &str,
) -> Result<(), TelerelayError> {
    let base_url = url.unwrap_or_else(|| config.client.signaling_url.clone());
    let timeout = Duration::from_secs(config.client.request_timeout_secs);
    println!("probing {base_url} (room {room})");

    let steps = probe(&base_url, timeout, room).await?;
    for step in &steps {
        println!("  ok  {:<8} {}", step.name, step.detail);
    }
    println!("relay is healthy");
    Ok(())
}

/// Drive two clients through a full signaling exchange.
pub async fn probe(
    base_url: &str,
    timeout: Duration,
    room: &str,
) -> Result<Vec<ProbeStep>, TelerelayError> {
    let caller = RelayClient::new(base_url, timeout)?;
    let callee = RelayClient::new(base_url, timeout)?;
    let tag = uuid::Uuid::new_v4().simple().to_string();
    let caller_id = format!("probe-caller-{tag}");
    let callee_id = format!("probe-callee-{tag}");
    let mut steps = Vec::new();

    let health = caller.health().await?;
    steps.push(ProbeStep {
        name: "health",
        detail: format!("{} ({}, up {}s)", health.status, health.service, health.uptime_secs),
    });

    caller.join(room, &caller_id, "probe").await?;
    let joined = callee.join(room, &callee_id, "probe").await?;
    steps.push(ProbeStep {
        name: "join",
        detail: format!("{} peer(s) already present", joined.users.len()),
    });

    let snapshot = caller.room_info(room).await?;
    if !snapshot.users.iter().any(|u| u.user_id == callee_id) {
        return Err(TelerelayError::Internal(format!(
            "room {room} does not list participant {callee_id}"
        )));
    }
    steps.push(ProbeStep {
        name: "room",
        detail: format!("{} participant(s)", snapshot.users.len()),
    });

    let sent = caller
        .send(&OutgoingMessage {
            room_id: room.to_string(),
            from: caller_id.clone(),
            to: Some(callee_id.clone()),
            signal: Signal::Custom {
                kind: "probe".to_string(),
                data: serde_json::json!({ "probe": tag }),
            },
        })
        .await?;
    let received = callee.poll(room, &callee_id).await?;
    if !received.iter().any(|m| m.timestamp == sent) {
        return Err(TelerelayError::Internal(format!(
            "message {sent} was not delivered to {callee_id}"
        )));
    }
    steps.push(ProbeStep {
        name: "relay",
        detail: format!("message {sent} delivered"),
    });

    callee.leave(room, &callee_id).await?;
    caller.leave(room, &caller_id).await?;
    steps.push(ProbeStep {
        name: "leave",
        detail: "both participants left".to_string(),
    });

    Ok(steps)
}
