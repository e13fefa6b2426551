// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relayed message envelope and its JSON wire form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use telerelay_core::TelerelayError;

use crate::signal::Signal;

/// A message as stored in a room log and returned by poll.
///
/// Serializes as `{"type", "from", "to"?, "roomId", "data", "timestamp"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireMessage", try_from = "WireMessage")]
pub struct RelayMessage {
    pub from: String,
    /// Addressee; `None` broadcasts to the room.
    pub to: Option<String>,
    pub room_id: String,
    pub signal: Signal,
    /// Server-assigned, strictly increasing across the relay.
    pub timestamp: i64,
}

impl RelayMessage {
    pub fn kind(&self) -> &str {
        self.signal.kind()
    }

    /// Whether `user_id` should receive this message on poll.
    pub fn is_visible_to(&self, user_id: &str) -> bool {
        self.from != user_id && self.to.as_deref().is_none_or(|to| to == user_id)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage {
    #[serde(rename = "type")]
    kind: String,
    from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    to: Option<String>,
    room_id: String,
    #[serde(default)]
    data: Value,
    timestamp: i64,
}

impl From<RelayMessage> for WireMessage {
    fn from(msg: RelayMessage) -> Self {
        Self {
            kind: msg.signal.kind().to_string(),
            data: msg.signal.to_data(),
            from: msg.from,
            to: msg.to,
            room_id: msg.room_id,
            timestamp: msg.timestamp,
        }
    }
}

impl TryFrom<WireMessage> for RelayMessage {
    type Error = TelerelayError;

    fn try_from(wire: WireMessage) -> Result<Self, Self::Error> {
        Ok(Self {
            signal: Signal::from_parts(&wire.kind, wire.data)?,
            from: wire.from,
            to: wire.to,
            room_id: wire.room_id,
            timestamp: wire.timestamp,
        })
    }
}

/// A message submitted by a client, before the relay stamps it.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMessage {
    pub room_id: String,
    pub from: String,
    pub to: Option<String>,
    pub signal: Signal,
}
