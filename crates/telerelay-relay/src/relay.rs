// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The signaling relay: rooms, participant sessions and message delivery.
//!
//! All state sits behind a single async mutex, so every operation is atomic
//! with respect to every other. Timestamps come from a strictly increasing
//! counter seeded by the wall clock; the same counter produces poll cursors,
//! so a message appended after a poll always sorts after that poll's cursor.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use telerelay_config::model::RelayConfig;
use telerelay_core::TelerelayError;

use crate::clock::{Clock, SystemClock};
use crate::message::{OutgoingMessage, RelayMessage};
use crate::room::{ParticipantInfo, Room};
use crate::signal::Signal;

/// Limits and timeouts the relay enforces.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub max_messages_per_room: usize,
    pub poll_batch_limit: usize,
    pub heartbeat_timeout: Duration,
    pub room_idle_timeout: Duration,
    /// Role that receives a replay of the pending invitation on join.
    pub callee_role: String,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self::from(&RelayConfig::default())
    }
}

impl From<&RelayConfig> for RelaySettings {
    fn from(config: &RelayConfig) -> Self {
        Self {
            max_messages_per_room: config.max_messages_per_room,
            poll_batch_limit: config.poll_batch_limit,
            heartbeat_timeout: Duration::from_secs(config.heartbeat_timeout_secs),
            room_idle_timeout: Duration::from_secs(config.room_idle_timeout_secs),
            callee_role: config.callee_role.clone(),
        }
    }
}

/// Result of a join: the room and everyone else in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinOutcome {
    pub room_id: String,
    pub users: Vec<ParticipantInfo>,
    /// Poll cursor taken at join. Precedes the join broadcast and any
    /// invitation replay, and follows everything already in the room.
    #[serde(default)]
    pub timestamp: i64,
}

/// Messages returned by a poll plus the cursor for the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollBatch {
    pub messages: Vec<RelayMessage>,
    pub timestamp: i64,
}

/// Public view of a room. Unknown rooms report `exists: false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room_id: String,
    pub users: Vec<ParticipantInfo>,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_count: Option<usize>,
}

/// What one cleanup sweep removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupStats {
    pub evicted_participants: usize,
    pub removed_rooms: usize,
}

/// Current occupancy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelayStats {
    pub rooms: usize,
    pub participants: usize,
}

#[derive(Debug)]
struct Session {
    room_id: String,
    last_heartbeat: i64,
}

#[derive(Debug, Default)]
struct RelayState {
    rooms: HashMap<String, Room>,
    sessions: HashMap<String, Session>,
    last_timestamp: i64,
}

impl RelayState {
    fn stats(&self) -> RelayStats {
        RelayStats {
            rooms: self.rooms.len(),
            participants: self.sessions.len(),
        }
    }

    fn publish_occupancy(&self) {
        let stats = self.stats();
        telerelay_prometheus::set_occupancy(stats.rooms, stats.participants);
    }
}

/// In-memory, room-scoped signaling relay.
pub struct Relay {
    state: Mutex<RelayState>,
    settings: RelaySettings,
    clock: Arc<dyn Clock>,
}

impl Relay {
    pub fn new(settings: RelaySettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: RelaySettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(RelayState::default()),
            settings,
            clock,
        }
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    /// Next strictly increasing timestamp.
    fn tick(&self, state: &mut RelayState) -> i64 {
        let now = self.clock.now_millis().max(state.last_timestamp + 1);
        state.last_timestamp = now;
        now
    }

    /// Stamp and append a message, accounting for truncation.
    fn append(
        &self,
        state: &mut RelayState,
        room_id: &str,
        from: &str,
        to: Option<String>,
        signal: Signal,
    ) -> Option<i64> {
        let timestamp = self.tick(state);
        let room = state.rooms.get_mut(room_id)?;
        telerelay_prometheus::record_relayed(signal.kind());
        let message = RelayMessage {
            from: from.to_string(),
            to,
            room_id: room_id.to_string(),
            signal,
            timestamp,
        };
        push_message(room, message, self.settings.max_messages_per_room, room_id);
        Some(timestamp)
    }

    /// Remove `user_id` from `room_id` and broadcast `user-left`.
    fn depart(&self, state: &mut RelayState, room_id: &str, user_id: &str) -> bool {
        let removed = match state.rooms.get_mut(room_id) {
            Some(room) => room.remove_member(user_id),
            None => None,
        };
        match removed {
            Some(info) => {
                self.append(state, room_id, user_id, None, Signal::user_left(info.user_type));
                true
            }
            None => false,
        }
    }

    /// Join a room, creating it if needed.
    ///
    /// Re-joining replaces the caller's entry. Joining a different room moves
    /// the caller, broadcasting `user-left` in the room it left. A caller with
    /// the callee role gets any pending invitation re-appended with a fresh
    /// timestamp so its next poll picks it up.
    pub async fn join(
        &self,
        room_id: &str,
        user_id: &str,
        user_type: &str,
    ) -> Result<JoinOutcome, TelerelayError> {
        require_fields(&[("roomId", room_id), ("userId", user_id), ("userType", user_type)])?;

        let mut state = self.state.lock().await;
        let now = self.tick(&mut state);

        let previous_room = state
            .sessions
            .get(user_id)
            .map(|s| s.room_id.clone())
            .filter(|r| r != room_id);
        if let Some(previous) = previous_room {
            if self.depart(&mut state, &previous, user_id) {
                info!(room_id = %previous, user_id, "participant moved to another room");
            }
        }

        state
            .rooms
            .entry(room_id.to_string())
            .or_insert_with(|| Room::new(now))
            .upsert_member(ParticipantInfo {
                user_id: user_id.to_string(),
                user_type: user_type.to_string(),
                joined_at: now,
            });
        state.sessions.insert(
            user_id.to_string(),
            Session {
                room_id: room_id.to_string(),
                last_heartbeat: now,
            },
        );

        self.append(&mut state, room_id, user_id, None, Signal::user_joined(user_type));

        if user_type == self.settings.callee_role {
            let pending = state
                .rooms
                .get(room_id)
                .and_then(|room| room.pending_invitation.clone());
            if let Some(invitation) = pending {
                let timestamp = self.tick(&mut state);
                if let Some(room) = state.rooms.get_mut(room_id) {
                    info!(room_id, user_id, from = %invitation.from, "replaying pending invitation");
                    telerelay_prometheus::record_relayed(invitation.kind());
                    let replay = RelayMessage {
                        timestamp,
                        ..invitation
                    };
                    push_message(room, replay, self.settings.max_messages_per_room, room_id);
                }
            }
        }

        let users = state
            .rooms
            .get(room_id)
            .map(|room| {
                room.members
                    .iter()
                    .filter(|m| m.user_id != user_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        state.publish_occupancy();

        info!(room_id, user_id, user_type, "participant joined");
        Ok(JoinOutcome {
            room_id: room_id.to_string(),
            users,
            timestamp: now,
        })
    }

    /// Leave a room. Leaving when not a member succeeds without effect.
    pub async fn leave(&self, room_id: &str, user_id: &str) -> Result<(), TelerelayError> {
        require_fields(&[("roomId", room_id), ("userId", user_id)])?;

        let mut state = self.state.lock().await;
        if !state.rooms.contains_key(room_id) {
            return Err(TelerelayError::RoomNotFound(room_id.to_string()));
        }

        if self.depart(&mut state, room_id, user_id) {
            let owns_session = state
                .sessions
                .get(user_id)
                .is_some_and(|s| s.room_id == room_id);
            if owns_session {
                state.sessions.remove(user_id);
            }
            state.publish_occupancy();
            info!(room_id, user_id, "participant left");
        }
        Ok(())
    }

    /// Append a client message. Returns its timestamp, which doubles as its id.
    ///
    /// `incoming-call` becomes the room's pending invitation; `patient-joined`,
    /// `call-rejected` and `call-ended` clear it.
    pub async fn send(&self, message: OutgoingMessage) -> Result<i64, TelerelayError> {
        require_fields(&[
            ("roomId", message.room_id.as_str()),
            ("from", message.from.as_str()),
            ("type", message.signal.kind()),
        ])?;

        let mut state = self.state.lock().await;
        if !state.rooms.contains_key(&message.room_id) {
            return Err(TelerelayError::RoomNotFound(message.room_id));
        }

        let OutgoingMessage {
            room_id,
            from,
            to,
            signal,
        } = message;
        let to = to.filter(|t| !t.is_empty());
        let is_invitation = matches!(signal, Signal::IncomingCall(_));
        let clears_invitation = matches!(
            signal,
            Signal::PatientJoined(_) | Signal::CallRejected(_) | Signal::CallEnded(_)
        );
        let kind = signal.kind().to_string();

        let timestamp = self
            .append(&mut state, &room_id, &from, to.clone(), signal.clone())
            .ok_or_else(|| TelerelayError::RoomNotFound(room_id.clone()))?;

        if let Some(room) = state.rooms.get_mut(&room_id) {
            if is_invitation {
                debug!(room_id = %room_id, from = %from, "storing pending invitation");
                room.pending_invitation = Some(RelayMessage {
                    from: from.clone(),
                    to: to.clone(),
                    room_id: room_id.clone(),
                    signal,
                    timestamp,
                });
            } else if clears_invitation && room.pending_invitation.take().is_some() {
                debug!(room_id = %room_id, from = %from, kind = %kind, "cleared pending invitation");
            }
        }

        debug!(
            room_id = %room_id,
            from = %from,
            to = to.as_deref().unwrap_or("all"),
            kind = %kind,
            timestamp,
            "message relayed"
        );
        Ok(timestamp)
    }

    /// Messages newer than `since` for `user_id`, capped to the newest batch.
    ///
    /// Unknown rooms yield an empty batch.
    pub async fn poll(
        &self,
        room_id: &str,
        user_id: &str,
        since: i64,
    ) -> Result<PollBatch, TelerelayError> {
        require_fields(&[("roomId", room_id), ("userId", user_id)])?;

        let mut state = self.state.lock().await;
        let messages = state
            .rooms
            .get(room_id)
            .map(|room| room.visible_since(user_id, since, self.settings.poll_batch_limit))
            .unwrap_or_default();
        let timestamp = self.tick(&mut state);
        Ok(PollBatch {
            messages,
            timestamp,
        })
    }

    pub async fn room_info(&self, room_id: &str) -> Result<RoomSnapshot, TelerelayError> {
        require_fields(&[("roomId", room_id)])?;

        let state = self.state.lock().await;
        Ok(match state.rooms.get(room_id) {
            Some(room) => RoomSnapshot {
                room_id: room_id.to_string(),
                users: room.members.clone(),
                exists: true,
                message_count: Some(room.message_count()),
            },
            None => RoomSnapshot {
                room_id: room_id.to_string(),
                users: Vec::new(),
                exists: false,
                message_count: None,
            },
        })
    }

    /// Refresh a heartbeat. Unknown participants are accepted silently.
    pub async fn ping(&self, user_id: &str) -> Result<i64, TelerelayError> {
        require_fields(&[("userId", user_id)])?;

        let mut state = self.state.lock().await;
        let now = self.clock.now_millis();
        if let Some(session) = state.sessions.get_mut(user_id) {
            session.last_heartbeat = now;
        }
        Ok(now)
    }

    /// Evict participants whose heartbeat expired, then drop empty idle rooms.
    pub async fn cleanup(&self) -> CleanupStats {
        let mut state = self.state.lock().await;
        let now = self.clock.now_millis();
        let heartbeat_ms = self.settings.heartbeat_timeout.as_millis() as i64;
        let idle_ms = self.settings.room_idle_timeout.as_millis() as i64;

        let expired: Vec<(String, String)> = state
            .sessions
            .iter()
            .filter(|(_, s)| now - s.last_heartbeat > heartbeat_ms)
            .map(|(user_id, s)| (user_id.clone(), s.room_id.clone()))
            .collect();

        for (user_id, room_id) in &expired {
            state.sessions.remove(user_id);
            self.depart(&mut state, room_id, user_id);
            info!(room_id = %room_id, user_id = %user_id, "evicted inactive participant");
        }

        let before = state.rooms.len();
        state
            .rooms
            .retain(|_, room| !room.members.is_empty() || now - room.last_activity <= idle_ms);
        let removed_rooms = before - state.rooms.len();

        if !expired.is_empty() || removed_rooms > 0 {
            telerelay_prometheus::record_evicted(expired.len() as u64);
            telerelay_prometheus::record_rooms_removed(removed_rooms as u64);
            state.publish_occupancy();
            debug!(
                evicted = expired.len(),
                removed_rooms, "cleanup sweep finished"
            );
        }

        CleanupStats {
            evicted_participants: expired.len(),
            removed_rooms,
        }
    }

    pub async fn stats(&self) -> RelayStats {
        self.state.lock().await.stats()
    }
}

fn push_message(room: &mut Room, message: RelayMessage, capacity: usize, room_id: &str) {
    let dropped = room.append(message, capacity);
    if dropped > 0 {
        telerelay_prometheus::record_dropped(dropped as u64);
        debug!(room_id, dropped, "room log full, oldest messages discarded");
    }
}

/// Fail with every empty field named, in order.
pub fn require_fields(fields: &[(&str, &str)]) -> Result<(), TelerelayError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(TelerelayError::MissingField(missing.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::clock::ManualClock;

    const START: i64 = 1_700_000_000_000;

    fn relay() -> (Relay, ManualClock) {
        let clock = ManualClock::new(START);
        let relay = Relay::with_clock(RelaySettings::default(), Arc::new(clock.clone()));
        (relay, clock)
    }

    fn outgoing(room: &str, from: &str, to: Option<&str>, kind: &str) -> OutgoingMessage {
        let data = match kind {
            "offer" | "answer" => json!({"type": kind, "sdp": "v=0"}),
            _ => json!({}),
        };
        OutgoingMessage {
            room_id: room.to_string(),
            from: from.to_string(),
            to: to.map(str::to_string),
            signal: Signal::from_parts(kind, data).unwrap(),
        }
    }

    #[tokio::test]
    async fn join_creates_room_and_excludes_caller() {
        let (relay, _) = relay();
        let first = relay.join("consult-42", "dr-ana", "doctor").await.unwrap();
        assert!(first.users.is_empty());

        let second = relay.join("consult-42", "pt-luis", "patient").await.unwrap();
        assert_eq!(second.room_id, "consult-42");
        assert_eq!(second.users.len(), 1);
        assert_eq!(second.users[0].user_id, "dr-ana");
        assert_eq!(second.users[0].user_type, "doctor");
    }

    #[tokio::test]
    async fn rejoin_does_not_duplicate() {
        let (relay, _) = relay();
        relay.join("r", "u1", "doctor").await.unwrap();
        relay.join("r", "u1", "doctor").await.unwrap();
        let info = relay.room_info("r").await.unwrap();
        assert_eq!(info.users.len(), 1);
        assert_eq!(relay.stats().await.participants, 1);
    }

    #[tokio::test]
    async fn join_requires_all_fields() {
        let (relay, _) = relay();
        let err = relay.join("", "u1", "").await.unwrap_err();
        match err {
            TelerelayError::MissingField(fields) => assert_eq!(fields, "roomId, userType"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn joining_another_room_moves_participant() {
        let (relay, _) = relay();
        relay.join("a", "u1", "doctor").await.unwrap();
        relay.join("a", "u2", "patient").await.unwrap();
        relay.join("b", "u1", "doctor").await.unwrap();

        let room_a = relay.room_info("a").await.unwrap();
        assert_eq!(room_a.users.len(), 1);
        let batch = relay.poll("a", "u2", 0).await.unwrap();
        assert_eq!(batch.messages.last().map(|m| m.kind()), Some("user-left"));
        assert_eq!(relay.stats().await.participants, 2);
    }

    #[tokio::test]
    async fn timestamps_strictly_increase_within_one_millisecond() {
        let (relay, _) = relay();
        relay.join("r", "a", "doctor").await.unwrap();
        let mut last = 0;
        for _ in 0..5 {
            let ts = relay.send(outgoing("r", "a", None, "chat")).await.unwrap();
            assert!(ts > last);
            last = ts;
        }
    }

    #[tokio::test]
    async fn poll_cursor_precedes_later_messages() {
        let (relay, _) = relay();
        relay.join("r", "a", "doctor").await.unwrap();
        relay.join("r", "b", "patient").await.unwrap();

        let cursor = relay.poll("r", "b", 0).await.unwrap().timestamp;
        relay.send(outgoing("r", "a", None, "chat")).await.unwrap();
        let batch = relay.poll("r", "b", cursor).await.unwrap();
        assert_eq!(batch.messages.len(), 1);
        assert!(batch.timestamp > batch.messages[0].timestamp);
    }

    #[tokio::test]
    async fn send_validates_and_requires_room() {
        let (relay, _) = relay();
        let err = relay
            .send(outgoing("ghost", "a", None, "chat"))
            .await
            .unwrap_err();
        assert!(matches!(err, TelerelayError::RoomNotFound(ref r) if r == "ghost"));

        let err = relay.send(outgoing("ghost", "", None, "chat")).await.unwrap_err();
        assert!(matches!(err, TelerelayError::MissingField(ref f) if f == "from"));
    }

    #[tokio::test]
    async fn addressed_message_reaches_only_addressee() {
        let (relay, _) = relay();
        for (user, role) in [("dr", "doctor"), ("pt", "patient"), ("rn", "nurse")] {
            relay.join("r", user, role).await.unwrap();
        }
        relay.send(outgoing("r", "dr", Some("pt"), "offer")).await.unwrap();

        let to_patient = relay.poll("r", "pt", 0).await.unwrap();
        assert!(to_patient.messages.iter().any(|m| m.kind() == "offer"));
        let to_nurse = relay.poll("r", "rn", 0).await.unwrap();
        assert!(to_nurse.messages.iter().all(|m| m.kind() != "offer"));
        let to_sender = relay.poll("r", "dr", 0).await.unwrap();
        assert!(to_sender.messages.iter().all(|m| m.from != "dr"));
    }

    #[tokio::test]
    async fn poll_unknown_room_is_empty() {
        let (relay, _) = relay();
        let batch = relay.poll("nowhere", "u", 0).await.unwrap();
        assert!(batch.messages.is_empty());
        assert!(batch.timestamp >= START);
    }

    #[tokio::test]
    async fn poll_returns_newest_batch() {
        let (relay, _) = relay();
        relay.join("r", "a", "doctor").await.unwrap();
        let mut stamps = Vec::new();
        for _ in 0..30 {
            stamps.push(relay.send(outgoing("r", "a", None, "chat")).await.unwrap());
        }
        let batch = relay.poll("r", "b", 0).await.unwrap();
        assert_eq!(batch.messages.len(), 20);
        let got: Vec<i64> = batch.messages.iter().map(|m| m.timestamp).collect();
        assert_eq!(got, stamps[10..].to_vec());
    }

    #[tokio::test]
    async fn log_keeps_most_recent_hundred() {
        let (relay, _) = relay();
        relay.join("r", "a", "doctor").await.unwrap();
        let mut stamps = Vec::new();
        for _ in 0..150 {
            stamps.push(relay.send(outgoing("r", "a", None, "chat")).await.unwrap());
        }
        let info = relay.room_info("r").await.unwrap();
        assert_eq!(info.message_count, Some(100));

        // The 50 oldest chat messages can no longer be polled.
        let batch = relay.poll("r", "b", stamps[49] - 1).await.unwrap();
        assert!(batch.messages.iter().all(|m| m.timestamp > stamps[49]));
    }

    #[tokio::test]
    async fn pending_invitation_replayed_to_late_callee() {
        let (relay, clock) = relay();
        relay.join("consult-42", "dr-ana", "doctor").await.unwrap();
        let invite_ts = relay
            .send(outgoing("consult-42", "dr-ana", None, "incoming-call"))
            .await
            .unwrap();

        clock.advance(Duration::from_secs(5));
        relay.join("consult-42", "pt-luis", "patient").await.unwrap();

        let batch = relay.poll("consult-42", "pt-luis", invite_ts).await.unwrap();
        let replay = batch
            .messages
            .iter()
            .find(|m| m.kind() == "incoming-call")
            .expect("invitation replayed");
        assert!(replay.timestamp > invite_ts);
        assert_eq!(replay.from, "dr-ana");
    }

    #[tokio::test]
    async fn join_cursor_skips_history_but_keeps_replay() {
        let (relay, _) = relay();
        relay.join("r", "dr", "doctor").await.unwrap();
        let invite_ts = relay.send(outgoing("r", "dr", None, "incoming-call")).await.unwrap();
        relay.send(outgoing("r", "dr", None, "chat")).await.unwrap();

        let joined = relay.join("r", "pt", "patient").await.unwrap();
        assert!(joined.timestamp > invite_ts);

        let batch = relay.poll("r", "pt", joined.timestamp).await.unwrap();
        let kinds: Vec<_> = batch.messages.iter().map(|m| m.kind()).collect();
        assert_eq!(kinds, ["incoming-call"]);
        assert!(batch.messages[0].timestamp > joined.timestamp);
    }

    #[tokio::test]
    async fn non_callee_role_gets_no_replay() {
        let (relay, _) = relay();
        relay.join("r", "dr", "doctor").await.unwrap();
        let ts = relay.send(outgoing("r", "dr", None, "incoming-call")).await.unwrap();
        relay.join("r", "rn", "nurse").await.unwrap();
        let batch = relay.poll("r", "rn", ts).await.unwrap();
        assert!(batch.messages.iter().all(|m| m.kind() != "incoming-call"));
    }

    #[tokio::test]
    async fn rejection_and_hangup_clear_invitation() {
        for clearing in ["call-rejected", "patient-joined", "call-ended"] {
            let (relay, _) = relay();
            relay.join("r", "dr", "doctor").await.unwrap();
            relay.send(outgoing("r", "dr", None, "incoming-call")).await.unwrap();
            relay.join("r", "pt1", "patient").await.unwrap();
            relay.send(outgoing("r", "pt1", None, clearing)).await.unwrap();

            let cursor = relay.join("r", "pt2", "patient").await.unwrap().timestamp;
            let batch = relay.poll("r", "pt2", cursor).await.unwrap();
            assert!(
                batch.messages.iter().all(|m| m.kind() != "incoming-call"),
                "{clearing} should clear the invitation"
            );
        }
    }

    #[tokio::test]
    async fn leave_semantics() {
        let (relay, _) = relay();
        let err = relay.leave("ghost", "u").await.unwrap_err();
        assert!(matches!(err, TelerelayError::RoomNotFound(_)));

        relay.join("r", "a", "doctor").await.unwrap();
        relay.join("r", "b", "patient").await.unwrap();
        relay.leave("r", "b").await.unwrap();
        relay.leave("r", "b").await.unwrap();

        let batch = relay.poll("r", "a", 0).await.unwrap();
        let lefts = batch.messages.iter().filter(|m| m.kind() == "user-left").count();
        assert_eq!(lefts, 1);
        assert_eq!(relay.stats().await, RelayStats { rooms: 1, participants: 1 });
    }

    #[tokio::test]
    async fn room_info_for_unknown_room() {
        let (relay, _) = relay();
        let info = relay.room_info("ghost").await.unwrap();
        assert!(!info.exists);
        assert!(info.users.is_empty());
        assert_eq!(info.message_count, None);
        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("messageCount").is_none());
    }

    #[tokio::test]
    async fn cleanup_evicts_silent_participants() {
        let (relay, clock) = relay();
        relay.join("r", "a", "doctor").await.unwrap();
        relay.join("r", "b", "patient").await.unwrap();

        clock.advance(Duration::from_secs(20));
        relay.ping("a").await.unwrap();
        relay.ping("stranger").await.unwrap();
        clock.advance(Duration::from_secs(15));

        let stats = relay.cleanup().await;
        assert_eq!(stats.evicted_participants, 1);
        assert_eq!(stats.removed_rooms, 0);

        let info = relay.room_info("r").await.unwrap();
        assert_eq!(info.users.len(), 1);
        assert_eq!(info.users[0].user_id, "a");
        let batch = relay.poll("r", "a", 0).await.unwrap();
        let left = batch.messages.last().unwrap();
        assert_eq!(left.kind(), "user-left");
        assert_eq!(left.from, "b");
    }

    #[tokio::test]
    async fn cleanup_removes_idle_empty_rooms() {
        let (relay, clock) = relay();
        relay.join("r", "a", "doctor").await.unwrap();
        relay.leave("r", "a").await.unwrap();

        clock.advance(Duration::from_secs(60));
        assert_eq!(relay.cleanup().await.removed_rooms, 0);

        clock.advance(Duration::from_secs(3600));
        assert_eq!(relay.cleanup().await.removed_rooms, 1);
        assert!(!relay.room_info("r").await.unwrap().exists);
    }
}
