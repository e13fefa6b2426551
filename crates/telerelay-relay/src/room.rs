// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-room state: members, bounded message log, pending invitation.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::message::RelayMessage;

/// A room member as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    pub user_id: String,
    pub user_type: String,
    /// Join time in milliseconds since the Unix epoch.
    pub joined_at: i64,
}

#[derive(Debug)]
pub(crate) struct Room {
    /// Members in join order.
    pub(crate) members: Vec<ParticipantInfo>,
    log: VecDeque<RelayMessage>,
    pub(crate) pending_invitation: Option<RelayMessage>,
    pub(crate) last_activity: i64,
}

impl Room {
    pub(crate) fn new(now: i64) -> Self {
        Self {
            members: Vec::new(),
            log: VecDeque::new(),
            pending_invitation: None,
            last_activity: now,
        }
    }

    /// Insert or replace a member. Returns `true` when the member is new.
    pub(crate) fn upsert_member(&mut self, info: ParticipantInfo) -> bool {
        match self.members.iter_mut().find(|m| m.user_id == info.user_id) {
            Some(existing) => {
                *existing = info;
                false
            }
            None => {
                self.members.push(info);
                true
            }
        }
    }

    pub(crate) fn remove_member(&mut self, user_id: &str) -> Option<ParticipantInfo> {
        let index = self.members.iter().position(|m| m.user_id == user_id)?;
        Some(self.members.remove(index))
    }

    /// Append to the log, discarding the oldest entries beyond `capacity`.
    ///
    /// Returns how many entries were discarded.
    pub(crate) fn append(&mut self, message: RelayMessage, capacity: usize) -> usize {
        self.last_activity = message.timestamp;
        self.log.push_back(message);
        let excess = self.log.len().saturating_sub(capacity);
        self.log.drain(..excess);
        excess
    }

    pub(crate) fn message_count(&self) -> usize {
        self.log.len()
    }

    /// The newest `limit` messages after `since` that `user_id` may see, oldest first.
    pub(crate) fn visible_since(
        &self,
        user_id: &str,
        since: i64,
        limit: usize,
    ) -> Vec<RelayMessage> {
        let mut matches: Vec<RelayMessage> = self
            .log
            .iter()
            .rev()
            .filter(|m| m.timestamp > since && m.is_visible_to(user_id))
            .take(limit)
            .cloned()
            .collect();
        matches.reverse();
        matches
    }
}
