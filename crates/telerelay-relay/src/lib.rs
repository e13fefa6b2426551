// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory signaling relay for WebRTC call setup.
//!
//! Peers join a room, post typed signals (session descriptions, ICE
//! candidates, presence and call-control records) and short-poll for the ones
//! addressed to them or broadcast to the room. Rooms keep a bounded log and at
//! most one pending call invitation, which is replayed to a callee who joins
//! after the call was placed.

pub mod clock;
pub mod message;
pub mod relay;
pub mod room;
pub mod signal;
pub mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use message::{OutgoingMessage, RelayMessage};
pub use relay::{
    require_fields, CleanupStats, JoinOutcome, PollBatch, Relay, RelaySettings, RelayStats,
    RoomSnapshot,
};
pub use room::ParticipantInfo;
pub use signal::{CallDetails, IceCandidate, IcePayload, Presence, SessionDescription, Signal};
pub use sweeper::spawn_cleanup;
