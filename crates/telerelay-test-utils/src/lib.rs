// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for telerelay integration tests.
//!
//! Provides mock collaborators and an HTTP harness for fast, deterministic
//! tests without a browser or a real WebRTC stack.
//!
//! # Components
//!
//! - [`MockPeerConnection`] - Peer connection replaying scripted stats reports
//! - [`RecordingSink`] - Quality sink that captures every report
//! - [`TestServer`] - Gateway bound to an ephemeral local port

pub mod harness;
pub mod mock_peer;
pub mod mock_sink;

pub use harness::TestServer;
pub use mock_peer::{synthetic_report, MockPeerConnection};
pub use mock_sink::RecordingSink;
