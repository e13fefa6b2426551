// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Collaborators the core consumes (peer connections, reporting sinks) and the
//! base lifecycle trait for long-running adapters. All use `#[async_trait]` for
//! dynamic dispatch compatibility.

pub mod adapter;
pub mod peer;
pub mod sink;

pub use adapter::PluginAdapter;
pub use peer::PeerConnection;
pub use sink::QualitySink;
