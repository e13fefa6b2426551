// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./telerelay.toml` > `~/.config/telerelay/telerelay.toml`
//! > `/etc/telerelay/telerelay.toml` with environment variable overrides via the
//! `TELERELAY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::TelerelayConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/telerelay/telerelay.toml` (system-wide)
/// 3. `~/.config/telerelay/telerelay.toml` (user XDG config)
/// 4. `./telerelay.toml` (local directory)
/// 5. `TELERELAY_*` environment variables
pub fn load_config() -> Result<TelerelayConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<TelerelayConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TelerelayConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TelerelayConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TelerelayConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TelerelayConfig::default()))
        .merge(Toml::file("/etc/telerelay/telerelay.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("telerelay/telerelay.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("telerelay.toml"))
        .merge(env_provider())
}

/// Top-level config sections, used to split env var names into dotted paths.
const SECTIONS: &[&str] = &["log", "gateway", "relay", "monitor", "client", "prometheus"];

/// Environment provider with explicit section-to-dot mapping.
///
/// Only the first underscore after a known section name becomes a dot:
/// `TELERELAY_RELAY_POLL_BATCH_LIMIT` maps to `relay.poll_batch_limit`, not
/// `relay.poll.batch.limit` as `Env::split("_")` would produce.
fn env_provider() -> Env {
    Env::prefixed("TELERELAY_").map(|key| {
        let key = key.as_str().to_ascii_lowercase();
        SECTIONS
            .iter()
            .find_map(|section| {
                key.strip_prefix(*section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|field| format!("{section}.{field}"))
            })
            .unwrap_or(key)
            .into()
    })
}
