// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the telerelay signaling server and quality monitor.
//!
//! TOML files are layered over compiled defaults following the XDG hierarchy,
//! `TELERELAY_*` environment variables override them, unknown keys are rejected,
//! and every error is rendered as a miette diagnostic with a typo suggestion.
//!
//! # Usage
//!
//! ```no_run
//! use telerelay_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("listening on {}:{}", config.gateway.host, config.gateway.port);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::TelerelayConfig;

/// Load from the XDG hierarchy plus env vars, then validate.
pub fn load_and_validate() -> Result<TelerelayConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_toml_sources)
}

/// Load from an explicit TOML string, then validate.
pub fn load_and_validate_str(toml_content: &str) -> Result<TelerelayConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Load from a specific file plus env vars, then validate.
pub fn load_and_validate_path(
    path: &std::path::Path,
) -> Result<TelerelayConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        std::fs::read_to_string(path)
            .map(|content| vec![(path.display().to_string(), content)])
            .unwrap_or_default()
    })
}

fn finish(
    loaded: Result<TelerelayConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<TelerelayConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

/// Read whichever config files exist so error spans can point into them.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut candidates = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("telerelay.toml"));
    }
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("telerelay/telerelay.toml"));
    }
    candidates.push(std::path::PathBuf::from("/etc/telerelay/telerelay.toml"));

    candidates
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
