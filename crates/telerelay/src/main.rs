// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telerelay - HTTP short-poll WebRTC signaling relay.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod probe;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use telerelay_config::{ConfigError, TelerelayConfig};

/// Telerelay - HTTP short-poll WebRTC signaling relay.
#[derive(Parser, Debug)]
#[command(name = "telerelay", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG search path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the signaling gateway until interrupted.
    Serve,
    /// Print the effective configuration as TOML.
    Config,
    /// Run a join/room/leave round trip against a running relay.
    Probe {
        /// Relay origin. Defaults to `client.signaling_url`.
        #[arg(long)]
        url: Option<String>,
        /// Room to probe.
        #[arg(long, default_value = "telerelay-probe")]
        room: String,
    },
}

fn load(path: Option<&PathBuf>) -> Result<TelerelayConfig, Vec<ConfigError>> {
    match path {
        Some(path) => telerelay_config::load_and_validate_path(path),
        None => telerelay_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            telerelay_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => {
                print!("{rendered}");
                Ok(())
            }
            Err(e) => Err(telerelay_core::TelerelayError::Config(format!(
                "failed to render configuration: {e}"
            ))),
        },
        Some(Commands::Probe { url, room }) => probe::run_probe(&config, url, &room).await,
        None => {
            println!("telerelay: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("telerelay: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_parses_probe_arguments() {
        let cli = Cli::parse_from([
            "telerelay",
            "--config",
            "/tmp/relay.toml",
            "probe",
            "--url",
            "http://10.0.0.5:8787",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/relay.toml")));
        match cli.command {
            Some(Commands::Probe { url, room }) => {
                assert_eq!(url.as_deref(), Some("http://10.0.0.5:8787"));
                assert_eq!(room, "telerelay-probe");
            }
            other => panic!("expected probe, got {other:?}"),
        }
    }

    #[test]
    fn default_config_renders_as_toml() {
        let config = telerelay_config::load_and_validate_str("").unwrap();
        let rendered = toml::to_string_pretty(&config).unwrap();
        assert!(rendered.contains("[gateway]"));
        assert!(rendered.contains("port = 8787"));
    }
}
