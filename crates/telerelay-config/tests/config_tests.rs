// SPDX-FileCopyrightText: 2026 Telerelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the telerelay configuration system.

use telerelay_config::diagnostic::ConfigError;
use telerelay_config::model::TelerelayConfig;
use telerelay_config::{load_and_validate_str, load_config_from_path, load_config_from_str};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[log]
level = "debug"

[gateway]
host = "0.0.0.0"
port = 9000
service_name = "clinic-signaling"
cors_max_age_secs = 600

[relay]
max_messages_per_room = 50
poll_batch_limit = 10
heartbeat_timeout_secs = 45
cleanup_interval_secs = 15
room_idle_timeout_secs = 120
callee_role = "client"

[monitor]
sample_interval_ms = 500
report_interval_ms = 2000
auto_report = false

[client]
signaling_url = "https://relay.example.org"
poll_interval_ms = 750
ping_interval_ms = 5000
request_timeout_secs = 3

[prometheus]
enabled = true
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.log.level, "debug");
    assert_eq!(config.gateway.host, "0.0.0.0");
    assert_eq!(config.gateway.port, 9000);
    assert_eq!(config.gateway.service_name, "clinic-signaling");
    assert_eq!(config.gateway.cors_max_age_secs, 600);
    assert_eq!(config.relay.max_messages_per_room, 50);
    assert_eq!(config.relay.poll_batch_limit, 10);
    assert_eq!(config.relay.heartbeat_timeout_secs, 45);
    assert_eq!(config.relay.room_idle_timeout_secs, 120);
    assert_eq!(config.relay.callee_role, "client");
    assert_eq!(config.monitor.sample_interval_ms, 500);
    assert!(!config.monitor.auto_report);
    assert_eq!(config.client.signaling_url, "https://relay.example.org");
    assert_eq!(config.client.request_timeout_secs, 3);
    assert!(config.prometheus.enabled);
}

#[test]
fn empty_toml_yields_defaults() {
    let config = load_config_from_str("").unwrap();
    assert_eq!(config.log.level, "info");
    assert_eq!(config.gateway.host, "127.0.0.1");
    assert_eq!(config.gateway.port, 8787);
    assert_eq!(config.gateway.service_name, "telerelay-http-signaling");
    assert_eq!(config.gateway.cors_max_age_secs, 86_400);
    assert_eq!(config.relay.max_messages_per_room, 100);
    assert_eq!(config.relay.poll_batch_limit, 20);
    assert_eq!(config.relay.heartbeat_timeout_secs, 30);
    assert_eq!(config.relay.cleanup_interval_secs, 30);
    assert_eq!(config.relay.room_idle_timeout_secs, 3600);
    assert_eq!(config.relay.callee_role, "patient");
    assert_eq!(config.monitor.sample_interval_ms, 1000);
    assert_eq!(config.monitor.report_interval_ms, 5000);
    assert!(config.monitor.auto_report);
    assert_eq!(config.client.poll_interval_ms, 1000);
    assert_eq!(config.client.ping_interval_ms, 10_000);
    assert!(!config.prometheus.enabled);
}

#[test]
fn partial_section_keeps_other_defaults() {
    let config = load_config_from_str("[relay]\npoll_batch_limit = 5\n").unwrap();
    assert_eq!(config.relay.poll_batch_limit, 5);
    assert_eq!(config.relay.max_messages_per_room, 100);
    assert_eq!(config.gateway.port, 8787);
}

#[test]
fn unknown_key_gets_suggestion_and_span() {
    let toml = "[relay]\npoll_batch_limt = 5\n";
    let errors = load_and_validate_str(toml).unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            valid_keys,
            span,
            ..
        } => {
            assert_eq!(key, "poll_batch_limt");
            assert_eq!(suggestion.as_deref(), Some("poll_batch_limit"));
            assert!(valid_keys.contains("max_messages_per_room"));
            let span = span.expect("inline source should be located");
            assert_eq!(span.offset(), toml.find("poll_batch_limt").unwrap());
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[storage]\npath = \"x\"\n").unwrap_err();
    assert!(matches!(&errors[0], ConfigError::UnknownKey { key, .. } if key == "storage"));
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[gateway]\nport = \"eighty\"\n").unwrap_err();
    assert!(matches!(&errors[0], ConfigError::InvalidType { key, .. } if key.contains("port")));
}

#[test]
fn validation_errors_surface_through_load() {
    let toml = "[relay]\nmax_messages_per_room = 10\npoll_batch_limit = 20\n";
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(errors
        .iter()
        .all(|e| matches!(e, ConfigError::Validation { .. })));
    assert!(errors
        .iter()
        .any(|e| e.to_string().contains("must not exceed")));
}

#[test]
fn env_overrides_file_values() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "telerelay.toml",
            "[relay]\npoll_batch_limit = 5\ncallee_role = \"client\"\n",
        )?;
        jail.set_env("TELERELAY_RELAY_POLL_BATCH_LIMIT", "7");
        jail.set_env("TELERELAY_GATEWAY_PORT", "9100");
        jail.set_env("TELERELAY_PROMETHEUS_ENABLED", "true");

        let config = load_config_from_path(std::path::Path::new("telerelay.toml"))?;
        assert_eq!(config.relay.poll_batch_limit, 7);
        assert_eq!(config.relay.callee_role, "client");
        assert_eq!(config.gateway.port, 9100);
        assert!(config.prometheus.enabled);
        Ok(())
    });
}

#[test]
fn config_serializes_back_to_toml() {
    let rendered = toml::to_string_pretty(&TelerelayConfig::default()).unwrap();
    assert!(rendered.contains("[relay]"));
    assert!(rendered.contains("callee_role = \"patient\""));
    let reparsed = load_config_from_str(&rendered).unwrap();
    assert_eq!(reparsed.gateway.port, 8787);
}
