// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the coffee configuration system.

use coffee_config::diagnostic::ConfigError;
use coffee_config::model::CoffeeConfig;
use coffee_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[service]
name = "office-machine"
log_level = "debug"

[gateway]
host = "0.0.0.0"
port = 8080
bearer_token = "s3cret"
drain_timeout_secs = 5

[storage]
database_path = "/tmp/coffee-test.db"
wal_mode = false

[machine]
alert_probability = 0.0
brew_duration_secs = 2
descale_duration_secs = 3
start_powered_on = true
rng_seed = 42

[prometheus]
enabled = false
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.service.name, "office-machine");
    assert_eq!(config.service.log_level, "debug");
    assert_eq!(config.gateway.host, "0.0.0.0");
    assert_eq!(config.gateway.port, 8080);
    assert_eq!(config.gateway.bearer_token.as_deref(), Some("s3cret"));
    assert_eq!(config.gateway.drain_timeout_secs, 5);
    assert_eq!(config.storage.database_path, "/tmp/coffee-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.machine.alert_probability, 0.0);
    assert_eq!(config.machine.brew_duration_secs, 2);
    assert_eq!(config.machine.descale_duration_secs, 3);
    assert!(config.machine.start_powered_on);
    assert_eq!(config.machine.rng_seed, Some(42));
    assert!(!config.prometheus.enabled);
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config.service.name, "coffee");
    assert_eq!(config.service.log_level, "info");
    assert_eq!(config.gateway.host, "127.0.0.1");
    assert_eq!(config.gateway.port, 5000);
    assert!(config.gateway.bearer_token.is_none());
    assert!(config.storage.wal_mode);
    assert!(config.storage.database_path.ends_with("coffee.db"));
    assert_eq!(config.machine.alert_probability, 0.10);
    assert_eq!(config.machine.brew_duration_secs, 11);
    assert_eq!(config.machine.descale_duration_secs, 31);
    assert!(!config.machine.start_powered_on);
    assert!(config.machine.rng_seed.is_none());
    assert!(config.prometheus.enabled);
}

#[test]
fn dotted_override_wins_over_toml() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: CoffeeConfig = Figment::new()
        .merge(Serialized::defaults(CoffeeConfig::default()))
        .merge(Toml::string("[gateway]\nbearer_token = \"from-file\"\n"))
        .merge(("gateway.bearer_token", "from-env"))
        .extract()
        .expect("should merge override");

    assert_eq!(config.gateway.bearer_token.as_deref(), Some("from-env"));
}

#[test]
fn unknown_top_level_section_rejected() {
    let err = load_config_from_str("[grinder]\ncoarse = true\n")
        .expect_err("unknown section should be rejected");
    let msg = err.to_string();
    assert!(
        msg.contains("unknown field") || msg.contains("grinder"),
        "got: {msg}"
    );
}

#[test]
fn unknown_key_reports_suggestion_and_valid_keys() {
    let toml = "[machine]\nbrew_duraton_secs = 5\n";

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "brew_duraton_secs"
                && suggestion.as_deref() == Some("brew_duration_secs")
                && valid_keys.contains("alert_probability")
        })
    });
    assert!(found, "expected UnknownKey with suggestion, got: {errors:?}");
}

#[test]
fn invalid_type_reported() {
    let errors = load_and_validate_str("[gateway]\nport = \"eighty\"\n")
        .expect_err("string port should fail");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("port"))),
        "got: {errors:?}"
    );
}

#[test]
fn validation_errors_surface_through_loader() {
    let errors = load_and_validate_str("[machine]\nalert_probability = 2.0\n")
        .expect_err("probability above 1 should fail");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("alert_probability"))
    ));
}

#[test]
fn explicit_path_loads_and_reports_errors() {
    let dir = std::env::temp_dir().join(format!("coffee-config-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("coffee.toml");

    std::fs::write(&path, "[service]\nname = \"path-test\"\n").expect("write config");
    let config = load_and_validate_path(&path).expect("valid file");
    assert_eq!(config.service.name, "path-test");

    std::fs::write(&path, "[service]\nnaem = \"oops\"\n").expect("write config");
    let errors = load_and_validate_path(&path).expect_err("typo should fail");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, .. }
            if key == "naem" && suggestion.as_deref() == Some("name"))
    });
    assert!(found, "got: {errors:?}");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "prot".to_string(),
        suggestion: Some("port".to_string()),
        valid_keys: "host, port, bearer_token, drain_timeout_secs".to_string(),
        span: None,
        src: None,
    };

    assert!(error.code().is_some());
    let help = error.help().map(|h| h.to_string()).unwrap_or_default();
    assert!(help.contains("did you mean `port`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render");
    assert!(buf.contains("prot"));
}
