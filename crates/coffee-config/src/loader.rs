// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `/etc/coffee/coffee.toml`, then `~/.config/coffee/coffee.toml`,
//! then `./coffee.toml`, with `COFFEE_*` environment variables applied last.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CoffeeConfig;

/// Top-level config sections. Used to split `COFFEE_<SECTION>_<KEY>` env vars.
const SECTIONS: &[&str] = &["service", "gateway", "storage", "machine", "prometheus"];

/// Path of the system-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/coffee/coffee.toml";

/// Name of the local config file, resolved against the working directory.
pub const LOCAL_CONFIG_FILE: &str = "coffee.toml";

/// Path of the per-user config file, if a config directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("coffee").join("coffee.toml"))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/coffee/coffee.toml`
/// 3. `~/.config/coffee/coffee.toml`
/// 4. `./coffee.toml`
/// 5. `COFFEE_*` environment variables
pub fn load_config() -> Result<CoffeeConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<CoffeeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CoffeeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CoffeeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CoffeeConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the full layered Figment without extracting it.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(CoffeeConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Map a lowercased, prefix-stripped env key to its dotted config path.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `gateway_bearer_token` maps to `gateway.bearer_token`. Keys with no known
/// section are returned unchanged and rejected later as unknown fields.
pub fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section)
            && let Some(field) = rest.strip_prefix('_')
        {
            return format!("{section}.{field}");
        }
    }
    key.to_string()
}

fn env_provider() -> Env {
    Env::prefixed("COFFEE_").map(|key| map_env_key(key.as_str()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_on_first_section_underscore() {
        assert_eq!(map_env_key("gateway_bearer_token"), "gateway.bearer_token");
        assert_eq!(map_env_key("storage_database_path"), "storage.database_path");
        assert_eq!(
            map_env_key("machine_start_powered_on"),
            "machine.start_powered_on"
        );
        assert_eq!(map_env_key("service_log_level"), "service.log_level");
        assert_eq!(map_env_key("prometheus_enabled"), "prometheus.enabled");
    }

    #[test]
    fn unknown_env_keys_pass_through() {
        assert_eq!(map_env_key("brewing_speed"), "brewing_speed");
        assert_eq!(map_env_key("gateway"), "gateway");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Figment::new()
            .merge(Serialized::defaults(CoffeeConfig::default()))
            .merge(Toml::file("/nonexistent/coffee/coffee.toml"))
            .extract::<CoffeeConfig>()
            .expect("missing file is skipped");
        assert_eq!(config.gateway.port, 5000);
    }
}
