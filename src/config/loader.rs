// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration loading from files and the environment.

use std::path::Path;

use crate::error::ConfigError;

use super::types::IntegrationConfig;

/// Config file names to search for (in order).
pub const CONFIG_FILES: &[&str] = &["tracehook.json", "tracehook.yaml", "tracehook.yml"];

/// Environment variable overriding the service name.
pub const ENV_SERVICE: &str = "TRACEHOOK_GRAPHQL_SERVICE";

/// Environment variable enabling analytics sampling.
pub const ENV_ANALYTICS_ENABLED: &str = "TRACEHOOK_GRAPHQL_ANALYTICS_ENABLED";

/// Environment variable setting the analytics sample rate.
pub const ENV_ANALYTICS_SAMPLE_RATE: &str = "TRACEHOOK_GRAPHQL_ANALYTICS_SAMPLE_RATE";

/// Load a configuration file (JSON or YAML).
pub fn load_config_file(path: &Path) -> Result<IntegrationConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(ConfigError::from),
        _ => serde_json::from_str(&content).map_err(ConfigError::from),
    }
}

/// Load the first config file found in a directory.
pub fn load_workspace_config(root: &Path) -> Result<Option<IntegrationConfig>, ConfigError> {
    for filename in CONFIG_FILES {
        let path = root.join(filename);
        if path.exists() {
            return load_config_file(&path).map(Some);
        }
    }
    Ok(None)
}

/// Read configuration from the process environment.
pub fn load_env_config() -> Result<IntegrationConfig, ConfigError> {
    env_config_from(|key| std::env::var(key).ok())
}

/// Read configuration through an arbitrary variable lookup.
pub fn env_config_from<F>(lookup: F) -> Result<IntegrationConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let service = lookup(ENV_SERVICE).filter(|s| !s.trim().is_empty());

    let analytics_enabled = lookup(ENV_ANALYTICS_ENABLED)
        .map(|raw| parse_bool(ENV_ANALYTICS_ENABLED, &raw))
        .transpose()?;

    let analytics_sample_rate = lookup(ENV_ANALYTICS_SAMPLE_RATE)
        .map(|raw| {
            raw.trim()
                .parse::<f64>()
                .map_err(|e| ConfigError::invalid(ENV_ANALYTICS_SAMPLE_RATE, e.to_string()))
        })
        .transpose()?;

    Ok(IntegrationConfig {
        service,
        analytics_enabled,
        analytics_sample_rate,
        error_type: None,
    })
}

fn parse_bool(field: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::invalid(field, format!("expected a boolean, got '{}'", other))),
    }
}
