// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration module for tracehook.
//!
//! Handles loading and merging of integration settings from:
//! - A config file: tracehook.json, tracehook.yaml or tracehook.yml
//! - Environment variables: TRACEHOOK_GRAPHQL_*
//!
//! Configuration is merged with precedence (environment > file > defaults).

mod loader;
mod merger;
mod types;

pub use loader::{
    env_config_from, load_config_file, load_env_config, load_workspace_config, CONFIG_FILES,
    ENV_ANALYTICS_ENABLED, ENV_ANALYTICS_SAMPLE_RATE, ENV_SERVICE,
};
pub use merger::{default_settings, merge_config};
pub use types::{IntegrationConfig, IntegrationSettings, DEFAULT_ERROR_TYPE, DEFAULT_SERVICE};

use crate::error::ConfigError;
use std::path::Path;

/// Load and merge all configuration sources for a directory.
///
/// This is the main entry point for configuration loading.
pub fn load_config(root: &Path) -> Result<IntegrationSettings, ConfigError> {
    let file = load_workspace_config(root)?;
    let env = load_env_config()?;

    merge_config(file, env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_with_workspace_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("tracehook.json"),
            r#"{"errorType": "ExecutionError"}"#,
        )
        .unwrap();

        let settings = load_config(temp.path()).unwrap();
        assert_eq!(settings.error_type, "ExecutionError");
    }

    #[test]
    fn test_load_config_rejects_bad_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("tracehook.yaml"), "service: [unclosed").unwrap();

        assert!(matches!(
            load_config(temp.path()),
            Err(ConfigError::YamlError(_))
        ));
    }
}
