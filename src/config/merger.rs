// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration merging.
//!
//! Handles merging configurations from different sources with proper precedence.

use crate::error::ConfigError;

use super::types::{IntegrationConfig, IntegrationSettings};

/// Default configuration values.
pub fn default_settings() -> IntegrationSettings {
    IntegrationSettings::default()
}

/// Merge configurations with precedence and validate the result.
///
/// Precedence (highest to lowest):
/// 1. Environment
/// 2. Config file
/// 3. Default values
pub fn merge_config(
    file: Option<IntegrationConfig>,
    env: IntegrationConfig,
) -> Result<IntegrationSettings, ConfigError> {
    let mut result = default_settings();

    if let Some(config) = file {
        apply_config(&mut result, &config);
    }
    apply_config(&mut result, &env);

    validate(&result)?;
    Ok(result)
}

fn apply_config(result: &mut IntegrationSettings, config: &IntegrationConfig) {
    if let Some(ref service) = config.service {
        result.service = service.clone();
    }
    if let Some(enabled) = config.analytics_enabled {
        result.analytics_enabled = enabled;
    }
    if let Some(rate) = config.analytics_sample_rate {
        result.analytics_sample_rate = Some(rate);
    }
    if let Some(ref error_type) = config.error_type {
        result.error_type = error_type.clone();
    }
}

fn validate(settings: &IntegrationSettings) -> Result<(), ConfigError> {
    if settings.service.trim().is_empty() {
        return Err(ConfigError::invalid("service", "must not be empty"));
    }
    if let Some(rate) = settings.analytics_sample_rate {
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::invalid(
                "analyticsSampleRate",
                format!("{} is outside [0, 1]", rate),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_nothing_set() {
        let settings = merge_config(None, IntegrationConfig::default()).unwrap();
        assert_eq!(settings, default_settings());
    }

    #[test]
    fn test_env_overrides_file() {
        let file = IntegrationConfig {
            service: Some("from-file".to_string()),
            analytics_enabled: Some(true),
            ..Default::default()
        };
        let env = IntegrationConfig {
            service: Some("from-env".to_string()),
            ..Default::default()
        };

        let settings = merge_config(Some(file), env).unwrap();
        assert_eq!(settings.service, "from-env");
        assert!(settings.analytics_enabled);
    }

    #[test]
    fn test_error_type_override() {
        let file = IntegrationConfig {
            error_type: Some("ValidationError".to_string()),
            ..Default::default()
        };
        let settings = merge_config(Some(file), IntegrationConfig::default()).unwrap();
        assert_eq!(settings.error_type, "ValidationError");
    }

    #[test]
    fn test_rejects_out_of_range_rate() {
        let env = IntegrationConfig {
            analytics_sample_rate: Some(1.5),
            ..Default::default()
        };
        let err = merge_config(None, env).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "analyticsSampleRate"
        ));
    }

    #[test]
    fn test_rejects_empty_service() {
        let file = IntegrationConfig {
            service: Some(String::new()),
            ..Default::default()
        };
        assert!(merge_config(Some(file), IntegrationConfig::default()).is_err());
    }
}
