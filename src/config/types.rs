// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration type definitions.
//!
//! Defines the partial configuration read from files and the environment,
//! and the resolved settings handed to the interception engine.

use serde::{Deserialize, Serialize};

/// Default service name for GraphQL spans.
pub const DEFAULT_SERVICE: &str = "graphql";

/// Default error type attached to spans whose result carries errors.
pub const DEFAULT_ERROR_TYPE: &str = "GraphQLError";

/// Integration configuration as written in a config file.
///
/// Every field is optional; unset fields fall back to lower-precedence
/// sources and finally to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationConfig {
    /// Service name reported on spans
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,

    /// Whether analytics sampling tags are attached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics_enabled: Option<bool>,

    /// Analytics sample rate in [0, 1]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics_sample_rate: Option<f64>,

    /// Error type used for errors found in call results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

/// Fully resolved settings for one integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationSettings {
    /// Integration name, also the default `component` tag.
    pub integration: String,
    pub service: String,
    pub analytics_enabled: bool,
    pub analytics_sample_rate: Option<f64>,
    pub error_type: String,
}

impl IntegrationSettings {
    /// Sample rate to tag spans with, if analytics is enabled.
    ///
    /// An enabled integration without an explicit rate samples everything.
    pub fn analytics_sample_rate(&self) -> Option<f64> {
        if self.analytics_enabled {
            Some(self.analytics_sample_rate.unwrap_or(1.0))
        } else {
            None
        }
    }

    /// Set the service name.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        Self {
            integration: "graphql".to_string(),
            service: DEFAULT_SERVICE.to_string(),
            analytics_enabled: false,
            analytics_sample_rate: None,
            error_type: DEFAULT_ERROR_TYPE.to_string(),
        }
    }
}
