// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for tracehook.
//!
//! This module provides strongly-typed errors for the interception engine and
//! the telemetry model, using `thiserror` for ergonomic error definitions and
//! `anyhow` for error propagation in application glue.

use thiserror::Error;

use crate::intercept::OperationKind;
use crate::telemetry::MetricKind;

/// Errors that can occur while parsing a library version string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Empty version string")]
    Empty,

    #[error("Invalid version: {0}")]
    Invalid(String),
}

/// Errors produced by the call-site registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("No call site registered for {operation} at version {version}")]
    NotFound {
        operation: OperationKind,
        version: String,
    },

    #[error("Overlapping version ranges for {operation}: {first} and {second}")]
    OverlappingRanges {
        operation: OperationKind,
        first: String,
        second: String,
    },
}

impl RegistryError {
    /// Create a not-found error for an operation and version.
    pub fn not_found(operation: OperationKind, version: impl ToString) -> Self {
        Self::NotFound {
            operation,
            version: version.to_string(),
        }
    }
}

/// Errors that can occur while installing wrappers around call sites.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstallError {
    #[error("Interception already installed for {0}")]
    AlreadyInstalled(String),

    #[error("Unsupported {library} version {version} (minimum {minimum})")]
    UnsupportedVersion {
        library: String,
        version: String,
        minimum: String,
    },

    #[error("Call site {module}.{symbol} not found for {operation}")]
    MissingCallSite {
        operation: OperationKind,
        module: String,
        symbol: String,
    },
}

impl InstallError {
    /// Create a missing call site error.
    pub fn missing(
        operation: OperationKind,
        module: impl Into<String>,
        symbol: impl Into<String>,
    ) -> Self {
        Self::MissingCallSite {
            operation,
            module: module.into(),
            symbol: symbol.into(),
        }
    }
}

/// Errors that can occur when merging metric series.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
    #[error("Metric {metric} has conflicting kinds: {existing} vs {incoming}")]
    ConflictingSeriesKind {
        metric: String,
        existing: MetricKind,
        incoming: MetricKind,
    },

    #[error("Metric {metric} has conflicting intervals: {existing:?} vs {incoming:?}")]
    ConflictingInterval {
        metric: String,
        existing: Option<u64>,
        incoming: Option<u64>,
    },
}

/// A failure raised by the instrumented library itself.
///
/// Wrappers never construct, alter, or swallow these: whatever the original
/// hook returns is handed back to the caller as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct CallError {
    pub kind: String,
    pub message: String,
}

impl CallError {
    /// Create a library error with a kind and message.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid config format: {0}")]
    InvalidFormat(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("IO error reading config: {0}")]
    IoError(String),

    #[error("YAML parsing error: {0}")]
    YamlError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),
}

impl ConfigError {
    /// Create an invalid value error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::IoError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::YamlError(err.to_string())
    }
}

/// Errors reported by a telemetry transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Transport unavailable: {0}")]
    Unavailable(String),

    #[error("Request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TransportError {
    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Unavailable(_) => true,
            Self::Rejected { status, .. } => *status == 429 || *status >= 500,
            Self::Serialization(_) => false,
        }
    }
}

/// Result alias for setup glue such as [`init_logging`](crate::telemetry::init_logging).
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_not_found_display() {
        let err = RegistryError::not_found(OperationKind::Resolve, "1.9.0");
        let display = err.to_string();
        assert!(display.contains("resolve"));
        assert!(display.contains("1.9.0"));
    }

    #[test]
    fn test_install_error_missing() {
        let err = InstallError::missing(OperationKind::Parse, "graphql.graphql", "parse");
        match &err {
            InstallError::MissingCallSite { module, symbol, .. } => {
                assert_eq!(module, "graphql.graphql");
                assert_eq!(symbol, "parse");
            }
            _ => panic!("Expected MissingCallSite"),
        }
        assert!(err.to_string().contains("graphql.graphql.parse"));
    }

    #[test]
    fn test_call_error_display() {
        let err = CallError::new("GraphQLError", "Syntax Error");
        assert_eq!(err.to_string(), "GraphQLError: Syntax Error");
    }

    #[test]
    fn test_config_error_from_json() {
        let result: std::result::Result<serde_json::Value, _> =
            serde_json::from_str("invalid json");
        let json_err = result.unwrap_err();
        let config_err: ConfigError = json_err.into();
        assert!(matches!(config_err, ConfigError::JsonError(_)));
    }

    #[test]
    fn test_config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let config_err: ConfigError = io_err.into();
        assert!(matches!(config_err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_transport_error_retryable() {
        assert!(TransportError::Unavailable("down".to_string()).is_retryable());
        assert!(TransportError::Rejected {
            status: 503,
            message: "busy".to_string()
        }
        .is_retryable());
        assert!(!TransportError::Rejected {
            status: 400,
            message: "bad".to_string()
        }
        .is_retryable());
        assert!(!TransportError::Serialization("nan".to_string()).is_retryable());
    }

    #[test]
    fn test_series_error_display() {
        let err = SeriesError::ConflictingSeriesKind {
            metric: "spans_created".to_string(),
            existing: MetricKind::Count,
            incoming: MetricKind::Gauge,
        };
        let display = format!("{}", err);
        assert!(display.contains("count"));
        assert!(display.contains("gauge"));
    }
}
