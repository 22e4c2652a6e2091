// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Telemetry payloads sent periodically to the collection backend.
//!
//! [`TelemetryPayload`] is a closed set: every variant maps to exactly one
//! request type and builds its own body.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::inventory::{Dependency, DependencyInventory};
use super::series::MetricSeries;

/// Metrics namespace for tracer-generated series.
pub const METRICS_NAMESPACE: &str = "tracers";

/// Language reported in metrics payloads.
pub const LIB_LANGUAGE: &str = "rust";

/// State of one instrumented library after an install attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integration {
    pub name: String,
    pub version: String,
    pub enabled: bool,
    pub auto_enabled: bool,
    pub compatible: bool,
    pub error: String,
}

impl Integration {
    /// An integration that installed cleanly.
    pub fn enabled(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            enabled: true,
            auto_enabled: false,
            compatible: true,
            error: String::new(),
        }
    }

    /// An integration that could not be enabled.
    pub fn failed(
        name: impl Into<String>,
        version: impl Into<String>,
        compatible: bool,
        error: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            enabled: false,
            auto_enabled: false,
            compatible,
            error: error.into(),
        }
    }
}

/// Metric series packaged for one flush interval.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsBatch {
    pub namespace: String,
    pub lib_language: String,
    pub lib_version: String,
    series: Vec<MetricSeries>,
}

impl MetricsBatch {
    pub fn series(&self) -> &[MetricSeries] {
        &self.series
    }
}

/// Body of a telemetry request.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryPayload {
    /// Sent after instrumentation of a library was attempted.
    IntegrationsChanged(Vec<Integration>),
    /// Sent once when the application starts.
    AppStarted { dependencies: Vec<Dependency> },
    /// Periodic metrics.
    GenerateMetrics(MetricsBatch),
    /// Sent when the application instance terminates.
    AppClosed,
}

impl TelemetryPayload {
    /// Snapshot the inventory now. Later inventory changes are not reflected.
    pub fn app_started(inventory: &dyn DependencyInventory) -> Self {
        Self::AppStarted {
            dependencies: inventory.dependencies(),
        }
    }

    /// Package the series for one flush. The batch is closed to additions.
    pub fn generate_metrics(series: Vec<MetricSeries>) -> Self {
        Self::GenerateMetrics(MetricsBatch {
            namespace: METRICS_NAMESPACE.to_string(),
            lib_language: LIB_LANGUAGE.to_string(),
            lib_version: crate::VERSION.to_string(),
            series,
        })
    }

    pub fn integrations_changed(integrations: Vec<Integration>) -> Self {
        Self::IntegrationsChanged(integrations)
    }

    /// Request type understood by the intake.
    pub fn request_type(&self) -> &'static str {
        match self {
            Self::IntegrationsChanged(_) => "app-integrations-changed",
            Self::AppStarted { .. } => "app-started",
            Self::GenerateMetrics(_) => "generate-metrics",
            Self::AppClosed => "app-closed",
        }
    }

    /// Serializable body of the request.
    pub fn to_dict(&self) -> Value {
        match self {
            Self::IntegrationsChanged(integrations) => json!({ "integrations": integrations }),
            Self::AppStarted { dependencies } => json!({ "dependencies": dependencies }),
            Self::GenerateMetrics(batch) => json!({
                "namespace": batch.namespace,
                "lib_language": batch.lib_language,
                "lib_version": batch.lib_version,
                "series": batch
                    .series
                    .iter()
                    .map(MetricSeries::to_payload_body)
                    .collect::<Vec<_>>(),
            }),
            Self::AppClosed => json!({}),
        }
    }
}
