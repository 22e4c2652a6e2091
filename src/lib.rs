// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Tracehook - version-aware tracing for GraphQL engines.
//!
//! Tracehook wraps the query, parse, validate, execute, and field resolution
//! call sites of a GraphQL engine in spans, picking the right call site for
//! each release of the engine, and models the telemetry messages a tracer
//! reports about itself.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`error`] - Error types and result aliases
//! - [`config`] - Integration settings from files and environment
//! - [`intercept`] - Call-site registry, interception engine, and span adapter
//! - [`telemetry`] - Tracer seam, metric series, and telemetry payloads
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tracehook::config::load_config;
//! use tracehook::intercept::InterceptionEngine;
//! use tracehook::telemetry::TracingTracer;
//!
//! let settings = load_config(".".as_ref())?;
//! let engine = InterceptionEngine::graphql(Arc::new(TracingTracer::new()), settings);
//! let report = engine.install(&library)?;
//! ```

pub mod config;
pub mod error;
pub mod intercept;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{load_config, IntegrationSettings};
pub use error::{
    CallError, ConfigError, InstallError, RegistryError, Result, SeriesError, TransportError,
    VersionError,
};
pub use intercept::{
    CallArgs, CallSiteRegistry, HookTable, InstallReport, InterceptionEngine, OperationKind,
    PatchTarget, Version,
};
pub use telemetry::{
    MetricKind, MetricSeries, MetricsAggregator, TelemetryClient, TelemetryPayload, Tracer,
    TracingTracer,
};

/// Crate version, reported as the tracer version in telemetry.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(Version::parse(VERSION).is_ok());
    }
}
