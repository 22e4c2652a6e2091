// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Spans, metrics, and the telemetry payload model.
//!
//! This module provides the observability side of tracehook:
//!
//! - **Spans**: the [`Tracer`] seam the interception engine opens spans through
//! - **Metrics**: [`MetricSeries`] and the per-interval [`MetricsAggregator`]
//! - **Payloads**: [`TelemetryPayload`] messages and the [`TelemetryClient`] envelope
//! - **Logging**: [`init_logging`] for the crate's own diagnostics
//!
//! # Usage
//!
//! ```rust,ignore
//! use tracehook::telemetry::{init_logging, LogConfig, MetricsAggregator};
//!
//! init_logging(&LogConfig::with_spans())?;
//! let aggregator = MetricsAggregator::new();
//! // ... record series from any thread ...
//! if let Some(payload) = aggregator.flush() {
//!     client.send(payload)?;
//! }
//! ```

pub mod aggregator;
pub mod client;
mod init;
pub mod inventory;
pub mod payload;
pub mod recording;
pub mod series;
pub mod spans;

pub use aggregator::MetricsAggregator;
pub use client::{RuntimeId, TelemetryClient, TelemetryRequest, Transport, API_VERSION};
pub use init::{init_logging, LogConfig, SPAN_TARGET};
pub use inventory::{Dependency, DependencyInventory, StaticInventory};
pub use payload::{Integration, MetricsBatch, TelemetryPayload};
pub use recording::{FinishedSpan, RecordingTracer, SpanErrorFields};
pub use series::{MetricKind, MetricSeries, METRIC_PREFIX};
pub use spans::{ActiveSpan, SpanKind, SpanRequest, TagValue, Tracer, TracingTracer};
