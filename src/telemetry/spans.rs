// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Tracer contract consumed by the interception engine.
//!
//! Span storage and sampling live outside this crate. Wrappers only talk to
//! a [`Tracer`], which hands out scoped [`ActiveSpan`]s that close on drop.
//! [`TracingTracer`] is the default implementation on top of `tracing`.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::{debug, info_span, span::EnteredSpan};

/// Tag marking a span as measured for trace metrics.
pub const SPAN_MEASURED_KEY: &str = "_dd.measured";

/// Tag carrying the analytics sample rate.
pub const ANALYTICS_SAMPLE_RATE_KEY: &str = "_dd1.sr.eausr";

/// Tag naming the instrumented library.
pub const COMPONENT_KEY: &str = "component";

/// Span type. Every intercepted GraphQL call is a web span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    Web,
}

impl SpanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
        }
    }
}

impl fmt::Display for SpanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a span tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TagValue {
    Str(String),
    Number(f64),
    Bool(bool),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<f64> for TagValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for TagValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Parameters for opening a span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanRequest<'a> {
    pub name: &'a str,
    pub resource: &'a str,
    pub service: &'a str,
    pub kind: SpanKind,
}

/// A span that is open until dropped.
pub trait ActiveSpan {
    /// Attach a tag.
    fn set_tag(&mut self, key: &str, value: TagValue);

    /// Mark the span as failed.
    fn set_error_fields(&mut self, kind: &str, message: &str, stack: &str);
}

/// Span factory with an on/off switch.
pub trait Tracer: Send + Sync {
    /// Whether spans should be created at all.
    fn is_enabled(&self) -> bool;

    /// Open a span. It closes when the returned box is dropped.
    fn start_span(&self, request: SpanRequest<'_>) -> Box<dyn ActiveSpan>;
}

/// Tracer emitting `tracing` spans.
///
/// Each span is entered for its whole lifetime, so spans opened by nested
/// library calls become its children in the subscriber.
#[derive(Debug)]
pub struct TracingTracer {
    enabled: AtomicBool,
}

impl TracingTracer {
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
        }
    }

    /// Enable or disable span creation.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }
}

impl Default for TracingTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracer for TracingTracer {
    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    fn start_span(&self, request: SpanRequest<'_>) -> Box<dyn ActiveSpan> {
        let span = info_span!(
            target: "tracehook::span",
            "intercepted",
            otel.name = %request.name,
            resource = %request.resource,
            service = %request.service,
            span.kind = %request.kind,
            component = tracing::field::Empty,
            measured = tracing::field::Empty,
            sample_rate = tracing::field::Empty,
            error = tracing::field::Empty,
            error.kind = tracing::field::Empty,
            error.msg = tracing::field::Empty,
            error.stack = tracing::field::Empty,
        );

        Box::new(TracingSpan {
            entered: span.entered(),
        })
    }
}

struct TracingSpan {
    entered: EnteredSpan,
}

impl ActiveSpan for TracingSpan {
    fn set_tag(&mut self, key: &str, value: TagValue) {
        let span = &self.entered;
        match (key, &value) {
            (SPAN_MEASURED_KEY, _) => {
                span.record("measured", true);
            }
            (ANALYTICS_SAMPLE_RATE_KEY, TagValue::Number(rate)) => {
                span.record("sample_rate", *rate);
            }
            (COMPONENT_KEY, _) => {
                span.record("component", tracing::field::display(&value));
            }
            _ => debug!(parent: &**span, tag = %key, value = %value, "span tag"),
        }
    }

    fn set_error_fields(&mut self, kind: &str, message: &str, stack: &str) {
        let span = &self.entered;
        span.record("error", true);
        span.record("error.kind", kind);
        span.record("error.msg", message);
        span.record("error.stack", stack);
    }
}
