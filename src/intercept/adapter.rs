// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Span-producing wrapper around a single call site.
//!
//! A wrapped hook is a pure observer: it forwards the caller's arguments
//! untouched and hands back exactly what the original returned. The span is
//! a scoped guard, so it closes on every exit path, including unwinding.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::trace;

use super::classify::{classify, summarize};
use super::registry::{ArgSpec, OperationKind};
use super::target::{CallArgs, CallResult, Hook};
use crate::config::IntegrationSettings;
use crate::telemetry::spans::{
    ActiveSpan, SpanKind, SpanRequest, Tracer, ANALYTICS_SAMPLE_RATE_KEY, COMPONENT_KEY,
    SPAN_MEASURED_KEY,
};
use crate::telemetry::{MetricKind, MetricSeries, MetricsAggregator};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Name of the count series incremented for every span opened.
pub const SPANS_CREATED_METRIC: &str = "spans_created";

/// Collapse whitespace runs (newlines and tabs included) to single spaces and trim.
pub fn normalize_source(source: &str) -> String {
    WHITESPACE.replace_all(source, " ").trim().to_string()
}

/// Source text of a query argument: a raw string or a source object with a `body`.
fn source_text(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s),
        Value::Object(fields) => fields.get("body").and_then(Value::as_str),
        _ => None,
    }
}

/// Name of the first field in a field-definition list.
///
/// A resolution call resolves exactly one field, so later entries are
/// ignored. The name may be a plain string or an AST name node.
fn first_field_name(value: &Value) -> Option<&str> {
    let name = value.as_array()?.first()?.get("name")?;
    match name {
        Value::String(s) => Some(s),
        node => node.get("value").and_then(Value::as_str),
    }
}

struct SpanMetrics {
    aggregator: Arc<MetricsAggregator>,
    host: String,
}

/// Builds traced replacements for call sites of one operation.
pub struct SpanAdapter {
    operation: OperationKind,
    arg: Option<ArgSpec>,
    component: String,
    tracer: Arc<dyn Tracer>,
    settings: Arc<IntegrationSettings>,
    metrics: Option<SpanMetrics>,
}

impl SpanAdapter {
    pub fn new(
        operation: OperationKind,
        arg: Option<ArgSpec>,
        tracer: Arc<dyn Tracer>,
        settings: Arc<IntegrationSettings>,
    ) -> Self {
        Self {
            operation,
            arg,
            component: settings.integration.clone(),
            tracer,
            settings,
            metrics: None,
        }
    }

    /// Set the `component` tag (defaults to the integration name).
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = component.into();
        self
    }

    /// Count every opened span in a `spans_created` series.
    pub fn with_metrics(
        mut self,
        aggregator: Arc<MetricsAggregator>,
        host: impl Into<String>,
    ) -> Self {
        self.metrics = Some(SpanMetrics {
            aggregator,
            host: host.into(),
        });
        self
    }

    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    /// Wrap an original hook. The original is kept as the wrapper's inner target.
    pub fn wrap(self, original: Hook) -> Hook {
        let adapter = Arc::new(self);
        Arc::new(move |args: &CallArgs| adapter.invoke(&original, args))
    }

    /// Resource string for a call.
    ///
    /// Falls back to the operation label whenever the expected argument is
    /// missing or has an unexpected shape.
    pub fn resource(&self, args: &CallArgs) -> String {
        let label = self.operation.label();
        let Some(spec) = self.arg else {
            return label.to_string();
        };
        let Some(value) = args.get(spec.index, spec.name) else {
            trace!(operation = %self.operation, arg = spec.name, "resource argument missing");
            return label.to_string();
        };

        let derived = match self.operation {
            OperationKind::Query => source_text(value).map(normalize_source),
            OperationKind::Resolve => first_field_name(value).map(str::to_string),
            _ => None,
        };
        derived.unwrap_or_else(|| label.to_string())
    }

    fn invoke(&self, original: &Hook, args: &CallArgs) -> CallResult {
        if !self.tracer.is_enabled() {
            return original(args);
        }

        let resource = self.resource(args);
        let mut span = self.tracer.start_span(SpanRequest {
            name: self.operation.label(),
            resource: &resource,
            service: &self.settings.service,
            kind: SpanKind::Web,
        });
        self.init_span(span.as_mut());
        self.record_span_created();

        let result = original(args);

        match &result {
            Ok(value) => {
                if let Some(message) = summarize(&classify(value)) {
                    span.set_error_fields(&self.settings.error_type, &message, "");
                }
            }
            Err(err) => span.set_error_fields(&err.kind, &err.message, ""),
        }
        drop(span);

        result
    }

    fn init_span(&self, span: &mut dyn ActiveSpan) {
        span.set_tag(COMPONENT_KEY, self.component.as_str().into());
        span.set_tag(SPAN_MEASURED_KEY, 1i64.into());
        if let Some(rate) = self.settings.analytics_sample_rate() {
            span.set_tag(ANALYTICS_SAMPLE_RATE_KEY, rate.into());
        }
    }

    fn record_span_created(&self) {
        let Some(metrics) = &self.metrics else {
            return;
        };
        let mut series =
            MetricSeries::new(SPANS_CREATED_METRIC, MetricKind::Count, None, &metrics.host);
        series.add_tag("integration_name", &self.component);
        series.add_point(1.0);
        if let Err(err) = metrics.aggregator.record(series) {
            trace!(error = %err, "dropped span metric");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CallError;
    use crate::intercept::target::hook;
    use crate::telemetry::recording::RecordingTracer;
    use crate::telemetry::TagValue;
    use serde_json::json;

    fn settings() -> Arc<IntegrationSettings> {
        Arc::new(IntegrationSettings::default())
    }

    fn adapter(op: OperationKind, arg: Option<ArgSpec>, tracer: &RecordingTracer) -> SpanAdapter {
        SpanAdapter::new(op, arg, Arc::new(tracer.clone()), settings())
    }

    #[test]
    fn test_normalize_source() {
        assert_eq!(normalize_source("{\n  hello\n}"), "{ hello }");
        assert_eq!(normalize_source("\t query  {\r\n a }  "), "query { a }");
    }

    #[test]
    fn test_query_resource_from_string_and_source_object() {
        let tracer = RecordingTracer::new();
        let adapter = adapter(OperationKind::Query, Some(ArgSpec::new(1, "source")), &tracer);

        let positional = CallArgs::new().arg("schema").arg("{\n  hello\n}");
        assert_eq!(adapter.resource(&positional), "{ hello }");

        let keyword = CallArgs::new()
            .arg("schema")
            .kwarg("source", json!({"body": "query {\n\thello }", "name": "GraphQL request"}));
        assert_eq!(adapter.resource(&keyword), "query { hello }");
    }

    #[test]
    fn test_resolve_resource_uses_first_field() {
        let tracer = RecordingTracer::new();
        let field_nodes = Some(ArgSpec::new(2, "field_nodes"));
        let adapter = adapter(OperationKind::Resolve, field_nodes, &tracer);

        let args = CallArgs::new()
            .arg("ctx")
            .arg("parent")
            .arg(json!([{"name": "hello"}, {"name": "world"}]));
        assert_eq!(adapter.resource(&args), "hello");

        let ast = CallArgs::new().kwarg(
            "field_nodes",
            json!([{"kind": "field", "name": {"kind": "name", "value": "hello"}}]),
        );
        assert_eq!(adapter.resource(&ast), "hello");
    }

    #[test]
    fn test_resource_fallbacks() {
        let tracer = RecordingTracer::new();
        let parse = adapter(OperationKind::Parse, None, &tracer);
        assert_eq!(parse.resource(&CallArgs::new().arg("{ a }")), "parse");

        let field_nodes = Some(ArgSpec::new(2, "field_nodes"));
        let resolve = adapter(OperationKind::Resolve, field_nodes, &tracer);
        assert_eq!(resolve.resource(&CallArgs::new()), "resolve");
        assert_eq!(resolve.resource(&CallArgs::new().kwarg("field_nodes", json!([]))), "resolve");
    }

    #[test]
    fn test_wrap_returns_original_value_and_records_span() {
        let tracer = RecordingTracer::new();
        let wrapped = adapter(OperationKind::Parse, None, &tracer)
            .wrap(hook(|args| Ok(json!({"kind": "document", "input": args.positional}))));

        let args = CallArgs::new().arg("{ hello }");
        let result = wrapped(&args).unwrap();
        assert_eq!(result, json!({"kind": "document", "input": ["{ hello }"]}));

        let spans = tracer.finished();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].name, "parse");
        assert_eq!(spans[0].resource, "parse");
        assert_eq!(spans[0].service, "graphql");
        assert_eq!(spans[0].kind, SpanKind::Web);
        assert_eq!(spans[0].tag(SPAN_MEASURED_KEY), Some(&TagValue::Number(1.0)));
        assert_eq!(spans[0].tag(COMPONENT_KEY), Some(&TagValue::from("graphql")));
        assert_eq!(spans[0].tag(ANALYTICS_SAMPLE_RATE_KEY), None);
        assert!(!spans[0].is_error());
    }

    #[test]
    fn test_wrap_propagates_error_unchanged() {
        let tracer = RecordingTracer::new();
        let wrapped = adapter(OperationKind::Parse, None, &tracer).wrap(hook(|_| {
            Err(CallError::new("GraphQLSyntaxError", "Syntax Error: Unexpected '}'"))
        }));

        let err = wrapped(&CallArgs::new().arg("}")).unwrap_err();
        assert_eq!(err, CallError::new("GraphQLSyntaxError", "Syntax Error: Unexpected '}'"));

        let span = &tracer.finished()[0];
        let error = span.error.as_ref().unwrap();
        assert_eq!(error.kind, "GraphQLSyntaxError");
        assert_eq!(error.message, "Syntax Error: Unexpected '}'");
    }

    #[test]
    fn test_wrap_classifies_errors_in_result() {
        let tracer = RecordingTracer::new();
        let wrapped = adapter(OperationKind::Validate, None, &tracer).wrap(hook(|_| {
            Ok(json!([{"message": "first"}, {"message": "second"}]))
        }));

        let result = wrapped(&CallArgs::new()).unwrap();
        assert_eq!(result.as_array().unwrap().len(), 2);

        let error = tracer.finished()[0].error.clone().unwrap();
        assert_eq!(error.kind, "GraphQLError");
        assert_eq!(error.message, "first\nsecond");
        assert_eq!(error.stack, "");
    }

    #[test]
    fn test_disabled_tracer_skips_span() {
        let tracer = RecordingTracer::new();
        tracer.set_enabled(false);
        let wrapped = adapter(OperationKind::Execute, None, &tracer).wrap(hook(|_| Ok(json!(7))));

        assert_eq!(wrapped(&CallArgs::new()).unwrap(), json!(7));
        assert!(tracer.finished().is_empty());
    }

    #[test]
    fn test_sample_rate_tag() {
        let tracer = RecordingTracer::new();
        let settings = Arc::new(IntegrationSettings {
            analytics_enabled: true,
            analytics_sample_rate: Some(0.5),
            ..IntegrationSettings::default()
        });
        let wrapped =
            SpanAdapter::new(OperationKind::Execute, None, Arc::new(tracer.clone()), settings)
                .wrap(hook(|_| Ok(Value::Null)));
        wrapped(&CallArgs::new()).unwrap();

        assert_eq!(
            tracer.finished()[0].tag(ANALYTICS_SAMPLE_RATE_KEY),
            Some(&TagValue::Number(0.5))
        );
    }

    #[test]
    fn test_span_closed_when_original_panics() {
        let tracer = RecordingTracer::new();
        let wrapped = adapter(OperationKind::Execute, None, &tracer)
            .wrap(hook(|_| panic!("resolver blew up")));

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = wrapped(&CallArgs::new());
        }));
        assert!(outcome.is_err());
        assert_eq!(tracer.named("execute").len(), 1);
    }

    #[test]
    fn test_span_metrics_recorded() {
        let tracer = RecordingTracer::new();
        let aggregator = Arc::new(MetricsAggregator::new());
        let wrapped = adapter(OperationKind::Execute, None, &tracer)
            .with_metrics(Arc::clone(&aggregator), "host-a")
            .wrap(hook(|_| Ok(Value::Null)));

        wrapped(&CallArgs::new()).unwrap();
        wrapped(&CallArgs::new()).unwrap();

        let series = aggregator.get(SPANS_CREATED_METRIC).unwrap();
        assert_eq!(series.points().len(), 2);
        assert_eq!(series.tags().get("integration_name").map(String::as_str), Some("graphql"));
    }
}
