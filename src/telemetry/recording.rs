// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! In-memory tracer that keeps every finished span.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use super::spans::{ActiveSpan, SpanKind, SpanRequest, TagValue, Tracer};

/// Error fields attached to a span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpanErrorFields {
    pub kind: String,
    pub message: String,
    pub stack: String,
}

/// A closed span as seen by [`RecordingTracer`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinishedSpan {
    pub name: String,
    pub resource: String,
    pub service: String,
    pub kind: SpanKind,
    pub tags: BTreeMap<String, TagValue>,
    pub error: Option<SpanErrorFields>,
}

impl FinishedSpan {
    pub fn tag(&self, key: &str) -> Option<&TagValue> {
        self.tags.get(key)
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Tracer that records spans in memory, in the order they close.
#[derive(Debug, Clone)]
pub struct RecordingTracer {
    enabled: Arc<AtomicBool>,
    finished: Arc<Mutex<Vec<FinishedSpan>>>,
}

impl RecordingTracer {
    pub fn new() -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(true)),
            finished: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Snapshot of finished spans.
    pub fn finished(&self) -> Vec<FinishedSpan> {
        self.finished
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return finished spans.
    pub fn take(&self) -> Vec<FinishedSpan> {
        std::mem::take(&mut *self.finished.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Finished spans with a given name.
    pub fn named(&self, name: &str) -> Vec<FinishedSpan> {
        self.finished()
            .into_iter()
            .filter(|span| span.name == name)
            .collect()
    }
}

impl Default for RecordingTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracer for RecordingTracer {
    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    fn start_span(&self, request: SpanRequest<'_>) -> Box<dyn ActiveSpan> {
        Box::new(RecordingSpan {
            span: Some(FinishedSpan {
                name: request.name.to_string(),
                resource: request.resource.to_string(),
                service: request.service.to_string(),
                kind: request.kind,
                tags: BTreeMap::new(),
                error: None,
            }),
            sink: Arc::clone(&self.finished),
        })
    }
}

struct RecordingSpan {
    span: Option<FinishedSpan>,
    sink: Arc<Mutex<Vec<FinishedSpan>>>,
}

impl ActiveSpan for RecordingSpan {
    fn set_tag(&mut self, key: &str, value: TagValue) {
        if let Some(span) = self.span.as_mut() {
            span.tags.insert(key.to_string(), value);
        }
    }

    fn set_error_fields(&mut self, kind: &str, message: &str, stack: &str) {
        if let Some(span) = self.span.as_mut() {
            span.error = Some(SpanErrorFields {
                kind: kind.to_string(),
                message: message.to_string(),
                stack: stack.to_string(),
            });
        }
    }
}

impl Drop for RecordingSpan {
    fn drop(&mut self) {
        if let Some(span) = self.span.take() {
            self.sink
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(span);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str) -> SpanRequest<'_> {
        SpanRequest {
            name,
            resource: name,
            service: "graphql",
            kind: SpanKind::Web,
        }
    }

    #[test]
    fn test_span_recorded_on_drop() {
        let tracer = RecordingTracer::new();
        let mut span = tracer.start_span(request("parse"));
        span.set_tag("component", "graphql".into());
        assert!(tracer.finished().is_empty());

        drop(span);
        let finished = tracer.finished();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].name, "parse");
        assert_eq!(finished[0].tag("component"), Some(&TagValue::from("graphql")));
        assert!(!finished[0].is_error());
    }

    #[test]
    fn test_error_fields() {
        let tracer = RecordingTracer::new();
        let mut span = tracer.start_span(request("execute"));
        span.set_error_fields("GraphQLError", "bad field", "");
        drop(span);

        let error = tracer.finished()[0].error.clone().unwrap();
        assert_eq!(error.kind, "GraphQLError");
        assert_eq!(error.message, "bad field");
    }

    #[test]
    fn test_nested_spans_close_inner_first() {
        let tracer = RecordingTracer::new();
        let outer = tracer.start_span(request("query"));
        let inner = tracer.start_span(request("parse"));
        drop(inner);
        drop(outer);

        let names: Vec<String> = tracer.take().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["parse", "query"]);
        assert!(tracer.finished().is_empty());
    }

    #[test]
    fn test_clones_share_storage() {
        let tracer = RecordingTracer::new();
        let clone = tracer.clone();
        clone.set_enabled(false);
        assert!(!tracer.is_enabled());

        drop(clone.start_span(request("validate")));
        assert_eq!(tracer.named("validate").len(), 1);
    }
}
