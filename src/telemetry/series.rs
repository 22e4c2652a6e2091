// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Append-only metric series for telemetry reporting.
//!
//! A series is a named, typed sequence of `(timestamp, value)` points with
//! tags. Series with the same name produced by different components are
//! merged with [`MetricSeries::combine`], which concatenates points without
//! sorting or de-duplication.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::SeriesError;

/// Prefix applied to every telemetry metric name.
pub const METRIC_PREFIX: &str = "dd.app_telemetry.tracers.";

/// Metric type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Gauge,
    #[default]
    Count,
    Rate,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gauge => "gauge",
            Self::Count => "count",
            Self::Rate => "rate",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single metric series.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    metric: String,
    kind: MetricKind,
    interval: Option<u64>,
    points: Vec<(i64, f64)>,
    tags: BTreeMap<String, String>,
    host: String,
}

impl MetricSeries {
    /// Create an empty series. `name` is prefixed with [`METRIC_PREFIX`].
    pub fn new(
        name: &str,
        kind: MetricKind,
        interval: Option<u64>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            metric: format!("{}{}", METRIC_PREFIX, name),
            kind,
            interval,
            points: Vec::new(),
            tags: BTreeMap::new(),
            host: host.into(),
        }
    }

    /// Create a count series.
    pub fn count(name: &str, host: impl Into<String>) -> Self {
        Self::new(name, MetricKind::Count, None, host)
    }

    /// Create a gauge series reported every `interval` seconds.
    pub fn gauge(name: &str, interval: u64, host: impl Into<String>) -> Self {
        Self::new(name, MetricKind::Gauge, Some(interval), host)
    }

    /// Full metric name, including the prefix.
    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn interval(&self) -> Option<u64> {
        self.interval
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Points in the order they were added.
    pub fn points(&self) -> &[(i64, f64)] {
        &self.points
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Add a point stamped with the current unix time.
    pub fn add_point(&mut self, value: f64) {
        self.add_point_at(chrono::Utc::now().timestamp(), value);
    }

    /// Add a point with an explicit unix timestamp.
    pub fn add_point_at(&mut self, timestamp: i64, value: f64) {
        self.points.push((timestamp, value));
    }

    /// Set a tag, replacing any previous value.
    pub fn add_tag(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(name.into(), value.into());
    }

    /// Merge another series with the same name into this one.
    ///
    /// Tags from `other` win on collision and its points are appended after
    /// ours. On a kind or interval mismatch nothing is changed.
    pub fn combine(&mut self, other: &MetricSeries) -> Result<(), SeriesError> {
        if self.kind != other.kind {
            return Err(SeriesError::ConflictingSeriesKind {
                metric: self.metric.clone(),
                existing: self.kind,
                incoming: other.kind,
            });
        }
        if self.interval != other.interval {
            return Err(SeriesError::ConflictingInterval {
                metric: self.metric.clone(),
                existing: self.interval,
                incoming: other.interval,
            });
        }

        self.tags
            .extend(other.tags.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.points.extend_from_slice(&other.points);
        Ok(())
    }

    /// Wire body of this series.
    pub fn to_payload_body(&self) -> Value {
        let points: Vec<Value> = self
            .points
            .iter()
            .map(|(timestamp, value)| json!([timestamp, value]))
            .collect();

        json!({
            "metric": self.metric,
            "points": points,
            "tags": self.tags,
            "type": self.kind.as_str(),
            "interval": self.interval,
            "host": self.host,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_series_prefixes_name() {
        let series = MetricSeries::count("spans_created", "host-a");
        assert_eq!(series.metric(), "dd.app_telemetry.tracers.spans_created");
        assert_eq!(series.kind(), MetricKind::Count);
        assert!(series.points().is_empty());
    }

    #[test]
    fn test_add_point_uses_current_time() {
        let before = chrono::Utc::now().timestamp();
        let mut series = MetricSeries::count("x", "h");
        series.add_point(3.0);
        let after = chrono::Utc::now().timestamp();

        let (ts, value) = series.points()[0];
        assert!(ts >= before && ts <= after);
        assert_eq!(value, 3.0);
    }

    #[test]
    fn test_combine_appends_points_in_order() {
        let mut a = MetricSeries::new("requests", MetricKind::Count, Some(10), "h");
        a.add_point_at(1, 5.0);
        let mut b = MetricSeries::new("requests", MetricKind::Count, Some(10), "h");
        b.add_point_at(2, 7.0);

        a.combine(&b).unwrap();
        assert_eq!(a.points(), &[(1, 5.0), (2, 7.0)]);
    }

    #[test]
    fn test_combine_keeps_duplicates_and_order() {
        let mut a = MetricSeries::count("requests", "h");
        a.add_point_at(5, 1.0);
        let mut b = MetricSeries::count("requests", "h");
        b.add_point_at(1, 1.0);
        b.add_point_at(5, 1.0);

        a.combine(&b).unwrap();
        assert_eq!(a.points(), &[(5, 1.0), (1, 1.0), (5, 1.0)]);
    }

    #[test]
    fn test_combine_merges_tags_other_wins() {
        let mut a = MetricSeries::count("requests", "h");
        a.add_tag("lib", "graphql");
        a.add_tag("env", "staging");
        let mut b = MetricSeries::count("requests", "h");
        b.add_tag("env", "prod");

        a.combine(&b).unwrap();
        assert_eq!(a.tags().get("lib").map(String::as_str), Some("graphql"));
        assert_eq!(a.tags().get("env").map(String::as_str), Some("prod"));
    }

    #[test]
    fn test_combine_conflicting_kind() {
        let mut a = MetricSeries::new("requests", MetricKind::Count, Some(10), "h");
        a.add_point_at(1, 5.0);
        let b = MetricSeries::new("requests", MetricKind::Gauge, Some(10), "h");

        let err = a.combine(&b).unwrap_err();
        assert!(matches!(err, SeriesError::ConflictingSeriesKind { .. }));
        assert_eq!(a.points(), &[(1, 5.0)]);
    }

    #[test]
    fn test_combine_conflicting_interval() {
        let mut a = MetricSeries::new("requests", MetricKind::Rate, Some(10), "h");
        let b = MetricSeries::new("requests", MetricKind::Rate, None, "h");

        let err = a.combine(&b).unwrap_err();
        assert!(matches!(
            err,
            SeriesError::ConflictingInterval {
                existing: Some(10),
                incoming: None,
                ..
            }
        ));
    }

    #[test]
    fn test_payload_body() {
        let mut series = MetricSeries::gauge("queue_depth", 60, "host-a");
        series.add_point_at(100, 2.0);
        series.add_point_at(160, 4.5);
        series.add_tag("lib", "graphql");

        assert_eq!(
            series.to_payload_body(),
            json!({
                "metric": "dd.app_telemetry.tracers.queue_depth",
                "points": [[100, 2.0], [160, 4.5]],
                "tags": {"lib": "graphql"},
                "type": "gauge",
                "interval": 60,
                "host": "host-a",
            })
        );
    }

    #[test]
    fn test_payload_body_null_interval() {
        let series = MetricSeries::count("x", "h");
        assert_eq!(series.to_payload_body()["interval"], Value::Null);
        assert_eq!(series.to_payload_body()["type"], "count");
    }
}
