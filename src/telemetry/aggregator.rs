// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Per-interval aggregation of metric series.
//!
//! Producers on any thread record series; same-named series are merged with
//! [`MetricSeries::combine`]. Points keep append order per producer only,
//! there is no global ordering across producers within an interval.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use super::payload::TelemetryPayload;
use super::series::MetricSeries;
use crate::error::SeriesError;

/// Collects series until the next flush.
#[derive(Debug, Default)]
pub struct MetricsAggregator {
    series: RwLock<BTreeMap<String, MetricSeries>>,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a series, merging it into any pending series with the same name.
    pub fn record(&self, series: MetricSeries) -> Result<(), SeriesError> {
        let mut pending = self.series.write().unwrap_or_else(PoisonError::into_inner);
        match pending.get_mut(series.metric()) {
            Some(existing) => existing.combine(&series),
            None => {
                pending.insert(series.metric().to_string(), series);
                Ok(())
            }
        }
    }

    /// Pending series by short or full metric name.
    pub fn get(&self, name: &str) -> Option<MetricSeries> {
        let pending = self.series.read().unwrap_or_else(PoisonError::into_inner);
        pending
            .get(name)
            .or_else(|| pending.values().find(|s| s.metric().ends_with(&format!(".{}", name))))
            .cloned()
    }

    /// Number of pending series.
    pub fn len(&self) -> usize {
        self.series.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain pending series into a metrics payload, ordered by metric name.
    pub fn flush(&self) -> Option<TelemetryPayload> {
        let drained = {
            let mut series = self.series.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *series)
        };
        if drained.is_empty() {
            return None;
        }
        Some(TelemetryPayload::generate_metrics(
            drained.into_values().collect(),
        ))
    }
}
