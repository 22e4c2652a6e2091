// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Log output for the crate's diagnostics and, optionally, intercepted spans.
//!
//! Two targets are filtered separately:
//! - `tracehook`: install reports, skipped operations, delivery failures
//! - `tracehook::span`: one record per intercepted call, emitted by
//!   [`TracingTracer`](super::TracingTracer) when the span closes, carrying
//!   its `resource`, `service` and error fields

use anyhow::Context;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::error::{ConfigError, Result};

/// Target of the spans opened around intercepted calls.
pub const SPAN_TARGET: &str = "tracehook::span";

/// What to log and how.
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// Level for the crate's own events.
    pub level: Level,

    /// Level at which intercepted spans are logged; `None` hides them.
    pub spans: Option<Level>,

    /// Extra filter directives for the host application, e.g. `"my_api=debug"`.
    pub directives: Vec<String>,

    /// Let `RUST_LOG` replace the computed filter when it is set.
    pub env_override: bool,

    pub ansi_colors: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            spans: None,
            directives: Vec::new(),
            env_override: true,
            ansi_colors: true,
        }
    }
}

impl LogConfig {
    /// Log every intercepted call as it completes.
    pub fn with_spans() -> Self {
        Self {
            spans: Some(Level::INFO),
            ..Self::default()
        }
    }

    /// Only warnings and errors, no spans, no colors.
    pub fn quiet() -> Self {
        Self {
            level: Level::WARN,
            ansi_colors: false,
            ..Self::default()
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi_colors = ansi;
        self
    }

    /// Filter directive string, ignoring `RUST_LOG`.
    pub fn directive(&self) -> String {
        let spans = self
            .spans
            .map_or_else(|| "off".to_string(), |level| level.to_string().to_lowercase());
        let mut parts = vec![
            format!("tracehook={}", self.level.to_string().to_lowercase()),
            format!("{}={}", SPAN_TARGET, spans),
        ];
        parts.extend(self.directives.iter().cloned());
        parts.join(",")
    }

    /// Build the filter, honoring `RUST_LOG` when `env_override` is set.
    pub fn build_filter(&self) -> Result<EnvFilter> {
        if self.env_override {
            if let Ok(filter) = EnvFilter::try_from_default_env() {
                return Ok(filter);
            }
        }
        let directive = self.directive();
        EnvFilter::try_new(&directive)
            .map_err(|e| ConfigError::InvalidFormat(format!("log filter '{}': {}", directive, e)))
            .map_err(Into::into)
    }
}

/// Install a global `fmt` subscriber.
///
/// Fails on an invalid directive or when a global subscriber is already set.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let filter = config.build_filter()?;

    // span records are only written when the span closes
    let span_events = if config.spans.is_some() {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_ansi(config.ansi_colors)
                .with_target(true)
                .with_span_events(span_events),
        )
        .try_init()
        .context("a global tracing subscriber is already installed")
}
