// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Version-aware interception of library call sites.
//!
//! # Overview
//!
//! A [`CallSiteRegistry`] maps each [`OperationKind`] and library version to
//! the function that implements it. The [`InterceptionEngine`] reads the
//! version off a [`PatchTarget`], resolves the call sites, and replaces each
//! one with a [`SpanAdapter`] wrapper that opens a span around the original.
//!
//! ```rust,ignore
//! let engine = InterceptionEngine::graphql(Arc::new(TracingTracer::new()), settings);
//! let report = engine.install(&library)?;
//! telemetry.send(TelemetryPayload::integrations_changed(vec![report.to_integration()]))?;
//! ```

pub mod adapter;
pub mod classify;
pub mod engine;
pub mod registry;
pub mod target;
pub mod version;

pub use adapter::{normalize_source, SpanAdapter, SPANS_CREATED_METRIC};
pub use classify::{classify, summarize, ErrorDescriptor, ResultShape};
pub use engine::{InstallReport, InstalledSite, InterceptionEngine};
pub use registry::{
    ArgSpec, CallSiteRegistry, CallSiteRule, InstallPlan, OperationKind, PlannedSite,
    GRAPHQL_ALIASES, GRAPHQL_MIN_SUPPORTED, GRAPHQL_RULES,
};
pub use target::{hook, CallArgs, CallResult, Hook, HookTable, PatchTarget};
pub use version::{Version, VersionRange};
