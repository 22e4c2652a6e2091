// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Installs span wrappers around a library's call sites, once.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, error, info, warn};

use super::adapter::SpanAdapter;
use super::registry::{CallSiteRegistry, OperationKind, PlannedSite};
use super::target::PatchTarget;
use super::version::Version;
use crate::config::IntegrationSettings;
use crate::error::InstallError;
use crate::telemetry::payload::Integration;
use crate::telemetry::spans::Tracer;
use crate::telemetry::MetricsAggregator;

/// A call site that now runs through a span wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledSite {
    pub operation: OperationKind,
    pub module: String,
    pub symbol: String,
    pub alias: bool,
}

/// Outcome of a successful [`InterceptionEngine::install`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub library: String,
    pub version: Version,
    pub installed: Vec<InstalledSite>,
    /// Operations the registry has no rule for at this version.
    pub skipped: Vec<OperationKind>,
    /// Call sites the registry named but the library does not have.
    pub failures: Vec<InstallError>,
}

impl InstallReport {
    /// Whether an operation has at least one wrapped call site.
    pub fn is_traced(&self, operation: OperationKind) -> bool {
        self.installed.iter().any(|site| site.operation == operation)
    }

    /// Integration record for an `IntegrationsChanged` payload.
    pub fn to_integration(&self) -> Integration {
        if self.failures.is_empty() {
            Integration::enabled(&self.library, self.version.to_string())
        } else {
            let errors: Vec<String> = self.failures.iter().map(ToString::to_string).collect();
            let mut integration = Integration::failed(
                &self.library,
                self.version.to_string(),
                true,
                errors.join("; "),
            );
            integration.enabled = !self.installed.is_empty();
            integration
        }
    }
}

impl InstallError {
    /// Integration record describing a refused install, if it should be reported.
    pub fn to_integration(&self) -> Option<Integration> {
        match self {
            Self::UnsupportedVersion {
                library, version, ..
            } => Some(Integration::failed(library, version, false, self.to_string())),
            Self::AlreadyInstalled(_) | Self::MissingCallSite { .. } => None,
        }
    }
}

/// Applies a [`CallSiteRegistry`] to a library at most once.
pub struct InterceptionEngine {
    registry: CallSiteRegistry,
    tracer: Arc<dyn Tracer>,
    settings: Arc<IntegrationSettings>,
    metrics: Option<(Arc<MetricsAggregator>, String)>,
    installed: Mutex<bool>,
}

impl InterceptionEngine {
    pub fn new(
        registry: CallSiteRegistry,
        tracer: Arc<dyn Tracer>,
        settings: IntegrationSettings,
    ) -> Self {
        Self {
            registry,
            tracer,
            settings: Arc::new(settings),
            metrics: None,
            installed: Mutex::new(false),
        }
    }

    /// Engine for the GraphQL engine family with the built-in table.
    pub fn graphql(tracer: Arc<dyn Tracer>, settings: IntegrationSettings) -> Self {
        Self::new(CallSiteRegistry::graphql(), tracer, settings)
    }

    /// Count spans created by installed wrappers.
    pub fn with_metrics(
        mut self,
        aggregator: Arc<MetricsAggregator>,
        host: impl Into<String>,
    ) -> Self {
        self.metrics = Some((aggregator, host.into()));
        self
    }

    pub fn registry(&self) -> &CallSiteRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &IntegrationSettings {
        &self.settings
    }

    pub fn is_installed(&self) -> bool {
        *self.installed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wrap every call site the registry selects for the target's version.
    ///
    /// The state lock is held for the whole install, so concurrent callers
    /// see either nothing installed or everything installed. A missing call
    /// site is reported and skipped; the remaining operations still install.
    /// The engine only counts as installed once at least one site is wrapped,
    /// so an install that wrapped nothing can be retried.
    pub fn install(&self, target: &dyn PatchTarget) -> Result<InstallReport, InstallError> {
        let mut installed = self.installed.lock().unwrap_or_else(PoisonError::into_inner);
        if *installed {
            debug!(library = target.name(), "Interception already installed");
            return Err(InstallError::AlreadyInstalled(target.name().to_string()));
        }

        let version = target.version();
        if !self.registry.supports(&version) {
            info!(
                library = target.name(),
                version = %version,
                minimum = %self.registry.min_supported(),
                "Library version not supported, interception disabled"
            );
            return Err(InstallError::UnsupportedVersion {
                library: target.name().to_string(),
                version: version.to_string(),
                minimum: self.registry.min_supported().to_string(),
            });
        }

        let plan = self.registry.plan(&version);
        let mut report = InstallReport {
            library: target.name().to_string(),
            version,
            installed: Vec::new(),
            skipped: plan.skipped.clone(),
            failures: Vec::new(),
        };

        for operation in &plan.skipped {
            debug!(operation = %operation, version = %version, "No call site for operation");
        }

        for site in &plan.sites {
            match self.install_site(target, site) {
                Ok(()) => report.installed.push(InstalledSite {
                    operation: site.rule.operation,
                    module: site.rule.module.to_string(),
                    symbol: site.rule.symbol.to_string(),
                    alias: site.alias,
                }),
                Err(err) => {
                    error!(
                        library = target.name(),
                        version = %version,
                        call_site = %site.rule.path(),
                        error = %err,
                        "Failed to intercept call site"
                    );
                    report.failures.push(err);
                }
            }
        }

        if report.installed.is_empty() {
            warn!(
                library = target.name(),
                version = %version,
                failed = report.failures.len(),
                "No call site could be intercepted"
            );
            return Ok(report);
        }

        *installed = true;
        info!(
            library = target.name(),
            version = %version,
            installed = report.installed.len(),
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            "Interception installed"
        );

        Ok(report)
    }

    fn install_site(
        &self,
        target: &dyn PatchTarget,
        site: &PlannedSite,
    ) -> Result<(), InstallError> {
        let rule = &site.rule;
        let original = target
            .lookup(rule.module, rule.symbol)
            .ok_or_else(|| InstallError::missing(rule.operation, rule.module, rule.symbol))?;

        let mut adapter = SpanAdapter::new(
            rule.operation,
            rule.arg,
            Arc::clone(&self.tracer),
            Arc::clone(&self.settings),
        )
        .with_component(target.name());
        if let Some((aggregator, host)) = &self.metrics {
            adapter = adapter.with_metrics(Arc::clone(aggregator), host.clone());
        }

        target.replace(rule.operation, rule.module, rule.symbol, adapter.wrap(original))?;
        debug!(
            operation = %rule.operation,
            call_site = %rule.path(),
            alias = site.alias,
            "Wrapped call site"
        );
        Ok(())
    }

    /// Restoring original call sites is not supported; wrappers stay for
    /// the life of the process.
    pub fn uninstall(&self) {}
}
