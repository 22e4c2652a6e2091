// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Version-keyed table of call sites to intercept.
//!
//! The same logical operation lives in different modules, under different
//! names, and takes its arguments in different positions depending on the
//! library version. [`CallSiteRegistry`] keeps that knowledge in one static
//! table and turns it into an explicit [`InstallPlan`] for a given version.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::version::{Version, VersionRange};
use crate::error::RegistryError;

/// Logical operations that can be traced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Parse,
    Validate,
    Execute,
    Resolve,
}

impl OperationKind {
    /// Every operation, in installation order.
    pub const ALL: [OperationKind; 5] = [
        Self::Query,
        Self::Parse,
        Self::Validate,
        Self::Execute,
        Self::Resolve,
    ];

    /// Canonical label, used as span name and default resource.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Parse => "parse",
            Self::Validate => "validate",
            Self::Execute => "execute",
            Self::Resolve => "resolve",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Logical position and keyword name of the argument a span reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgSpec {
    pub index: usize,
    pub name: &'static str,
}

impl ArgSpec {
    pub const fn new(index: usize, name: &'static str) -> Self {
        Self { index, name }
    }
}

/// Where to intercept one operation for a range of library versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSiteRule {
    pub operation: OperationKind,
    pub versions: VersionRange,
    pub module: &'static str,
    pub symbol: &'static str,
    pub arg: Option<ArgSpec>,
}

impl CallSiteRule {
    pub const fn new(
        operation: OperationKind,
        versions: VersionRange,
        module: &'static str,
        symbol: &'static str,
    ) -> Self {
        Self {
            operation,
            versions,
            module,
            symbol,
            arg: None,
        }
    }

    /// Attach the argument this operation derives its resource from.
    pub const fn with_arg(mut self, index: usize, name: &'static str) -> Self {
        self.arg = Some(ArgSpec::new(index, name));
        self
    }

    /// Dotted path of the call site, for logs.
    pub fn path(&self) -> String {
        format!("{}.{}", self.module, self.symbol)
    }
}

/// One call site selected for installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedSite {
    pub rule: CallSiteRule,
    /// True for a public re-export of an operation that already has a primary site.
    pub alias: bool,
}

/// Call sites to wrap for one library version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallPlan {
    pub sites: Vec<PlannedSite>,
    /// Operations with no rule for this version; they stay untraced.
    pub skipped: Vec<OperationKind>,
}

impl InstallPlan {
    /// Sites planned for one operation, primary first.
    pub fn sites_for(&self, operation: OperationKind) -> impl Iterator<Item = &PlannedSite> {
        self.sites
            .iter()
            .filter(move |site| site.rule.operation == operation)
    }
}

const V2_0: Version = Version::new(2, 0, 0);
const V2_1: Version = Version::new(2, 1, 0);
const V3_0: Version = Version::new(3, 0, 0);
const V3_1: Version = Version::new(3, 1, 0);
const V3_2: Version = Version::new(3, 2, 0);

/// Oldest GraphQL engine release with a known layout.
pub const GRAPHQL_MIN_SUPPORTED: Version = V2_0;

/// Primary call sites of the GraphQL engine, one per operation and version range.
pub const GRAPHQL_RULES: [CallSiteRule; 14] = [
    CallSiteRule::new(
        OperationKind::Query,
        VersionRange::between(V2_0, V3_0),
        "graphql",
        "graphql",
    )
    .with_arg(1, "source"),
    CallSiteRule::new(
        OperationKind::Query,
        VersionRange::at_least(V3_0),
        "graphql.graphql",
        "graphql_impl",
    )
    .with_arg(1, "source"),
    CallSiteRule::new(
        OperationKind::Parse,
        VersionRange::between(V2_0, V2_1),
        "graphql.graphql",
        "parse",
    ),
    CallSiteRule::new(
        OperationKind::Parse,
        VersionRange::between(V2_1, V3_0),
        "graphql.backend.core",
        "parse",
    ),
    CallSiteRule::new(
        OperationKind::Parse,
        VersionRange::at_least(V3_0),
        "graphql.graphql",
        "parse",
    ),
    CallSiteRule::new(
        OperationKind::Validate,
        VersionRange::between(V2_0, V2_1),
        "graphql.graphql",
        "validate",
    ),
    CallSiteRule::new(
        OperationKind::Validate,
        VersionRange::between(V2_1, V3_0),
        "graphql.backend.core",
        "validate",
    ),
    CallSiteRule::new(
        OperationKind::Validate,
        VersionRange::at_least(V3_0),
        "graphql.validation",
        "validate",
    ),
    CallSiteRule::new(
        OperationKind::Execute,
        VersionRange::between(V2_0, V2_1),
        "graphql.graphql",
        "execute",
    ),
    CallSiteRule::new(
        OperationKind::Execute,
        VersionRange::between(V2_1, V3_0),
        "graphql.backend.core",
        "execute",
    ),
    CallSiteRule::new(
        OperationKind::Execute,
        VersionRange::at_least(V3_0),
        "graphql.graphql",
        "execute",
    ),
    CallSiteRule::new(
        OperationKind::Resolve,
        VersionRange::between(V2_0, V3_0),
        "graphql.execution.executor",
        "resolve_field",
    )
    .with_arg(3, "field_asts"),
    CallSiteRule::new(
        OperationKind::Resolve,
        VersionRange::between(V3_0, V3_2),
        "graphql.execution.execute",
        "ExecutionContext.resolve_field",
    )
    .with_arg(2, "field_nodes"),
    // resolve_field was renamed to execute_field in 3.2
    CallSiteRule::new(
        OperationKind::Resolve,
        VersionRange::at_least(V3_2),
        "graphql.execution.execute",
        "ExecutionContext.execute_field",
    )
    .with_arg(2, "field_nodes"),
];

/// Public re-exports of `execute` that applications call directly.
pub const GRAPHQL_ALIASES: [CallSiteRule; 5] = [
    CallSiteRule::new(
        OperationKind::Execute,
        VersionRange::at_least(V2_0),
        "graphql",
        "execute",
    ),
    CallSiteRule::new(
        OperationKind::Execute,
        VersionRange::at_least(V2_0),
        "graphql.execution",
        "execute",
    ),
    CallSiteRule::new(
        OperationKind::Execute,
        VersionRange::between(V2_0, V3_0),
        "graphql.execution.executor",
        "execute",
    ),
    CallSiteRule::new(
        OperationKind::Execute,
        VersionRange::at_least(V3_1),
        "graphql",
        "execute_sync",
    ),
    CallSiteRule::new(
        OperationKind::Execute,
        VersionRange::at_least(V3_1),
        "graphql.execution",
        "execute_sync",
    ),
];

/// Static, version-keyed table of call sites.
#[derive(Debug, Clone)]
pub struct CallSiteRegistry {
    min_supported: Version,
    rules: Vec<CallSiteRule>,
    aliases: Vec<CallSiteRule>,
}

impl CallSiteRegistry {
    /// Build a registry, rejecting overlapping ranges for the same operation.
    pub fn new(min_supported: Version, rules: Vec<CallSiteRule>) -> Result<Self, RegistryError> {
        for (i, first) in rules.iter().enumerate() {
            if let Some(second) = rules[i + 1..].iter().find(|second| {
                second.operation == first.operation && second.versions.overlaps(&first.versions)
            }) {
                return Err(RegistryError::OverlappingRanges {
                    operation: first.operation,
                    first: first.versions.to_string(),
                    second: second.versions.to_string(),
                });
            }
        }

        Ok(Self {
            min_supported,
            rules,
            aliases: Vec::new(),
        })
    }

    /// Add re-exported call sites installed alongside the primary rules.
    pub fn with_aliases(mut self, aliases: Vec<CallSiteRule>) -> Self {
        self.aliases = aliases;
        self
    }

    /// The built-in GraphQL engine table (2.0 and later).
    pub fn graphql() -> Self {
        Self {
            min_supported: GRAPHQL_MIN_SUPPORTED,
            rules: GRAPHQL_RULES.to_vec(),
            aliases: GRAPHQL_ALIASES.to_vec(),
        }
    }

    pub fn min_supported(&self) -> Version {
        self.min_supported
    }

    /// Whether the engine should touch this library version at all.
    pub fn supports(&self, version: &Version) -> bool {
        *version >= self.min_supported
    }

    pub fn rules(&self) -> &[CallSiteRule] {
        &self.rules
    }

    /// Find the primary call site for an operation. First matching range wins.
    pub fn resolve(
        &self,
        operation: OperationKind,
        version: &Version,
    ) -> Result<&CallSiteRule, RegistryError> {
        self.rules
            .iter()
            .find(|rule| rule.operation == operation && rule.versions.contains(version))
            .ok_or_else(|| RegistryError::not_found(operation, version))
    }

    /// Re-exported call sites for an operation at this version.
    pub fn aliases(&self, operation: OperationKind, version: &Version) -> Vec<&CallSiteRule> {
        self.aliases
            .iter()
            .filter(|rule| rule.operation == operation && rule.versions.contains(version))
            .collect()
    }

    /// Resolve every operation for a version.
    ///
    /// Aliases are only planned for operations whose primary site resolved.
    pub fn plan(&self, version: &Version) -> InstallPlan {
        let mut plan = InstallPlan::default();

        for operation in OperationKind::ALL {
            match self.resolve(operation, version) {
                Ok(rule) => {
                    plan.sites.push(PlannedSite {
                        rule: *rule,
                        alias: false,
                    });
                    plan.sites.extend(
                        self.aliases(operation, version)
                            .into_iter()
                            .map(|rule| PlannedSite {
                                rule: *rule,
                                alias: true,
                            }),
                    );
                }
                Err(_) => plan.skipped.push(operation),
            }
        }

        plan
    }
}

impl Default for CallSiteRegistry {
    fn default() -> Self {
        Self::graphql()
    }
}
