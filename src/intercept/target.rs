// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Replaceable call sites of an instrumented library.
//!
//! This module defines the core abstractions the engine patches:
//! - [`Hook`], a shared callable standing in for one library function
//! - [`CallArgs`], positional and keyword arguments for a hook
//! - [`PatchTarget`], a library whose call sites can be looked up and replaced
//! - [`HookTable`], the provided `PatchTarget` implementation

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::{Map, Value};

use super::version::Version;
use super::OperationKind;
use crate::error::{CallError, InstallError};

/// Result of invoking a library call site.
pub type CallResult = Result<Value, CallError>;

/// A replaceable library function.
pub type Hook = Arc<dyn Fn(&CallArgs) -> CallResult + Send + Sync>;

/// Wrap a closure as a [`Hook`].
pub fn hook<F>(f: F) -> Hook
where
    F: Fn(&CallArgs) -> CallResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Arguments passed to a call site.
///
/// Library versions call the same logical site inconsistently, sometimes
/// positionally and sometimes by keyword, so both forms are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    pub keyword: Map<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from positional arguments only.
    pub fn positional(args: impl IntoIterator<Item = Value>) -> Self {
        Self {
            positional: args.into_iter().collect(),
            keyword: Map::new(),
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Add a keyword argument.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// Fetch a logical argument whether it was passed positionally or by keyword.
    ///
    /// The positional slot wins when both are present.
    pub fn get(&self, index: usize, name: &str) -> Option<&Value> {
        self.positional.get(index).or_else(|| self.keyword.get(name))
    }
}

/// A library whose call sites can be located and replaced at run time.
pub trait PatchTarget: Send + Sync {
    /// Library name, used as the span `component`.
    fn name(&self) -> &str;

    /// Installed library version.
    fn version(&self) -> Version;

    /// Locate a call site.
    fn lookup(&self, module: &str, symbol: &str) -> Option<Hook>;

    /// Replace an existing call site, returning the hook it held before.
    ///
    /// `operation` is only used to describe the failure when the site does
    /// not exist.
    fn replace(
        &self,
        operation: OperationKind,
        module: &str,
        symbol: &str,
        hook: Hook,
    ) -> Result<Hook, InstallError>;
}

/// A library's dispatch table: module path → symbol → hook.
pub struct HookTable {
    name: String,
    version: Version,
    modules: RwLock<HashMap<String, HashMap<String, Hook>>>,
}

impl HookTable {
    /// Create an empty table for a library.
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            modules: RwLock::new(HashMap::new()),
        }
    }

    /// Define (or redefine) a call site.
    pub fn define(&self, module: &str, symbol: &str, hook: Hook) -> &Self {
        let mut modules = self.modules.write().unwrap_or_else(PoisonError::into_inner);
        modules
            .entry(module.to_string())
            .or_default()
            .insert(symbol.to_string(), hook);
        self
    }

    /// Check if a call site exists.
    pub fn contains(&self, module: &str, symbol: &str) -> bool {
        self.lookup(module, symbol).is_some()
    }

    /// Get all module paths.
    pub fn module_names(&self) -> Vec<String> {
        let modules = self.modules.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = modules.keys().cloned().collect();
        names.sort();
        names
    }

    /// Invoke a call site the way the library's own code does.
    ///
    /// The hook is cloned out of the table before it runs, so hooks may call
    /// back into the table and wrappers may be installed concurrently.
    pub fn call(&self, module: &str, symbol: &str, args: &CallArgs) -> CallResult {
        let hook = self.lookup(module, symbol).ok_or_else(|| {
            CallError::new(
                "AttributeError",
                format!("module '{}' has no attribute '{}'", module, symbol),
            )
        })?;
        hook(args)
    }
}

impl PatchTarget for HookTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> Version {
        self.version
    }

    fn lookup(&self, module: &str, symbol: &str) -> Option<Hook> {
        let modules = self.modules.read().unwrap_or_else(PoisonError::into_inner);
        modules.get(module)?.get(symbol).cloned()
    }

    fn replace(
        &self,
        operation: OperationKind,
        module: &str,
        symbol: &str,
        hook: Hook,
    ) -> Result<Hook, InstallError> {
        let mut modules = self.modules.write().unwrap_or_else(PoisonError::into_inner);
        let slot = modules
            .get_mut(module)
            .and_then(|symbols| symbols.get_mut(symbol))
            .ok_or_else(|| InstallError::missing(operation, module, symbol))?;
        Ok(std::mem::replace(slot, hook))
    }
}

impl fmt::Debug for HookTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookTable")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("modules", &self.module_names())
            .finish()
    }
}
