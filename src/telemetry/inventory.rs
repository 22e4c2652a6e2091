// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Host dependency inventory.

use serde::{Deserialize, Serialize};

/// An installed package and its version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    pub version: String,
}

impl Dependency {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Source of the host's installed packages.
pub trait DependencyInventory {
    /// Current set of installed packages.
    fn dependencies(&self) -> Vec<Dependency>;
}

/// A fixed, caller-maintained list of dependencies.
#[derive(Debug, Clone, Default)]
pub struct StaticInventory {
    dependencies: Vec<Dependency>,
}

impl StaticInventory {
    pub fn new(dependencies: Vec<Dependency>) -> Self {
        Self { dependencies }
    }

    pub fn push(&mut self, name: impl Into<String>, version: impl Into<String>) {
        self.dependencies.push(Dependency::new(name, version));
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

impl DependencyInventory for StaticInventory {
    fn dependencies(&self) -> Vec<Dependency> {
        self.dependencies.clone()
    }
}

impl<I: DependencyInventory + ?Sized> DependencyInventory for &I {
    fn dependencies(&self) -> Vec<Dependency> {
        (**self).dependencies()
    }
}

impl FromIterator<(String, String)> for StaticInventory {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(name, version)| Dependency::new(name, version))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_inventory() {
        let mut inventory = StaticInventory::default();
        assert!(inventory.is_empty());
        inventory.push("graphql-core", "3.2.3");
        inventory.push("serde", "1.0.200");

        let deps = inventory.dependencies();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0], Dependency::new("graphql-core", "3.2.3"));
    }

    #[test]
    fn test_from_iterator() {
        let inventory: StaticInventory = vec![("a".to_string(), "1".to_string())]
            .into_iter()
            .collect();
        assert_eq!(inventory.len(), 1);
    }

    #[test]
    fn test_dependency_serializes_as_pair() {
        let json = serde_json::to_value(Dependency::new("graphql-core", "3.2.3")).unwrap();
        assert_eq!(json, serde_json::json!({"name": "graphql-core", "version": "3.2.3"}));
    }
}
