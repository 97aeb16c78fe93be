//! Plugin manifest model
//!
//! A manifest declares plugins by key, dependencies and lifecycle without
//! providing factories. It is the on-disk shape read by the CLI; parsing
//! from files lives in the storage layer.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use super::graph::DependencyGraph;
use super::key::PluginKey;

#[derive(Debug, Error, PartialEq)]
pub enum ManifestError {
    #[error("Plugin '{0}' is declared more than once in the manifest")]
    DuplicateKey(PluginKey),
}

/// One declared plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginEntry {
    pub key: PluginKey,

    /// Dependencies in the order they are passed to the factory
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<PluginKey>,

    #[serde(default)]
    pub singleton: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PluginEntry {
    pub fn new(key: PluginKey) -> Self {
        Self {
            key,
            dependencies: Vec::new(),
            singleton: false,
            description: None,
        }
    }

    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = PluginKey>) -> Self {
        self.dependencies.extend(deps);
        self
    }

    pub fn singleton(mut self) -> Self {
        self.singleton = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A set of declared plugins
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, rename = "plugin")]
    pub plugins: Vec<PluginEntry>,
}

impl Manifest {
    pub fn new(plugins: Vec<PluginEntry>) -> Self {
        Self { plugins }
    }

    /// Rejects manifests that declare the same key twice
    pub fn check_unique(&self) -> Result<(), ManifestError> {
        let mut seen = HashSet::new();
        for entry in &self.plugins {
            if !seen.insert(&entry.key) {
                return Err(ManifestError::DuplicateKey(entry.key.clone()));
            }
        }
        Ok(())
    }

    /// Looks up a declared plugin
    pub fn get(&self, key: &str) -> Option<&PluginEntry> {
        self.plugins.iter().find(|e| e.key.as_str() == key)
    }

    /// Builds the dependency graph of the declared plugins
    pub fn graph(&self) -> DependencyGraph {
        DependencyGraph::from_entries(
            self.plugins
                .iter()
                .map(|e| (e.key.clone(), e.dependencies.clone())),
        )
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> PluginKey {
        PluginKey::new(s).unwrap()
    }

    #[test]
    fn parses_toml_with_defaults() {
        let toml = r#"
[[plugin]]
key = "util"

[[plugin]]
key = "ajax"
dependencies = ["util"]
singleton = true
description = "Ajax transport"
"#;

        let manifest: Manifest = toml::from_str(toml).unwrap();
        assert_eq!(manifest.len(), 2);

        let util = manifest.get("util").unwrap();
        assert!(util.dependencies.is_empty());
        assert!(!util.singleton);
        assert!(util.description.is_none());

        let ajax = manifest.get("ajax").unwrap();
        assert_eq!(ajax.dependencies, vec![key("util")]);
        assert!(ajax.singleton);
    }

    #[test]
    fn parses_yaml_and_json() {
        let yaml = "plugin:\n  - key: a\n  - key: b\n    dependencies: [a]\n    singleton: true\n";
        let from_yaml: Manifest = serde_yaml::from_str(yaml).unwrap();

        let json = r#"{"plugin":[{"key":"a"},{"key":"b","dependencies":["a"],"singleton":true}]}"#;
        let from_json: Manifest = serde_json::from_str(json).unwrap();

        assert_eq!(from_yaml, from_json);
    }

    #[test]
    fn rejects_invalid_key_in_file() {
        let toml = "[[plugin]]\nkey = \"has space\"\n";
        assert!(toml::from_str::<Manifest>(toml).is_err());
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let manifest = Manifest::new(vec![
            PluginEntry::new(key("a")),
            PluginEntry::new(key("b")),
            PluginEntry::new(key("a")).singleton(),
        ]);

        assert_eq!(manifest.check_unique(), Err(ManifestError::DuplicateKey(key("a"))));
    }

    #[test]
    fn graph_reflects_entries() {
        let manifest = Manifest::new(vec![
            PluginEntry::new(key("util")),
            PluginEntry::new(key("ajax")).with_dependencies([key("util")]),
        ]);

        let graph = manifest.graph();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.dependents(&key("util")), vec![key("ajax")]);
        assert!(graph.validate().is_ok());
    }
}
