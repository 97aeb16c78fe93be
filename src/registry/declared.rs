//! Manifest-declared plugins
//!
//! Installing a [`Manifest`] defines each entry with a factory that builds a
//! [`DeclaredScope`]: a scope with no behavior of its own that records how it
//! was built (serial, dependency serials, init args). The CLI uses it to
//! show what `require` does for a given manifest.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::cell::Cell;
use std::rc::Rc;

use super::definition::PluginDefinition;
use super::error::RegistryError;
use super::table::Registry;
use super::scope::{Instance, PublicScope};
use crate::domain::{Manifest, PluginKey};

/// A dependency as seen by a declared plugin when it was built
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyRef {
    pub key: PluginKey,

    /// Serial of the dependency instance, if it was itself a declared plugin
    pub serial: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeclaredScope {
    pub key: PluginKey,

    /// Build counter, shared by all plugins of one installed manifest
    pub serial: u64,

    pub dependencies: Vec<DependencyRef>,

    /// Arguments of the `init` call, if it ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub init_args: Option<Vec<Value>>,

    pub built_at: DateTime<Utc>,
}

impl PublicScope for DeclaredScope {
    fn init(&mut self, args: &[Value]) -> anyhow::Result<()> {
        self.init_args = Some(args.to_vec());
        Ok(())
    }
}

fn dependency_ref(dep: &Instance) -> DependencyRef {
    DependencyRef {
        key: dep.key().clone(),
        serial: dep.downcast_ref::<DeclaredScope>().map(|d| d.serial),
    }
}

impl Registry {
    /// Defines every plugin of the manifest; returns how many were defined
    pub fn install(&mut self, manifest: &Manifest) -> Result<usize, RegistryError> {
        manifest.check_unique()?;

        let counter = Rc::new(Cell::new(0u64));
        for entry in &manifest.plugins {
            let counter = Rc::clone(&counter);
            let key = entry.key.clone();

            let factory = move |deps: &[Instance]| -> anyhow::Result<DeclaredScope> {
                let serial = counter.get() + 1;
                counter.set(serial);
                Ok(DeclaredScope {
                    key: key.clone(),
                    serial,
                    dependencies: deps.iter().map(dependency_ref).collect(),
                    init_args: None,
                    built_at: Utc::now(),
                })
            };

            let mut definition = PluginDefinition::new(entry.key.clone(), factory)
                .depends_on(entry.dependencies.iter().cloned())
                .with_singleton(entry.singleton);
            if let Some(description) = &entry.description {
                definition = definition.with_description(description.clone());
            }

            self.register(definition)?;
        }

        Ok(manifest.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ManifestError, PluginEntry};
    use serde_json::json;

    fn key(s: &str) -> PluginKey {
        PluginKey::new(s).unwrap()
    }

    fn sample() -> Manifest {
        Manifest::new(vec![
            PluginEntry::new(key("util")).singleton(),
            PluginEntry::new(key("template")),
            PluginEntry::new(key("i18n"))
                .with_dependencies([key("util"), key("template")])
                .singleton()
                .with_description("Text substitution"),
        ])
    }

    #[test]
    fn install_defines_every_entry() {
        let mut registry = Registry::new();
        assert_eq!(registry.install(&sample()).unwrap(), 3);

        assert_eq!(registry.len(), 3);
        let i18n = registry.definition("i18n").unwrap();
        assert!(i18n.is_singleton());
        assert_eq!(i18n.dependencies(), &[key("util"), key("template")]);
        assert_eq!(i18n.description(), Some("Text substitution"));
    }

    #[test]
    fn declared_scope_records_its_build() {
        let mut registry = Registry::new();
        registry.install(&sample()).unwrap();

        let i18n = registry.require_as::<DeclaredScope>("i18n", &[json!("en")]).unwrap();

        // util (1), template (2), then i18n (3)
        assert_eq!(i18n.serial, 3);
        assert_eq!(
            i18n.dependencies,
            vec![
                DependencyRef { key: key("util"), serial: Some(1) },
                DependencyRef { key: key("template"), serial: Some(2) },
            ]
        );
        assert_eq!(i18n.init_args, Some(vec![json!("en")]));
    }

    #[test]
    fn singletons_are_built_once_across_requires() {
        let mut registry = Registry::new();
        registry.install(&sample()).unwrap();

        let t1 = registry.require_as::<DeclaredScope>("template", &[]).unwrap();
        let u1 = registry.require_as::<DeclaredScope>("util", &[]).unwrap();
        let t2 = registry.require_as::<DeclaredScope>("template", &[]).unwrap();
        let u2 = registry.require_as::<DeclaredScope>("util", &[]).unwrap();

        assert_ne!(t1.serial, t2.serial);
        assert!(Rc::ptr_eq(&u1, &u2));
    }

    #[test]
    fn duplicate_manifest_keys_are_rejected() {
        let manifest = Manifest::new(vec![
            PluginEntry::new(key("a")),
            PluginEntry::new(key("a")),
        ]);

        let mut registry = Registry::new();
        let err = registry.install(&manifest).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Manifest(ManifestError::DuplicateKey(ref k)) if k.as_str() == "a"
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn serializes_for_output() {
        let mut registry = Registry::new();
        registry.install(&sample()).unwrap();

        let util = registry.require_as::<DeclaredScope>("util", &[]).unwrap();
        let value = serde_json::to_value(&*util).unwrap();

        assert_eq!(value["key"], "util");
        assert_eq!(value["serial"], 1);
        assert_eq!(value["init_args"], json!([]));
    }
}
