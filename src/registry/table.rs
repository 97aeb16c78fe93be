//! The plugin registry
//!
//! Owns the definition table and the singleton cache. `require` resolves
//! dependencies depth-first, dependency before dependent, builds instances
//! through their factories and runs `init` on each fresh instance.
//!
//! The registry is single-threaded (`!Send`): instances are `Rc`-shared.
//! `require` takes `&mut self`, so factories cannot call back into the
//! registry while a resolution is in flight.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, trace, warn};

use super::definition::PluginDefinition;
use super::error::RegistryError;
use super::scope::{scope_type_name, Instance, PublicScope};
use crate::domain::{DependencyGraph, GraphError, PluginKey};

/// What `define` does when the key is already defined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedefinePolicy {
    /// Replace the definition; an already cached singleton stays cached
    #[default]
    Replace,
    /// Replace the definition and evict the cached singleton
    Invalidate,
    /// Fail with [`RegistryError::AlreadyDefined`]
    Reject,
}

impl RedefinePolicy {
    pub fn as_str(&self) -> &str {
        match self {
            RedefinePolicy::Replace => "replace",
            RedefinePolicy::Invalidate => "invalidate",
            RedefinePolicy::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryOptions {
    pub redefine_policy: RedefinePolicy,
}

#[derive(Debug, Clone)]
struct CachedInstance {
    instance: Instance,
    cached_at: DateTime<Utc>,
}

/// Registry of plugin definitions and cached singleton instances
#[derive(Debug, Default)]
pub struct Registry {
    definitions: HashMap<PluginKey, PluginDefinition>,
    singletons: HashMap<PluginKey, CachedInstance>,

    /// Keys currently being resolved, outermost first
    resolving: Vec<PluginKey>,

    options: RegistryOptions,
}

impl Registry {
    /// Creates an empty registry with the default `replace` policy
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RegistryOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    /// Defines a plugin from string keys
    ///
    /// Dependency keys are not checked here; an undefined dependency
    /// surfaces when the plugin is required.
    pub fn define<F, S>(
        &mut self,
        key: &str,
        dependencies: &[&str],
        factory: F,
        is_singleton: bool,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&[Instance]) -> anyhow::Result<S> + 'static,
        S: PublicScope,
    {
        let key = PluginKey::new(key)?;
        let dependencies = dependencies
            .iter()
            .map(PluginKey::new)
            .collect::<Result<Vec<_>, _>>()?;

        self.register(
            PluginDefinition::new(key, factory)
                .depends_on(dependencies)
                .with_singleton(is_singleton),
        )
    }

    /// Stores a definition, applying the configured redefinition policy
    pub fn register(&mut self, definition: PluginDefinition) -> Result<(), RegistryError> {
        let key = definition.key().clone();

        if self.definitions.contains_key(&key) {
            match self.options.redefine_policy {
                RedefinePolicy::Reject => return Err(RegistryError::AlreadyDefined(key)),
                RedefinePolicy::Invalidate => {
                    if self.singletons.remove(&key).is_some() {
                        debug!(plugin = %key, "evicted cached singleton on redefinition");
                    }
                }
                RedefinePolicy::Replace => {
                    if self.singletons.contains_key(&key) {
                        warn!(plugin = %key, "redefined plugin keeps its cached singleton instance");
                    }
                }
            }
        }

        debug!(
            plugin = %key,
            dependencies = definition.dependencies().len(),
            singleton = definition.is_singleton(),
            "defined plugin"
        );
        self.definitions.insert(key, definition);
        Ok(())
    }

    /// Resolves `key`, returning its public scope
    ///
    /// A cached singleton is returned as is and `init_args` are ignored.
    /// Otherwise dependencies are required first (with no init args), the
    /// factory is called and `init` receives `init_args`.
    pub fn require(&mut self, key: &str, init_args: &[Value]) -> Result<Instance, RegistryError> {
        let result = self.resolve(key, init_args, None);
        self.resolving.clear();
        result
    }

    /// Like [`Registry::require`], downcast to the concrete scope type
    pub fn require_as<T: PublicScope>(
        &mut self,
        key: &str,
        init_args: &[Value],
    ) -> Result<Rc<T>, RegistryError> {
        let instance = self.require(key, init_args)?;
        instance
            .downcast::<T>()
            .ok_or_else(|| RegistryError::TypeMismatch {
                key: instance.key().clone(),
                expected: scope_type_name::<T>(),
            })
    }

    fn resolve(
        &mut self,
        key: &str,
        init_args: &[Value],
        required_by: Option<&PluginKey>,
    ) -> Result<Instance, RegistryError> {
        let definition = self
            .definitions
            .get(key)
            .cloned()
            .ok_or_else(|| RegistryError::NotDefined {
                key: key.to_string(),
                required_by: required_by.cloned(),
            })?;
        let key = definition.key();

        if definition.is_singleton() {
            if let Some(cached) = self.singletons.get(key) {
                trace!(plugin = %key, "singleton cache hit");
                return Ok(cached.instance.clone());
            }
        }

        if let Some(pos) = self.resolving.iter().position(|k| k == key) {
            let mut chain = self.resolving[pos..].to_vec();
            chain.push(key.clone());
            return Err(RegistryError::CircularDependency { chain });
        }

        self.resolving.push(key.clone());
        let mut deps = Vec::with_capacity(definition.dependencies().len());
        for dep in definition.dependencies() {
            trace!(plugin = %key, dependency = %dep, "resolving dependency");
            deps.push(self.resolve(dep.as_str(), &[], Some(key))?);
        }
        self.resolving.pop();

        let mut scope = (definition.factory())(&deps).map_err(|source| {
            RegistryError::FactoryFailed {
                key: key.clone(),
                source,
            }
        })?;

        scope
            .init(init_args)
            .map_err(|source| RegistryError::InitFailed {
                key: key.clone(),
                source,
            })?;

        let instance = Instance::new(key.clone(), scope);
        if definition.is_singleton() {
            self.singletons.insert(
                key.clone(),
                CachedInstance {
                    instance: instance.clone(),
                    cached_at: Utc::now(),
                },
            );
        }

        debug!(
            plugin = %key,
            singleton = definition.is_singleton(),
            init_args = init_args.len(),
            "instantiated plugin"
        );
        Ok(instance)
    }

    /// Returns true if `key` has a definition
    pub fn is_defined(&self, key: &str) -> bool {
        self.definitions.contains_key(key)
    }

    /// Returns true if a singleton instance is cached for `key`
    pub fn is_instantiated(&self, key: &str) -> bool {
        self.singletons.contains_key(key)
    }

    /// When the cached singleton for `key` was built
    pub fn cached_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.singletons.get(key).map(|c| c.cached_at)
    }

    /// Drops the cached singleton for `key`; returns true if one was cached
    pub fn evict(&mut self, key: &str) -> bool {
        self.singletons.remove(key).is_some()
    }

    pub fn definition(&self, key: &str) -> Option<&PluginDefinition> {
        self.definitions.get(key)
    }

    /// All defined keys, sorted
    pub fn keys(&self) -> Vec<&PluginKey> {
        let mut keys: Vec<_> = self.definitions.keys().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Number of cached singleton instances
    pub fn cached_count(&self) -> usize {
        self.singletons.len()
    }

    /// Builds the static dependency graph of the current definitions
    pub fn graph(&self) -> DependencyGraph {
        DependencyGraph::from_entries(
            self.definitions
                .values()
                .map(|d| (d.key().clone(), d.dependencies().to_vec())),
        )
    }

    /// The order in which `require(key)` would first build each plugin
    /// on an empty cache, without calling any factory
    pub fn resolution_order(&self, key: &PluginKey) -> Result<Vec<PluginKey>, GraphError> {
        self.graph().resolution_order(key)
    }
}
