//! Plugin definitions
//!
//! A definition pairs a key with a factory, its ordered dependency keys and a
//! singleton flag. Definitions are cheap to clone: the factory is shared.

use std::fmt;
use std::rc::Rc;

use super::scope::{Instance, PublicScope};
use crate::domain::PluginKey;

/// Builds a public scope from the resolved dependency instances
///
/// `deps[i]` is the instance for the i-th declared dependency.
pub type Factory = Rc<dyn Fn(&[Instance]) -> anyhow::Result<Box<dyn PublicScope>>>;

/// Wraps a typed factory closure into a [`Factory`]
pub fn factory_fn<F, S>(f: F) -> Factory
where
    F: Fn(&[Instance]) -> anyhow::Result<S> + 'static,
    S: PublicScope,
{
    Rc::new(move |deps: &[Instance]| {
        f(deps).map(|scope| Box::new(scope) as Box<dyn PublicScope>)
    })
}

#[derive(Clone)]
pub struct PluginDefinition {
    key: PluginKey,
    dependencies: Vec<PluginKey>,
    factory: Factory,
    singleton: bool,
    description: Option<String>,
}

impl PluginDefinition {
    /// Creates a non-singleton definition with no dependencies
    pub fn new<F, S>(key: PluginKey, factory: F) -> Self
    where
        F: Fn(&[Instance]) -> anyhow::Result<S> + 'static,
        S: PublicScope,
    {
        Self::from_factory(key, factory_fn(factory))
    }

    pub fn from_factory(key: PluginKey, factory: Factory) -> Self {
        Self {
            key,
            dependencies: Vec::new(),
            factory,
            singleton: false,
            description: None,
        }
    }

    /// Appends dependencies, in the order they will be passed to the factory
    pub fn depends_on(mut self, deps: impl IntoIterator<Item = PluginKey>) -> Self {
        self.dependencies.extend(deps);
        self
    }

    /// Marks the definition as a singleton within its registry
    pub fn singleton(mut self) -> Self {
        self.singleton = true;
        self
    }

    pub fn with_singleton(mut self, singleton: bool) -> Self {
        self.singleton = singleton;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn key(&self) -> &PluginKey {
        &self.key
    }

    pub fn dependencies(&self) -> &[PluginKey] {
        &self.dependencies
    }

    pub fn is_singleton(&self) -> bool {
        self.singleton
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn factory(&self) -> &Factory {
        &self.factory
    }
}

impl fmt::Debug for PluginDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDefinition")
            .field("key", &self.key)
            .field("dependencies", &self.dependencies)
            .field("singleton", &self.singleton)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
