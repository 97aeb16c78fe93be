//! Registry errors

use thiserror::Error;

use crate::domain::{format_chain, KeyError, ManifestError, PluginKey};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    InvalidKey(#[from] KeyError),

    #[error("Plugin not defined: {key}{}", required_by_suffix(.required_by.as_ref()))]
    NotDefined {
        key: String,
        required_by: Option<PluginKey>,
    },

    #[error("Circular dependency: {}", format_chain(.chain))]
    CircularDependency { chain: Vec<PluginKey> },

    #[error("Plugin already defined: {0}")]
    AlreadyDefined(PluginKey),

    #[error("Factory for plugin '{key}' failed")]
    FactoryFailed {
        key: PluginKey,
        #[source]
        source: anyhow::Error,
    },

    #[error("Init of plugin '{key}' failed")]
    InitFailed {
        key: PluginKey,
        #[source]
        source: anyhow::Error,
    },

    #[error("Plugin '{key}' is not a {expected}")]
    TypeMismatch {
        key: PluginKey,
        expected: &'static str,
    },

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

fn required_by_suffix(required_by: Option<&PluginKey>) -> String {
    match required_by {
        Some(parent) => format!(" (required by {})", parent),
        None => String::new(),
    }
}
