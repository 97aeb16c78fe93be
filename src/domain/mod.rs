//! Domain models for plugreg
//!
//! Keys, the static dependency graph and the manifest model, without any I/O
//! or instantiation concerns.

mod key;
mod graph;
mod manifest;

pub use key::{format_chain, KeyError, PluginKey};
pub use graph::{DependencyGraph, GraphError};
pub use manifest::{Manifest, ManifestError, PluginEntry};
