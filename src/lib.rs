//! plugreg - a dependency-aware plugin registry
//!
//! Plugins are named factories with an ordered list of dependencies and a
//! singleton flag. [`Registry::require`] resolves dependencies depth-first,
//! reuses cached singletons and runs each fresh instance's `init`.
//!
//! ```
//! use plugreg::{Instance, PublicScope, Registry};
//!
//! struct Util;
//! impl PublicScope for Util {}
//!
//! struct Ajax {
//!     util: Instance,
//! }
//! impl PublicScope for Ajax {}
//!
//! let mut registry = Registry::new();
//! registry.define("util", &[], |_| Ok(Util), true)?;
//! registry.define("ajax", &["util"], |deps| Ok(Ajax { util: deps[0].clone() }), true)?;
//!
//! let ajax = registry.require_as::<Ajax>("ajax", &[])?;
//! assert!(ajax.util.is::<Util>());
//! # Ok::<(), plugreg::RegistryError>(())
//! ```

pub mod domain;
pub mod registry;
pub mod storage;
pub mod cli;

pub use domain::{DependencyGraph, GraphError, Manifest, PluginEntry, PluginKey};
pub use registry::{
    DeclaredScope, Instance, PluginDefinition, PublicScope, RedefinePolicy, Registry,
    RegistryError, RegistryOptions,
};
