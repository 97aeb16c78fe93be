//! # Plugin Registry
//!
//! Named factories with declared dependencies and a singleton flag.
//!
//! ## Lifecycle
//!
//! ```text
//! define(key, deps, factory, singleton)      require(key, args)
//!            │                                      │
//!            └──> definitions[key]          cached singleton? ──yes──> return it
//!                                                   │ no
//!                                     require each dep (no args), in order
//!                                                   │
//!                                          factory(&deps) -> scope
//!                                                   │
//!                                            scope.init(args)
//!                                                   │
//!                                  singleton? cache it ── return instance
//! ```
//!
//! Cycles are detected during resolution and reported as
//! [`RegistryError::CircularDependency`]. What happens when a key is defined
//! twice is set by [`RedefinePolicy`].
//!
//! ## Key Types
//!
//! - [`Registry`] - Definition table and singleton cache
//! - [`PluginDefinition`] - Key, factory, dependencies, singleton flag
//! - [`PublicScope`] - What a factory returns; optional `init`
//! - [`Instance`] - Shared handle to a built scope
//! - [`DeclaredScope`] - Scope built for manifest-declared plugins

mod declared;
mod definition;
mod error;
mod scope;
mod table;

pub use declared::{DeclaredScope, DependencyRef};
pub use definition::{factory_fn, Factory, PluginDefinition};
pub use error::RegistryError;
pub use scope::{AsAny, Instance, PublicScope};
pub use table::{RedefinePolicy, Registry, RegistryOptions};
