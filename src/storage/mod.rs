//! # Storage Layer
//!
//! Files on disk: configuration and plugin manifests.
//!
//! ## Layout
//!
//! ```text
//! workspace/
//! ├── .plugreg/
//! │   └── config.toml       # Project configuration
//! └── plugins.toml          # Manifest (path set by `manifest` in config)
//! ```
//!
//! Manifests may also be YAML (`.yaml`/`.yml`) or JSON (`.json`).
//!
//! ## Key Types
//!
//! - [`Workspace`] - Entry point for a plugreg workspace
//! - [`Config`] - Project and global configuration
//! - [`manifest_store`] - Load/save manifests

mod config;
pub mod manifest_store;
mod workspace;

pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig, CONFIG_DIR, DEFAULT_MANIFEST};
pub use manifest_store::{ManifestFileError, ManifestFormat};
pub use workspace::{Workspace, WorkspaceError};
