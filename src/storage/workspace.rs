//! Workspace management
//!
//! A workspace is a directory with a `.plugreg/` config directory and a
//! manifest file. `init` lays one out with a starter manifest.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::{Config, ProjectConfig, CONFIG_DIR};

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Not in a plugreg workspace. Run 'plugreg init' first or pass --manifest.")]
    NotInWorkspace,
}

const DEFAULT_CONFIG: &str = r#"# plugreg configuration

# Manifest file, relative to this workspace
manifest = "plugins.toml"
"#;

const STARTER_MANIFEST: &str = r#"# Plugin manifest
#
# Each [[plugin]] declares a key, the plugins it needs (passed to its
# factory in this order) and whether one instance is shared by all callers.

[[plugin]]
key = "util"
singleton = true
description = "Shared helpers"

[[plugin]]
key = "ajax"
dependencies = ["util"]
singleton = true
description = "Request transport"

[[plugin]]
key = "template"
dependencies = ["util"]
description = "Template renderer"

[[plugin]]
key = "i18n"
dependencies = ["ajax", "template"]
singleton = true
description = "Multilingual text substitution"

[[plugin]]
key = "indicator"
description = "Busy indicator"

[[plugin]]
key = "file_upload"
dependencies = ["ajax", "indicator"]
description = "File upload"
"#;

pub struct Workspace {
    root: PathBuf,
    project: ProjectConfig,
}

impl Workspace {
    /// Opens an existing workspace at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.join(CONFIG_DIR).is_dir() {
            return Err(WorkspaceError::NotInWorkspace.into());
        }

        let project = Config::load_project_config(&root)?;
        Ok(Self { root, project })
    }

    /// Initializes a workspace; existing files are left untouched
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config_dir = root.join(CONFIG_DIR);

        fs::create_dir_all(&config_dir).with_context(|| {
            format!("Failed to create {} directory: {}", CONFIG_DIR, config_dir.display())
        })?;

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let workspace = Self::open(root)?;

        let manifest_path = workspace.manifest_path();
        if !manifest_path.exists() {
            fs::write(&manifest_path, STARTER_MANIFEST).with_context(|| {
                format!("Failed to write manifest: {}", manifest_path.display())
            })?;
        }

        Ok(workspace)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_dir(&self) -> PathBuf {
        self.root.join(CONFIG_DIR)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.project.manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::manifest_store;
    use tempfile::TempDir;

    #[test]
    fn init_creates_config_and_manifest() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::init(dir.path()).unwrap();

        assert!(workspace.config_dir().join("config.toml").is_file());
        assert!(workspace.manifest_path().is_file());
        assert_eq!(workspace.manifest_path(), dir.path().join("plugins.toml"));
    }

    #[test]
    fn starter_manifest_is_valid() {
        let dir = TempDir::new().unwrap();
        let workspace = Workspace::init(dir.path()).unwrap();

        let manifest = manifest_store::load(&workspace.manifest_path()).unwrap();
        assert_eq!(manifest.len(), 6);
        assert!(manifest.graph().validate().is_ok());
    }

    #[test]
    fn init_keeps_existing_files() {
        let dir = TempDir::new().unwrap();
        Workspace::init(dir.path()).unwrap();
        fs::write(dir.path().join("plugins.toml"), "[[plugin]]\nkey = \"mine\"\n").unwrap();

        let workspace = Workspace::init(dir.path()).unwrap();
        let manifest = manifest_store::load(&workspace.manifest_path()).unwrap();
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn open_requires_config_dir() {
        let dir = TempDir::new().unwrap();
        assert!(Workspace::open(dir.path()).is_err());
    }
}
