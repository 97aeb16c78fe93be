//! Manifest lookup shared by the inspection commands

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::domain::Manifest;
use crate::registry::Registry;
use crate::storage::{manifest_store, Config, WorkspaceError};

use super::output::Output;

/// A loaded manifest and where it was found
pub struct Session {
    pub manifest: Manifest,
    pub manifest_path: PathBuf,
}

impl Session {
    /// Loads the manifest named by `--manifest`, or the workspace's configured one
    pub fn open(config: &Config, manifest: Option<&Path>, output: &Output) -> Result<Self> {
        let manifest_path = match manifest {
            Some(path) => path.to_path_buf(),
            None => config.manifest_path().ok_or(WorkspaceError::NotInWorkspace)?,
        };

        output.verbose_ctx("manifest", &format!("Loading {}", manifest_path.display()));
        let manifest = manifest_store::load(&manifest_path)?;
        output.verbose_ctx("manifest", &format!("{} plugin(s) declared", manifest.len()));

        Ok(Self {
            manifest,
            manifest_path,
        })
    }

    /// A fresh registry with every declared plugin installed
    pub fn registry(&self) -> Result<Registry> {
        let mut registry = Registry::new();
        registry.install(&self.manifest)?;
        Ok(registry)
    }
}
