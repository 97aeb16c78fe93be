//! Configuration handling for plugreg
//!
//! Configuration is stored in `.plugreg/config.toml` (project) and
//! `~/.config/plugreg/config.toml` (global). The project file names the
//! manifest; the global file holds user preferences. Unknown keys are errors.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Name of the per-project configuration directory
pub const CONFIG_DIR: &str = ".plugreg";

/// Default manifest file, relative to the project root
pub const DEFAULT_MANIFEST: &str = "plugins.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Manifest path, relative to the project root
    pub manifest: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from(DEFAULT_MANIFEST),
        }
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration for the project containing the current directory, if any
    pub fn load() -> Result<Self> {
        let global = Self::load_global()?;
        let project_root = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::find_project_root(&cwd));

        let project = match &project_root {
            Some(root) => Self::load_project_config(root)?,
            None => ProjectConfig::default(),
        };

        Ok(Self {
            project,
            global,
            project_root,
        })
    }

    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        Ok(Self {
            project,
            global,
            project_root: Some(project_root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "plugreg", "plugreg").map(|dirs| dirs.config_dir().to_path_buf())
    }

    fn load_global() -> Result<GlobalConfig> {
        match Self::global_config_dir() {
            Some(dir) => read_toml(&dir.join("config.toml"), "global"),
            None => Ok(GlobalConfig::default()),
        }
    }

    /// Reads only `.plugreg/config.toml`, leaving the global config alone
    pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        read_toml(&project_root.join(CONFIG_DIR).join("config.toml"), "project")
    }

    /// Finds the project root by looking for a `.plugreg/` directory at or above `start`
    pub fn find_project_root(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| dir.join(CONFIG_DIR).is_dir())
            .map(Path::to_path_buf)
    }

    /// Manifest path from the project config, resolved against the project root
    pub fn manifest_path(&self) -> Option<PathBuf> {
        self.project_root
            .as_ref()
            .map(|root| root.join(&self.project.manifest))
    }
}

/// Reads a config file, or the defaults when it does not exist
fn read_toml<T: DeserializeOwned + Default>(path: &Path, scope: &str) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} config: {}", scope, path.display()))?;
    let config = toml::from_str(&content)
        .map_err(|e| ConfigError::Parse(e.to_string()))
        .with_context(|| format!("Invalid {} config: {}", scope, path.display()))?;

    debug!(path = %path.display(), scope, "loaded config");
    Ok(config)
}
