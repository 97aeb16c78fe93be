//! Manifest files
//!
//! Reads and writes [`Manifest`]s as TOML, YAML or JSON. The format follows
//! the file extension.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::domain::Manifest;

#[derive(Debug, Error)]
pub enum ManifestFileError {
    #[error("Unsupported manifest extension: {0} (expected .toml, .yaml, .yml or .json)")]
    UnsupportedFormat(String),

    #[error("Failed to parse {format} manifest: {message}")]
    Parse { format: &'static str, message: String },
}

/// On-disk manifest format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Toml,
    Yaml,
    Json,
}

impl ManifestFormat {
    /// Picks the format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self, ManifestFileError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(ManifestFileError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Toml => "toml",
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }

    pub fn parse(&self, content: &str) -> Result<Manifest, ManifestFileError> {
        let parse_error = |message: String| ManifestFileError::Parse {
            format: self.as_str(),
            message,
        };

        match self {
            Self::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string())),
            Self::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
        }
    }

    pub fn render(&self, manifest: &Manifest) -> Result<String> {
        let content = match self {
            Self::Toml => toml::to_string_pretty(manifest)?,
            Self::Yaml => serde_yaml::to_string(manifest)?,
            Self::Json => serde_json::to_string_pretty(manifest)? + "\n",
        };
        Ok(content)
    }
}

/// Loads a manifest file and checks that its keys are unique
pub fn load(path: &Path) -> Result<Manifest> {
    let format = ManifestFormat::from_path(path)?;

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {}", path.display()))?;

    let manifest = format
        .parse(&content)
        .with_context(|| format!("Invalid manifest: {}", path.display()))?;

    manifest
        .check_unique()
        .with_context(|| format!("Invalid manifest: {}", path.display()))?;

    Ok(manifest)
}

/// Writes a manifest file in the format implied by its extension
pub fn save(path: &Path, manifest: &Manifest) -> Result<()> {
    let format = ManifestFormat::from_path(path)?;
    let content = format.render(manifest)?;

    fs::write(path, content)
        .with_context(|| format!("Failed to write manifest: {}", path.display()))
}
