//! Configuration file support for stmeta.
//!
//! stmeta reads two configuration file locations:
//! - Global: `~/.stmeta/config.toml` - User-wide defaults
//! - Project: `stmeta.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config; command-line flags
//! take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::encode::OutputMode;
use crate::ops::metadata::MetadataOptions;

/// Name of the project configuration file.
pub const PROJECT_CONFIG_FILE: &str = "stmeta.toml";

/// stmeta configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Manifest settings
    pub metadata: MetadataConfig,
}

/// Manifest-related configuration. Unset fields keep their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Manifest name, also the asset file name prefix
    pub name: Option<String>,

    /// Manifest version
    pub version: Option<String>,

    /// Output encoding (json, cjs, amd:static, amd:factory)
    pub mode: Option<OutputMode>,

    /// Insert a content hash into the asset file name
    pub content_hash: Option<bool>,

    /// Length of the content hash
    pub hash_length: Option<usize>,

    /// Suffix replacing a code module's extension to find its descriptor
    pub config_extension: Option<String>,

    /// Only record sources reachable from a component
    pub editable_only: Option<bool>,

    /// Suffix of stylesheet and variant files
    pub variant_suffix: Option<String>,

    /// Project root recorded for sources outside every package
    pub context: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        let ours = &mut self.metadata;
        let theirs = other.metadata;

        if theirs.name.is_some() {
            ours.name = theirs.name;
        }
        if theirs.version.is_some() {
            ours.version = theirs.version;
        }
        if theirs.mode.is_some() {
            ours.mode = theirs.mode;
        }
        if theirs.content_hash.is_some() {
            ours.content_hash = theirs.content_hash;
        }
        if theirs.hash_length.is_some() {
            ours.hash_length = theirs.hash_length;
        }
        if theirs.config_extension.is_some() {
            ours.config_extension = theirs.config_extension;
        }
        if theirs.editable_only.is_some() {
            ours.editable_only = theirs.editable_only;
        }
        if theirs.variant_suffix.is_some() {
            ours.variant_suffix = theirs.variant_suffix;
        }
        if theirs.context.is_some() {
            ours.context = theirs.context;
        }
    }

    /// Overlay the configured values onto `options`.
    pub fn apply(&self, options: &mut MetadataOptions) {
        let m = &self.metadata;

        if let Some(name) = &m.name {
            options.name = name.clone();
        }
        if let Some(version) = &m.version {
            options.version = version.clone();
        }
        if let Some(mode) = m.mode {
            options.mode = mode;
        }
        if let Some(content_hash) = m.content_hash {
            options.use_content_hash_file_name = content_hash;
        }
        if let Some(len) = m.hash_length {
            options.content_hash_length = len;
        }
        if let Some(ext) = &m.config_extension {
            options.config_extension = ext.clone();
        }
        if let Some(editable_only) = m.editable_only {
            options.only_include_editable_components = editable_only;
        }
        if let Some(suffix) = &m.variant_suffix {
            options.variant_suffix = suffix.clone();
        }
        if let Some(context) = &m.context {
            options.context = Some(context.clone());
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (stmeta.toml)
/// 2. Global config (~/.stmeta/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global stmeta config directory (~/.stmeta).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".stmeta"))
}
