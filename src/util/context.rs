//! Global context for stmeta operations.
//!
//! Provides centralized access to configuration paths and output settings.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{global_config_dir, load_config, Config, PROJECT_CONFIG_FILE};

/// Process-wide settings shared by every command.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global stmeta data (~/.stmeta/)
    home: PathBuf,

    /// Whether to use verbose output
    verbose: bool,

    /// Whether to use colors in output
    color: bool,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let home = global_config_dir().unwrap_or_else(|| cwd.join(".stmeta"));

        GlobalContext {
            cwd,
            home,
            verbose: false,
            color: true,
        }
    }

    /// Override the global data directory.
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home = home;
        self
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Global config file (~/.stmeta/config.toml).
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Project config file (./stmeta.toml).
    pub fn project_config_path(&self) -> PathBuf {
        self.cwd.join(PROJECT_CONFIG_FILE)
    }

    /// Merged global and project configuration.
    pub fn config(&self) -> Config {
        load_config(&self.config_path(), &self.project_config_path())
    }

    /// Resolve `path` against the working directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn color(&self) -> bool {
        self.color
    }
}
