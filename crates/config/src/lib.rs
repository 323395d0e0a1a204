#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for kiln
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/kiln/config.toml)
//! - Environment variables
//! - CLI flags

use kiln_errors::{ConfigError, Error};
use kiln_types::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub network: NetworkConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
}

/// Build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Parallel build jobs; 0 = auto-detect
    #[serde(default = "default_build_jobs")]
    pub jobs: usize,
    /// Root under which per-build source/build/staging triples live
    pub build_root: Option<PathBuf>,
    /// Registry file describing resolved dependency packages
    pub registry: Option<PathBuf>,
}

/// Network configuration for source fetching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: OutputFormat::Tty,
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            jobs: 0, // 0 = auto-detect
            build_root: None,
            registry: None,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: 300, // 5 minutes
        }
    }
}

// Default value functions for serde
fn default_output_format() -> OutputFormat {
    OutputFormat::Tty
}

fn default_build_jobs() -> usize {
    0 // 0 = auto-detect
}

fn default_timeout() -> u64 {
    300 // 5 minutes
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("kiln").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration from an optional explicit path, falling back to the
    /// default location, falling back to defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        if let Some(path) = path {
            return Self::load_from_file(path).await;
        }

        let default = Self::default_path()?;
        if default.exists() {
            Self::load_from_file(&default).await
        } else {
            Ok(Self::default())
        }
    }

    /// Merge environment variable overrides (KILN_JOBS, KILN_BUILD_ROOT,
    /// KILN_REGISTRY). CLI flags are applied on top of this by the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if an override has an invalid value.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        if let Ok(jobs) = std::env::var("KILN_JOBS") {
            self.build.jobs = jobs.parse().map_err(|_| ConfigError::Invalid {
                message: format!("KILN_JOBS must be an integer, got {jobs:?}"),
            })?;
        }
        if let Ok(root) = std::env::var("KILN_BUILD_ROOT") {
            self.build.build_root = Some(PathBuf::from(root));
        }
        if let Ok(registry) = std::env::var("KILN_REGISTRY") {
            self.build.registry = Some(PathBuf::from(registry));
        }
        Ok(())
    }

    /// Effective parallel job count, auto-detected when configured as 0
    #[must_use]
    pub fn effective_jobs(&self) -> usize {
        if self.build.jobs == 0 {
            num_cpus::get()
        } else {
            self.build.jobs
        }
    }
}
