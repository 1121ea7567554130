//! core::config
//!
//! Configuration schema and loading.
//!
//! # Locations
//!
//! Searched in order, first existing file wins:
//! 1. `$ODATA_EDM_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/odata-edm/config.toml`
//! 3. `<platform config dir>/odata-edm/config.toml`
//!
//! Missing config files are not an error; defaults apply.
//!
//! # Example
//!
//! ```no_run
//! use odata_edm::core::config::Config;
//!
//! let result = Config::load().unwrap();
//! let config = result.config;
//!
//! println!("Reserved: {:?}", config.reserved_namespaces());
//! println!("Alias shadowing: {}", config.allow_alias_shadowing());
//! ```

pub mod schema;

pub use schema::{EdmConfig, RegistryConfig, ResolverConfig, DEFAULT_RESERVED_NAMESPACES};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "ODATA_EDM_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Loaded configuration with defaults applied by the accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents
    pub file: EdmConfig,
    /// Path the config was loaded from (if any)
    path: Option<PathBuf>,
}

impl Config {
    /// Wrap an in-memory configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the configuration is invalid.
    pub fn new(file: EdmConfig) -> Result<Self, ConfigError> {
        file.validate()?;
        Ok(Self { file, path: None })
    }

    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed,
    /// or validated.
    pub fn load() -> Result<ConfigLoadResult, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok(), dirs::config_dir())
    }

    /// Load configuration with an explicit environment lookup and platform
    /// config directory.
    pub fn load_with(
        env: impl Fn(&str) -> Option<String>,
        platform_dir: Option<PathBuf>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        // 1. Check $ODATA_EDM_CONFIG
        if let Some(explicit) = env(CONFIG_ENV_VAR) {
            let path = PathBuf::from(explicit);
            if path.exists() {
                return Self::finish(Self::load_from(&path)?, warnings);
            }
            tracing::warn!(path = %path.display(), "{} points at a missing file", CONFIG_ENV_VAR);
            warnings.push(ConfigWarning {
                message: format!("{CONFIG_ENV_VAR} is set but the file does not exist"),
                path,
            });
        }

        // 2. Check $XDG_CONFIG_HOME/odata-edm/config.toml
        if let Some(xdg_home) = env("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("odata-edm/config.toml");
            if path.exists() {
                return Self::finish(Self::load_from(&path)?, warnings);
            }
        }

        // 3. Check the platform config directory
        if let Some(dir) = platform_dir {
            let path = dir.join("odata-edm/config.toml");
            if path.exists() {
                return Self::finish(Self::load_from(&path)?, warnings);
            }
        }

        tracing::debug!("no config file found, using defaults");
        Self::finish(Config::default(), warnings)
    }

    fn finish(
        config: Config,
        warnings: Vec<ConfigWarning>,
    ) -> Result<ConfigLoadResult, ConfigError> {
        Ok(ConfigLoadResult { config, warnings })
    }

    /// Read, parse and validate a config file.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: EdmConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(Config {
            file,
            path: Some(path.to_path_buf()),
        })
    }

    /// Write a config file atomically.
    ///
    /// Creates parent directories if needed. Writes to a temp file and
    /// renames it into place.
    pub fn write(path: &Path, config: &EdmConfig) -> Result<(), ConfigError> {
        config.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Names that may not be declared as a namespace name or alias.
    ///
    /// Defaults to `Edm`, `System` and `Transient`.
    pub fn reserved_namespaces(&self) -> Vec<&str> {
        self.file
            .registry
            .as_ref()
            .and_then(|r| r.reserved_namespaces.as_ref())
            .map(|names| names.iter().map(String::as_str).collect())
            .unwrap_or_else(|| DEFAULT_RESERVED_NAMESPACES.to_vec())
    }

    /// Whether an alias may equal another namespace's full name.
    ///
    /// Defaults to `false`.
    pub fn allow_alias_shadowing(&self) -> bool {
        self.file
            .registry
            .as_ref()
            .and_then(|r| r.allow_alias_shadowing)
            .unwrap_or(false)
    }

    /// Extra prefixes that resolve like `Edm`.
    ///
    /// Defaults to none.
    pub fn primitive_namespace_aliases(&self) -> &[String] {
        self.file
            .resolver
            .as_ref()
            .and_then(|r| r.primitive_namespace_aliases.as_deref())
            .unwrap_or(&[])
    }

    /// Get the path the config was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
