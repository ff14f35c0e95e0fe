//! Configuration for the declaration index and the hierarchy builder.
//!
//! All types implement [`serde::Deserialize`]; every section and field is
//! optional and falls back to its default.
//!
//! # Overview
//!
//! - [`WorkspaceConfig`] - Top-level configuration.
//! - [`IndexConfig`] - Binding behaviour of the declaration index.
//! - [`BuilderConfig`] - Limits of hierarchy expansion.
//!
//! # Example
//!
//! ```
//! # use uidesc::config::WorkspaceConfig;
//! let config = WorkspaceConfig::from_toml_str(
//!     r#"
//!     [builder]
//!     max_depth = 16
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.builder().max_depth(), 16);
//! assert_eq!(config.index().anonymous_name_limit(), 50);
//! assert_eq!(config.root_type(), "LayoutFile");
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use uidesc_core::builtin::LAYOUT_FILE_TYPE;

/// Name of the configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "uidesc.toml";

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceConfig {
    /// Declaration index section.
    #[serde(default)]
    index: IndexConfig,

    /// Hierarchy builder section.
    #[serde(default)]
    builder: BuilderConfig,

    /// Schema type whose children table types top-level elements.
    #[serde(default = "default_root_type")]
    root_type: String,
}

fn default_root_type() -> String {
    LAYOUT_FILE_TYPE.to_string()
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            index: IndexConfig::default(),
            builder: BuilderConfig::default(),
            root_type: default_root_type(),
        }
    }
}

impl WorkspaceConfig {
    pub fn new(index: IndexConfig, builder: BuilderConfig, root_type: impl Into<String>) -> Self {
        Self {
            index,
            builder,
            root_type: root_type.into(),
        }
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Validation`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: WorkspaceConfig =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn index(&self) -> &IndexConfig {
        &self.index
    }

    pub fn builder(&self) -> &BuilderConfig {
        &self.builder
    }

    pub fn root_type(&self) -> &str {
        &self.root_type
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.index.anonymous_name_limit == 0 {
            return Err(ConfigError::Validation(
                "index.anonymous_name_limit must be at least 1".to_string(),
            ));
        }
        if self.builder.max_depth == 0 {
            return Err(ConfigError::Validation(
                "builder.max_depth must be at least 1".to_string(),
            ));
        }
        if self.root_type.is_empty() {
            return Err(ConfigError::Validation(
                "root_type must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Binding behaviour of the declaration index.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    /// Candidates tried when naming an anonymous declaration.
    #[serde(default = "default_anonymous_name_limit")]
    anonymous_name_limit: usize,
}

fn default_anonymous_name_limit() -> usize {
    50
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            anonymous_name_limit: default_anonymous_name_limit(),
        }
    }
}

impl IndexConfig {
    pub fn new(anonymous_name_limit: usize) -> Self {
        Self {
            anonymous_name_limit,
        }
    }

    /// Number of `{type}_{i}` candidates tried before an anonymous
    /// declaration is left out of the index.
    pub fn anonymous_name_limit(&self) -> usize {
        self.anonymous_name_limit
    }
}

/// Limits of hierarchy expansion.
#[derive(Debug, Clone, Deserialize)]
pub struct BuilderConfig {
    /// Deepest level expanded below a root node.
    #[serde(default = "default_max_depth")]
    max_depth: usize,
}

fn default_max_depth() -> usize {
    64
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

impl BuilderConfig {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// Finds and loads configuration.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. [`LOCAL_CONFIG_FILE`] in the working directory
/// 3. Default configuration
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but the file doesn't exist
/// - A config file exists but cannot be read, parsed or validated
pub fn load_config(
    explicit_path: Option<impl AsRef<Path>>,
) -> Result<WorkspaceConfig, ConfigError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path:% = path.display(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new(LOCAL_CONFIG_FILE);
    if local_config.exists() {
        info!(path:% = local_config.display(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    debug!("No configuration file found, using default configuration");
    Ok(WorkspaceConfig::default())
}

fn load_config_file(path: &Path) -> Result<WorkspaceConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    WorkspaceConfig::from_toml_str(&content)
}
