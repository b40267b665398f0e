//! Configuration management for simscope
//!
//! Handles loading and validation of `simscope.toml` configuration files.
//! Every section and field is optional; missing values take their defaults.
//!
//! ```toml
//! [general]
//! log_level = "debug"
//! log_format = "json"
//!
//! [explorer]
//! neighbor_cap = 10
//! label_mode = "text"
//! similarity = "lazy"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::logging::LogConfig;
use crate::scene::LabelMode;
use crate::similarity::SimilarityStrategy;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SIMSCOPE_CONFIG";

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-friendly output for interactive use
    #[default]
    Pretty,
    /// JSON lines for machine consumption
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Exploration settings
    #[serde(default)]
    pub explorer: ExplorerConfig,
}

/// General configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log output format
    pub log_format: LogFormat,

    /// Optional log file
    pub log_file: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            log_file: None,
        }
    }
}

/// Exploration configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Upper bound on the initial neighbor count (half the corpus otherwise)
    pub neighbor_cap: usize,

    /// Initial marker label preference
    pub label_mode: LabelMode,

    /// Pairwise score strategy
    pub similarity: SimilarityStrategy,

    /// Corpora larger than this are scored lazily even when `similarity = "eager"`
    pub eager_item_limit: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            neighbor_cap: 20,
            label_mode: LabelMode::DisplayId,
            similarity: SimilarityStrategy::Eager,
            eager_item_limit: 4096,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the resolved default location.
    ///
    /// Without an explicit path, a missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        if let Some(path) = path {
            return Self::load_from(path);
        }
        match resolve_config_path(None) {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                tracing::debug!("No config file found; using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.display().to_string(), e.to_string()))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Parse and validate TOML content.
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would fail later at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.general.log_level.to_ascii_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "general.log_level must be one of {}, got {:?}",
                VALID_LOG_LEVELS.join(", "),
                self.general.log_level
            )));
        }
        if self.explorer.eager_item_limit == 0 {
            return Err(ConfigError::ValidationError(
                "explorer.eager_item_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Logging settings derived from `[general]`.
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.general.log_level.clone(),
            format: self.general.log_format,
            file: self.general.log_file.clone(),
        }
    }
}

/// Resolve the config file location.
///
/// Order: explicit path, `$SIMSCOPE_CONFIG`, `<config dir>/simscope/simscope.toml`.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(value) = std::env::var_os(CONFIG_ENV_VAR) {
        if !value.is_empty() {
            return Some(PathBuf::from(value));
        }
    }
    dirs::config_dir().map(|dir| dir.join("simscope").join("simscope.toml"))
}
