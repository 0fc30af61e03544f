#![forbid(unsafe_code)]

//! Engine configuration as data.
//!
//! [`EngineConfig`] groups the optimizer, monitor, and transition settings so
//! a host can load them from one TOML or JSON document at startup. Every
//! field has a default, so partial documents are fine.
//!
//! ```toml
//! error_log_capacity = 128
//!
//! [optimizer]
//! margin = 24.0
//!
//! [monitor]
//! debounce_ms = 100
//!
//! [transition]
//! duration_ms = 250
//! easing = "ease_in_out"
//! ```
//!
//! ```rust,ignore
//! let config = EngineConfig::from_toml_file("boardfit.toml")?.validated()?;
//! ```

#[cfg(feature = "config")]
use std::path::Path;

use boardfit_layout::OptimizerConfig;

use crate::error_log::DEFAULT_ERROR_LOG_CAPACITY;
use crate::transition::TransitionConfig;
use crate::viewport_monitor::MonitorConfig;

/// Settings for a whole [`LayoutEngine`](crate::engine::LayoutEngine).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct EngineConfig {
    pub optimizer: OptimizerConfig,
    pub monitor: MonitorConfig,
    pub transition: TransitionConfig,
    /// Retained error log entries. Default: 256.
    pub error_log_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            optimizer: OptimizerConfig::default(),
            monitor: MonitorConfig::default(),
            transition: TransitionConfig::default(),
            error_log_capacity: DEFAULT_ERROR_LOG_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate every section.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.optimizer.validate();
        errors.extend(self.monitor.validate());
        errors.extend(self.transition.validate());
        if self.error_log_capacity == 0 {
            errors.push("error_log_capacity must be > 0".into());
        }
        errors
    }

    /// `self` if valid, else every problem found.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Serialize the effective settings to JSONL format.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        let max_edge = match self.optimizer.max_board_edge {
            Some(edge) => format!("{edge:.1}"),
            None => "null".to_string(),
        };
        format!(
            r#"{{"event":"engine_config","margin":{:.1},"spacing":{:.1},"min_board_edge":{:.1},"max_board_edge":{},"board_priority":{},"debounce_ms":{},"orientation_settle_ms":{},"max_wait_ms":{},"skip_threshold":{:.1},"board_aspect":{:.3},"duration_ms":{},"easing":"{}","placement":"{}","error_log_capacity":{}}}"#,
            self.optimizer.margin,
            self.optimizer.spacing,
            self.optimizer.min_board_edge,
            max_edge,
            self.optimizer.board_priority,
            self.monitor.debounce_ms,
            self.monitor.orientation_settle_ms,
            self.monitor.max_wait_ms,
            self.monitor.skip_threshold,
            self.monitor.board_aspect,
            self.transition.duration_ms,
            self.transition.easing.as_str(),
            self.transition.placement.as_str(),
            self.error_log_capacity
        )
    }
}

/// Errors that can occur when loading an engine configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
