//! REPL configuration and errors

use std::path::{Path, PathBuf};

use console_core::{ConsoleError, SessionConfig};
use serde::{Deserialize, Serialize};

/// Errors raised by the terminal host
#[derive(Debug, thiserror::Error)]
pub enum ReplError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {message}", .path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[source] ConsoleError),

    #[error(transparent)]
    Console(#[from] ConsoleError),

    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Logging section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Contents of `console.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplConfig {
    /// Prompt printed before each line
    pub prompt: String,
    /// Session tunables
    pub session: SessionConfig,
    /// Logging
    pub logging: LoggingConfig,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: "/ ".to_string(),
            session: SessionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ReplConfig {
    /// Load from `path`, falling back to defaults when the file is missing
    pub fn load(path: &Path) -> Result<Self, ReplError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ReplError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&contents).map_err(|e| ReplError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Check the session section
    pub fn validate(&self) -> Result<(), ReplError> {
        self.session.validate().map_err(ReplError::InvalidConfig)
    }
}
