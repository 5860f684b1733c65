//! Debugger configuration
//!
//! Read from a TOML file. Every field is optional and falls back to the
//! limits of the classic monitor: 32 tokens, 32 watchpoints, 100-byte
//! expression buffers.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::machine::Word;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SdbConfig {
    /// Maximum log level for the front-ends (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,
    pub lexer: LexerLimits,
    pub watchpoints: WatchpointConfig,
    pub machine: MachineConfig,
}

/// Bounds applied while tokenizing an expression
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LexerLimits {
    pub max_tokens: usize,
    /// Longest literal or register payload, in bytes
    pub max_token_len: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WatchpointConfig {
    pub capacity: usize,
    pub max_expr_len: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MachineConfig {
    pub mem_base: Word,
    pub mem_size: usize,
    pub reset_pc: Word,
}

impl Default for SdbConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            lexer: LexerLimits::default(),
            watchpoints: WatchpointConfig::default(),
            machine: MachineConfig::default(),
        }
    }
}

impl Default for LexerLimits {
    fn default() -> Self {
        Self {
            max_tokens: 32,
            max_token_len: 31,
        }
    }
}

impl Default for WatchpointConfig {
    fn default() -> Self {
        Self {
            capacity: 32,
            max_expr_len: 99,
        }
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            mem_base: 0x8000_0000,
            mem_size: 0x1_0000,
            reset_pc: 0x8000_0000,
        }
    }
}

impl SdbConfig {
    /// Parse a config from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SdbConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Load `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.lexer.max_tokens == 0 {
            return Err(ConfigError::Invalid("lexer.max_tokens must be positive".into()));
        }
        if self.watchpoints.capacity == 0 {
            return Err(ConfigError::Invalid(
                "watchpoints.capacity must be positive".into(),
            ));
        }
        if self.machine.mem_size == 0 {
            return Err(ConfigError::Invalid("machine.mem_size must be positive".into()));
        }
        match self.log_level.to_ascii_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            other => Err(ConfigError::Invalid(format!("unknown log_level '{}'", other))),
        }
    }
}
