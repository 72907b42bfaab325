//! Embridge Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! It serves as the shared configuration vocabulary across all Embridge crates.
//!
//! Every type deserializes with defaults for missing fields, so a config file
//! only has to name what it changes:
//!
//! ```
//! use embridge_config::{LogLevel, SessionConfig};
//!
//! let cfg = SessionConfig::from_json_str(r#"{ "log": { "global": "debug" } }"#).unwrap();
//! assert_eq!(cfg.log.global, LogLevel::Debug);
//! assert_eq!(cfg.runtime.max_call_depth, 256);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level configuration for an interpreter session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Logging configuration
    pub log: LogConfig,
    /// Embedded runtime options
    pub runtime: RuntimeOptions,
    /// Modules imported into the module cache right after start
    pub preload: Vec<String>,
}

/// Options handed to the embedded runtime at initialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeOptions {
    /// Maximum nesting of runtime calls (native code calling back into the runtime)
    pub max_call_depth: usize,
}

/// Log verbosity, ordered from quietest to noisiest
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Global default level
    pub global: LogLevel,
    /// Session lifecycle level (None means use global)
    pub session: Option<LogLevel>,
    /// Module cache level
    pub cache: Option<LogLevel>,
    /// Call bridge level
    pub bridge: Option<LogLevel>,
    /// Converter level
    pub convert: Option<LogLevel>,
    /// Embedded runtime level
    pub runtime: Option<LogLevel>,
}

/// Bridge layer enum for layer-specific log configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    Session,
    Cache,
    Bridge,
    Convert,
    Runtime,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid session config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SessionConfig {
    /// Parse a configuration from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Add a module to the preload list
    pub fn with_preload(mut self, module: impl Into<String>) -> Self {
        self.preload.push(module.into());
        self
    }
}

impl LogConfig {
    /// Get the effective level for a layer
    ///
    /// Returns the layer-specific level if set, otherwise the global level
    pub fn level_for(&self, layer: Layer) -> LogLevel {
        let specific = match layer {
            Layer::Session => self.session,
            Layer::Cache => self.cache,
            Layer::Bridge => self.bridge,
            Layer::Convert => self.convert,
            Layer::Runtime => self.runtime,
        };
        specific.unwrap_or(self.global)
    }
}

impl Layer {
    /// All layers, in pipeline order
    pub const ALL: [Layer; 5] = [
        Layer::Session,
        Layer::Cache,
        Layer::Bridge,
        Layer::Convert,
        Layer::Runtime,
    ];

    /// Get the string name of the layer
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Session => "session",
            Layer::Cache => "cache",
            Layer::Bridge => "bridge",
            Layer::Convert => "convert",
            Layer::Runtime => "runtime",
        }
    }

    /// Get the log target name for this layer
    pub fn target(&self) -> &'static str {
        match self {
            Layer::Session => "embridge::session",
            Layer::Cache => "embridge::cache",
            Layer::Bridge => "embridge::bridge",
            Layer::Convert => "embridge::convert",
            Layer::Runtime => "embridge::runtime",
        }
    }
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            max_call_depth: 256,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global: LogLevel::Info,
            session: None,
            cache: None,
            bridge: None,
            convert: None,
            runtime: None,
        }
    }
}
