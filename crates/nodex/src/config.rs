// SPDX-License-Identifier: MIT OR Apache-2.0
//! Session configuration.
//!
//! Settings are stored as RON:
//!
//! ```ron
//! NodexConfig(
//!     version: 1,
//!     max_math_dimensions: 3,
//!     matrix_capability: "matrixNodes",
//!     connect: ConnectOptions(allow_grow: false, clear_larger: true),
//!     trace_resolution: false,
//! )
//! ```

use crate::connect::ConnectOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Current configuration format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Errors while loading or saving a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// RON text could not be parsed
    #[error("Invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Config could not be serialized
    #[error("Could not serialize config: {0}")]
    Serialize(#[from] ron::Error),

    /// File was written by a newer version
    #[error("Config version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest supported version
        supported: u32,
    },
}

/// Tunables of a [`Session`](crate::Session)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodexConfig {
    /// Format version
    pub version: u32,
    /// Widest working dimension the component-wise math recipes accept
    pub max_math_dimensions: usize,
    /// Host capability that provides the matrix node types
    pub matrix_capability: String,
    /// Options used by `connect` when none are given
    pub connect: ConnectOptions,
    /// Emit a trace event for every candidate tried during type resolution
    pub trace_resolution: bool,
}

impl Default for NodexConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            max_math_dimensions: 3,
            matrix_capability: nodex_graph::builtin::MATRIX_CAPABILITY.to_string(),
            connect: ConnectOptions::default(),
            trace_resolution: false,
        }
    }
}

impl NodexConfig {
    /// Parse a configuration from RON text
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: NodexConfig = ron::from_str(text)?;
        if config.version > CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_FORMAT_VERSION,
            });
        }
        Ok(config)
    }

    /// Serialize to pretty RON text
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ron(&content)?;
        tracing::debug!(path = %path.display(), "loaded nodex config");
        Ok(config)
    }

    /// Save to a configuration file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NodexConfig::default();
        assert_eq!(config.max_math_dimensions, 3);
        assert_eq!(config.matrix_capability, "matrixNodes");
        assert!(!config.connect.allow_grow);
        assert!(config.connect.clear_larger);
    }

    #[test]
    fn test_ron_roundtrip() {
        let config = NodexConfig {
            max_math_dimensions: 2,
            trace_resolution: true,
            ..Default::default()
        };
        let text = config.to_ron().unwrap();
        assert_eq!(NodexConfig::from_ron(&text).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = NodexConfig::from_ron("(max_math_dimensions: 1)").unwrap();
        assert_eq!(config.max_math_dimensions, 1);
        assert_eq!(config.matrix_capability, "matrixNodes");
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = NodexConfig::from_ron("(version: 99)").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedVersion { found: 99, .. }));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("nodex-config-{}.ron", std::process::id()));
        let config = NodexConfig {
            matrix_capability: "customMatrix".to_string(),
            ..Default::default()
        };
        config.save(&path).unwrap();
        let loaded = NodexConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }
}
