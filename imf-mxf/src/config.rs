//! Reader configuration

use crate::error::{MxfError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default size above which byte ranges are staged to disk (64 MiB)
pub const DEFAULT_STAGING_THRESHOLD: u64 = 64 * 1024 * 1024;

/// Configuration for reading MXF track files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Scratch area for staged byte ranges; a private temporary
    /// directory is used when unset
    pub working_directory: Option<PathBuf>,
    /// Ranges larger than this many bytes are staged to a file
    pub staging_threshold: u64,
    /// Fail descriptor projection on sets or properties missing from the registry
    pub strict_registry: bool,
    /// JSON registry replacing the built-in one
    pub registry_path: Option<PathBuf>,
    /// Run the IMF constraint pass after OP1A validation
    pub validate_imf: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            working_directory: None,
            staging_threshold: DEFAULT_STAGING_THRESHOLD,
            strict_registry: false,
            registry_path: None,
            validate_imf: true,
        }
    }
}

impl ReaderConfig {
    /// Load from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    /// Parse from JSON text; missing fields take their defaults
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| MxfError::Config(e.to_string()))
    }

    /// Set the working directory
    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Set the staging threshold
    pub fn with_staging_threshold(mut self, bytes: u64) -> Self {
        self.staging_threshold = bytes;
        self
    }

    /// Enable or disable strict registry lookups
    pub fn with_strict_registry(mut self, strict: bool) -> Self {
        self.strict_registry = strict;
        self
    }

    /// Use an external registry file
    pub fn with_registry_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.registry_path = Some(path.into());
        self
    }

    /// Enable or disable the IMF constraint pass
    pub fn with_imf_validation(mut self, enabled: bool) -> Self {
        self.validate_imf = enabled;
        self
    }
}
