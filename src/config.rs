//! Editor configuration
//!
//! Every field has a default, so an embedding application only supplies
//! what it wants to change. Configuration is passed in explicitly; nothing
//! is read from the environment.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pdf::LoadOptions;

/// Default name of the exported file
pub const DEFAULT_EXPORT_FILE_NAME: &str = "rotated.pdf";

/// Default limit for parsing a document, in seconds
const DEFAULT_LOAD_TIMEOUT_SECS: u64 = 30;
/// Default limit for the export pass, in seconds
const DEFAULT_EXPORT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub load: LoadConfig,
    pub export: ExportConfig,
    /// `tracing` filter directive, e.g. `pdf_rotate=debug`
    pub log_filter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoadConfig {
    /// Open encrypted documents without a password
    pub ignore_encryption: bool,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    pub file_name: String,
    pub timeout_secs: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            load: LoadConfig::default(),
            export: ExportConfig::default(),
            log_filter: "pdf_rotate=info".to_string(),
        }
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            ignore_encryption: true,
            timeout_secs: DEFAULT_LOAD_TIMEOUT_SECS,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
            timeout_secs: DEFAULT_EXPORT_TIMEOUT_SECS,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON document, filling omitted fields with defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl LoadConfig {
    pub fn options(&self) -> LoadOptions {
        LoadOptions {
            ignore_encryption: self.ignore_encryption,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ExportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
