//! Configuration types for walk definitions
//!
//! A walk file pairs the walk settings (batch size, batch limit) with the
//! HTTP source to walk:
//!
//! ```yaml
//! walk:
//!   batch_size: 100
//!   times_limit: 500
//! source:
//!   url: https://api.example.com/v1/users
//!   records_path: data
//!   total_path: meta.total
//!   keyset:
//!     after_param: starting_after
//!     key_field: id
//! ```

use crate::engine::DEFAULT_ITEM_TIMES_LIMIT;
use crate::error::{Error, Result};
use crate::pagination::DEFAULT_LIMIT;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

// ============================================================================
// Walk File
// ============================================================================

/// Complete walk definition loaded from YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkFile {
    /// Walk settings
    #[serde(default)]
    pub walk: WalkConfig,

    /// Source to walk
    pub source: SourceConfig,
}

impl WalkFile {
    /// Check every setting, reporting the first invalid one
    pub fn validate(&self) -> Result<()> {
        self.walk.validate()?;
        self.source.validate()
    }
}

// ============================================================================
// Walk Settings
// ============================================================================

/// Settings for one walk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkConfig {
    /// Elements requested per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum batches before the walk gives up
    #[serde(default)]
    pub times_limit: Option<usize>,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            times_limit: None,
        }
    }
}

impl WalkConfig {
    /// Batch limit, falling back to the element-walk default
    pub fn times_limit_or_default(&self) -> usize {
        self.times_limit.unwrap_or(DEFAULT_ITEM_TIMES_LIMIT)
    }

    /// Check the walk settings
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::invalid_value("walk.batch_size", "must be at least 1"));
        }
        if self.times_limit == Some(0) {
            return Err(Error::invalid_value("walk.times_limit", "must be at least 1"));
        }
        Ok(())
    }
}

fn default_batch_size() -> usize {
    DEFAULT_LIMIT
}

// ============================================================================
// Source Settings
// ============================================================================

/// HTTP source returning JSON batches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Endpoint URL
    pub url: String,

    /// Query parameter carrying the page number
    #[serde(default = "default_page_param")]
    pub page_param: String,

    /// Query parameter carrying the batch size
    #[serde(default = "default_limit_param")]
    pub limit_param: String,

    /// Query parameter carrying the element offset, if the source wants one
    #[serde(default)]
    pub offset_param: Option<String>,

    /// Dot path to the records array; empty when the body is the array
    #[serde(default)]
    pub records_path: String,

    /// Dot path to the total element count
    #[serde(default)]
    pub total_path: Option<String>,

    /// Keyset pagination instead of page numbers
    #[serde(default)]
    pub keyset: Option<KeysetConfig>,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl SourceConfig {
    /// Source at `url` with every other setting defaulted
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            page_param: default_page_param(),
            limit_param: default_limit_param(),
            offset_param: None,
            records_path: String::new(),
            total_path: None,
            keyset: None,
            headers: BTreeMap::new(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Check the source settings
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(Error::invalid_value("source.url", "cannot be empty"));
        }
        url::Url::parse(&self.url)
            .map_err(|e| Error::invalid_value("source.url", e.to_string()))?;

        if self.limit_param.is_empty() {
            return Err(Error::invalid_value("source.limit_param", "cannot be empty"));
        }
        if self.keyset.is_none() && self.page_param.is_empty() && self.offset_param.is_none() {
            return Err(Error::invalid_value(
                "source.page_param",
                "cannot be empty without offset_param or keyset",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::invalid_value("source.timeout_secs", "must be at least 1"));
        }
        if let Some(keyset) = &self.keyset {
            keyset.validate()?;
        }
        Ok(())
    }
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_limit_param() -> String {
    "limit".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Keyset settings: the next request names the last key seen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeysetConfig {
    /// Query parameter carrying the last key
    pub after_param: String,

    /// Field of each record holding its key
    pub key_field: String,
}

impl KeysetConfig {
    fn validate(&self) -> Result<()> {
        if self.after_param.is_empty() {
            return Err(Error::invalid_value("source.keyset.after_param", "cannot be empty"));
        }
        if self.key_field.is_empty() {
            return Err(Error::invalid_value("source.keyset.key_field", "cannot be empty"));
        }
        Ok(())
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load and validate a walk file
pub fn load_walk_file(path: impl AsRef<Path>) -> Result<WalkFile> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read walk file '{}': {}",
            path.display(),
            e
        ))
    })?;
    load_walk_str(&content)
}

/// Parse and validate a walk definition from YAML
pub fn load_walk_str(yaml: &str) -> Result<WalkFile> {
    let file: WalkFile = serde_yaml::from_str(yaml)?;
    file.validate()?;
    Ok(file)
}
