//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration for the precedent search engine: matching
//! policy, highlight markers, pagination limits, and the corpus field names
//! the pipeline reads. Supports TOML files with environment variable
//! overrides and validation with detailed error messages.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration files (TOML), environment variables
//! - **Output**: Validated configuration structs with defaults and overrides
//! - **Validation**: Type checking, range validation
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables (highest priority)
//! 2. Configuration file
//! 3. Default values (lowest priority)
//!
//! ## Usage
//! ```rust,no_run
//! use precedent_search::config::Config;
//!
//! let config = Config::from_file("config.toml").unwrap();
//! println!("Default page size: {}", config.pagination.default_page_size);
//! ```

use crate::datekey::DateGrammar;
use crate::errors::{Result, SearchError};
use crate::highlight::{DEFAULT_CLOSE_TAG, DEFAULT_OPEN_TAG};
use crate::matcher::MatchPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure containing all engine settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Keyword matching behavior
    pub matching: MatchingConfig,
    /// Highlight marker syntax
    pub highlight: HighlightConfig,
    /// Pagination limits
    pub pagination: PaginationConfig,
    /// Corpus field wiring
    pub data: DataConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Keyword matching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Inclusion policy; exclusion terms always use the strict policy
    pub policy: MatchPolicy,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            policy: MatchPolicy::Elastic,
        }
    }
}

/// Highlight marker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Marker inserted before each matched span
    pub open_tag: String,
    /// Marker inserted after each matched span
    pub close_tag: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            open_tag: DEFAULT_OPEN_TAG.to_string(),
            close_tag: DEFAULT_CLOSE_TAG.to_string(),
        }
    }
}

/// Pagination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Page size used when a query asks for zero
    pub default_page_size: usize,
    /// Hard cap on the page size a query may request
    pub max_page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

/// Corpus field wiring: which fields carry the date, the citation list, and
/// the synthetic category, and which fields participate in matching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Field holding the date text used as the sort key
    pub date_field: String,
    /// Extraction grammar for `date_field`
    pub date_grammar: DateGrammar,
    /// Field holding the raw citation list
    pub reference_field: String,
    /// Synthetic field the loader fills with the corpus category
    pub category_field: String,
    /// Re-render the reference field through the display grouper in results
    pub group_references: bool,
    /// Restrict matching to these fields; empty means all text leaves
    pub search_fields: Vec<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            date_field: "선고일자".to_string(),
            date_grammar: DateGrammar::Field,
            reference_field: "참조조문".to_string(),
            category_field: "분류".to_string(),
            group_references: true,
            search_fields: Vec::new(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file, falling back to defaults
    /// when the file is absent
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| SearchError::Config {
                message: format!("Failed to read config file {:?}: {}", path, e),
            })?;
            toml::from_str(&content)?
        } else {
            tracing::warn!("Configuration file not found: {:?}, using defaults", path);
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("PRECEDENT_SEARCH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(date_field) = std::env::var("PRECEDENT_SEARCH_DATE_FIELD") {
            self.data.date_field = date_field;
        }
        if let Ok(reference_field) = std::env::var("PRECEDENT_SEARCH_REFERENCE_FIELD") {
            self.data.reference_field = reference_field;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.highlight.open_tag.is_empty() || self.highlight.close_tag.is_empty() {
            return Err(SearchError::ValidationFailed {
                field: "highlight".to_string(),
                reason: "open_tag and close_tag must not be empty".to_string(),
            });
        }

        if self.pagination.default_page_size == 0 {
            return Err(SearchError::ValidationFailed {
                field: "pagination.default_page_size".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.pagination.default_page_size > self.pagination.max_page_size {
            return Err(SearchError::ValidationFailed {
                field: "pagination.default_page_size".to_string(),
                reason: "cannot exceed max_page_size".to_string(),
            });
        }

        if self.data.date_field.is_empty() {
            return Err(SearchError::ValidationFailed {
                field: "data.date_field".to_string(),
                reason: "must name a record field".to_string(),
            });
        }

        Ok(())
    }
}
