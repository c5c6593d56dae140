//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the precedent search engine. The matching,
//! highlighting, reference-parsing and date-key components are total functions
//! and never surface errors; the types here cover the fallible edges of the
//! system (configuration loading, corpus loading) plus the per-keyword
//! pattern-construction failures the highlighter reports without propagating.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from configuration, loading, and highlighting
//! - **Output**: Structured error types with context
//! - **Error Categories**: Configuration, Corpus, Highlight
//!
//! ## Usage
//! ```rust
//! use precedent_search::errors::{Result, SearchError};
//!
//! fn load_step() -> Result<()> {
//!     Err(SearchError::Config {
//!         message: "highlight.open_tag must not be empty".to_string(),
//!     })
//! }
//! ```

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, SearchError>;

/// Error types for the precedent search engine
#[derive(Debug, Error)]
pub enum SearchError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation failed for field '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },

    /// Corpus parsing errors
    #[error("Failed to parse corpus data from {source_name}: {details}")]
    CorpusParsing {
        source_name: String,
        details: String,
    },

    /// Highlight pattern construction failure for a single keyword
    #[error("Invalid highlight pattern for keyword '{keyword}': {details}")]
    InvalidPattern { keyword: String, details: String },

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SearchError {
    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            SearchError::Config { .. } | SearchError::Toml(_) => "configuration",
            SearchError::CorpusParsing { .. } | SearchError::Io(_) | SearchError::Json(_) => {
                "corpus"
            }
            SearchError::InvalidPattern { .. } => "highlight",
            SearchError::ValidationFailed { .. } => "generic",
        }
    }
}
