//! # Precedent Search Engine
//!
//! ## Overview
//! This library implements the matching and normalization engine behind a
//! Korean court precedent search service: whitespace/invisible-character
//! tolerant keyword matching, boolean query evaluation across record fields,
//! match highlighting, legal-citation parsing and grouping, and robust date
//! extraction used purely as a sort key.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `normalize`: invisible-character and whitespace stripping
//! - `matcher`: strict and elastic keyword matching policies
//! - `query`: boolean combination modes and record-level evaluation
//! - `highlight`: match-span markup tolerant of whitespace variance
//! - `reference`: citation parsing, statute/article tables, display grouping
//! - `datekey`: free-text date extraction into sortable keys
//! - `pipeline`: filter → evaluate → sort → paginate → highlight
//! - `loader`: corpus loading collaborator (the only I/O in the crate)
//! - `config`: configuration management and settings
//! - `errors`: centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: in-memory case records, search query specifications
//! - **Output**: paginated, highlighted, chronologically sortable results
//! - **Guarantees**: every engine operation is total over arbitrary text;
//!   malformed data degrades to sentinels, never to failures
//!
//! ## Usage
//! ```rust
//! use precedent_search::{Config, CorpusLoader, QuerySpec, SearchPipeline};
//!
//! let config = Config::default();
//! let loader = CorpusLoader::new(&config);
//! let records = loader
//!     .load_json_str("inline", r#"{"형사": [{"제목": "과실치사 사건"}]}"#)
//!     .unwrap();
//! let pipeline = SearchPipeline::new(&config);
//! let response = pipeline.search(&records, &QuerySpec::single("과실"));
//! println!("Found {} results", response.total);
//! ```

// Core modules
pub mod config;
pub mod errors;
pub mod record;
pub mod normalize;
pub mod matcher;
pub mod query;
pub mod highlight;
pub mod reference;
pub mod datekey;
pub mod pipeline;
pub mod loader;

// Re-exports for convenience
pub use config::Config;
pub use datekey::{DateGrammar, DateKeyNormalizer, SortKey};
pub use errors::{Result, SearchError};
pub use highlight::Highlighter;
pub use loader::CorpusLoader;
pub use matcher::{KeywordMatcher, MatchPolicy};
pub use normalize::TextNormalizer;
pub use pipeline::{CategoryFilter, ReferenceFilter, SearchPipeline, SearchResponse};
pub use query::{MatchResult, QueryEvaluator, QuerySpec, SearchMode, SortOrder};
pub use record::{FieldValue, Record};
pub use reference::{
    CitationRef, ReferenceGrouper, ReferenceIndex, ReferenceParser, ReferenceTable,
    ReferenceTableBuilder,
};
