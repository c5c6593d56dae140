//! # Corpus Loading Module
//!
//! ## Purpose
//! Data-loading collaborator for the engine: reads the precedent corpus from
//! its JSON shape (category name → list of case objects), flattens it into
//! records carrying a synthetic category field, and builds the reference
//! table from the configured citation field. All I/O lives here; the engine
//! proper never touches a file.
//!
//! ## Input/Output Specification
//! - **Input**: UTF-8 JSON corpus files, possibly BOM-prefixed
//! - **Output**: `Vec<Record>` plus a `ReferenceTable` ready to swap into a
//!   `ReferenceIndex`
//! - **Failure**: malformed files surface as `CorpusParsing`; an empty
//!   corpus loads successfully with a warning, searches then return empty
//!   envelopes

use crate::config::{Config, DataConfig};
use crate::errors::{Result, SearchError};
use crate::record::{FieldValue, Record};
use crate::reference::{ReferenceParser, ReferenceTable, ReferenceTableBuilder};
use std::path::Path;
use tracing::{info, warn};

/// Loads corpus files and derives the reference table
#[derive(Debug, Clone)]
pub struct CorpusLoader {
    data: DataConfig,
}

impl CorpusLoader {
    pub fn new(config: &Config) -> Self {
        Self {
            data: config.data.clone(),
        }
    }

    /// Load a corpus file of the shape `{ category: [case, ...], ... }`
    pub fn load_json_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Record>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        self.load_json_str(&path.to_string_lossy(), &content)
    }

    /// Parse corpus JSON from memory; `source_name` is used in diagnostics
    pub fn load_json_str(&self, source_name: &str, content: &str) -> Result<Vec<Record>> {
        // Files exported from Windows tooling often carry a BOM
        let content = content.strip_prefix('\u{FEFF}').unwrap_or(content);
        // Deserialized through FieldValue so category and field order follow
        // the document, not a sorted map
        let parsed: FieldValue =
            serde_json::from_str(content).map_err(|e| SearchError::CorpusParsing {
                source_name: source_name.to_string(),
                details: e.to_string(),
            })?;

        let categories = match parsed {
            FieldValue::Record(map) => map,
            other => {
                return Err(SearchError::CorpusParsing {
                    source_name: source_name.to_string(),
                    details: format!("expected a category mapping at the top level, got {:?}", other),
                })
            }
        };

        let mut records = Vec::new();
        for (category, cases) in categories.iter() {
            let cases = match cases {
                FieldValue::Sequence(cases) => cases,
                other => {
                    return Err(SearchError::CorpusParsing {
                        source_name: source_name.to_string(),
                        details: format!(
                            "expected a case list under category '{}', got {:?}",
                            category, other
                        ),
                    })
                }
            };
            for case in cases {
                let mut record = match case {
                    FieldValue::Record(record) => record.clone(),
                    other => {
                        return Err(SearchError::CorpusParsing {
                            source_name: source_name.to_string(),
                            details: format!(
                                "expected a case object under category '{}', got {:?}",
                                category, other
                            ),
                        })
                    }
                };
                // The category participates in matching and filtering like
                // any other field
                record.insert(
                    self.data.category_field.clone(),
                    FieldValue::Text(category.to_string()),
                );
                records.push(record);
            }
        }

        if records.is_empty() {
            warn!(source = source_name, "corpus is empty, searches will return no results");
        } else {
            info!(source = source_name, cases = records.len(), "corpus loaded");
        }
        Ok(records)
    }

    /// Build the statute → articles table from every record's citation field
    pub fn build_reference_table(&self, records: &[Record]) -> ReferenceTable {
        let parser = ReferenceParser::new();
        let mut builder = ReferenceTableBuilder::new();
        for record in records {
            if let Some(raw) = record.get_text(&self.data.reference_field) {
                builder.add_reference_field(&parser, raw);
            }
        }
        let table = builder.build();
        info!(statutes = table.len(), "reference table built");
        table
    }
}
