//! # Query Evaluation Module
//!
//! ## Purpose
//! Combines per-field keyword matches into a record-level boolean decision
//! given a combination mode, a keyword list, and an exclusion list.
//!
//! ## Input/Output Specification
//! - **Input**: the text fields extracted from one record plus a `QuerySpec`
//! - **Output**: a `MatchResult` with the decision and the contributing
//!   keywords (diagnostics only, never used for filtering)
//!
//! ## Mode semantics (non-empty keyword list)
//! - `SINGLE`: the first keyword matches some field
//! - `OR`: any keyword matches some field
//! - `AND`: every keyword matches at least one field (fields may differ)
//! - `AND_OR`: the first keyword matches some field AND at least one of the
//!   remaining keywords matches some field; with fewer than two keywords this
//!   degrades to `SINGLE` semantics
//!
//! An empty keyword list matches every record, so filtering falls through to
//! exclusion and field filters only. Exclusion terms are checked first with
//! the strict policy and short-circuit the evaluation.

use crate::matcher::{KeywordMatcher, MatchPolicy};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Boolean combination mode for the keyword list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchMode {
    Single,
    Or,
    And,
    AndOr,
}

impl Default for SearchMode {
    fn default() -> Self {
        SearchMode::Single
    }
}

/// Result ordering requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Preserve corpus order
    Default,
    /// Newest decision date first
    Latest,
    /// Oldest decision date first
    Oldest,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Default
    }
}

/// One search request as supplied by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuerySpec {
    /// Keyword combination mode
    pub mode: SearchMode,
    /// Ordered keyword list; empty list means "match everything"
    pub keywords: Vec<String>,
    /// Exclusion terms; any strict match rejects the record
    pub exclude: Vec<String>,
    /// Result ordering
    pub sort_by: SortOrder,
    /// 1-based page number
    pub page: usize,
    /// Page size; 0 falls back to the configured default
    pub page_size: usize,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            mode: SearchMode::Single,
            keywords: Vec::new(),
            exclude: Vec::new(),
            sort_by: SortOrder::Default,
            page: 1,
            page_size: 20,
        }
    }
}

impl QuerySpec {
    /// Convenience constructor for a single-keyword query
    pub fn single(keyword: impl Into<String>) -> Self {
        Self {
            keywords: vec![keyword.into()],
            ..Self::default()
        }
    }
}

/// Record-level match decision with diagnostic keyword attribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Whether the record passed keyword and exclusion checks
    pub matched: bool,
    /// Keywords that contributed to the match, in query order
    pub matched_keywords: Vec<String>,
}

impl MatchResult {
    fn rejected() -> Self {
        Self {
            matched: false,
            matched_keywords: Vec::new(),
        }
    }
}

/// Evaluates a `QuerySpec` against the text fields of one record
#[derive(Debug, Clone)]
pub struct QueryEvaluator {
    matcher: KeywordMatcher,
}

impl QueryEvaluator {
    /// Create an evaluator using the given inclusion policy. Exclusion terms
    /// always use the strict policy.
    pub fn new(policy: MatchPolicy) -> Self {
        Self {
            matcher: KeywordMatcher::new(policy),
        }
    }

    fn any_field_matches(&self, keyword: &str, fields: &[&str]) -> bool {
        fields.iter().any(|field| self.matcher.matches(keyword, field))
    }

    /// Evaluate inclusion and exclusion for one record's fields
    pub fn evaluate(&self, fields: &[&str], spec: &QuerySpec) -> MatchResult {
        // Exclusion short-circuits before any keyword work
        let excluded = spec.exclude.iter().any(|term| {
            fields
                .iter()
                .any(|field| KeywordMatcher::strict_match(term, field))
        });
        if excluded {
            return MatchResult::rejected();
        }

        if spec.keywords.is_empty() {
            return MatchResult {
                matched: true,
                matched_keywords: Vec::new(),
            };
        }

        let result = match spec.mode {
            SearchMode::Single => self.evaluate_single(fields, spec),
            SearchMode::Or => self.evaluate_or(fields, spec),
            SearchMode::And => self.evaluate_and(fields, spec),
            SearchMode::AndOr => {
                if spec.keywords.len() < 2 {
                    self.evaluate_single(fields, spec)
                } else {
                    self.evaluate_and_or(fields, spec)
                }
            }
        };

        for keyword in &result.matched_keywords {
            debug!(keyword = keyword.as_str(), "keyword matched");
        }
        result
    }

    fn evaluate_single(&self, fields: &[&str], spec: &QuerySpec) -> MatchResult {
        let first = &spec.keywords[0];
        if self.any_field_matches(first, fields) {
            MatchResult {
                matched: true,
                matched_keywords: vec![first.clone()],
            }
        } else {
            MatchResult::rejected()
        }
    }

    fn evaluate_or(&self, fields: &[&str], spec: &QuerySpec) -> MatchResult {
        let matched_keywords: Vec<String> = spec
            .keywords
            .iter()
            .filter(|kw| self.any_field_matches(kw, fields))
            .cloned()
            .collect();
        MatchResult {
            matched: !matched_keywords.is_empty(),
            matched_keywords,
        }
    }

    fn evaluate_and(&self, fields: &[&str], spec: &QuerySpec) -> MatchResult {
        if spec
            .keywords
            .iter()
            .all(|kw| self.any_field_matches(kw, fields))
        {
            MatchResult {
                matched: true,
                matched_keywords: spec.keywords.clone(),
            }
        } else {
            MatchResult::rejected()
        }
    }

    fn evaluate_and_or(&self, fields: &[&str], spec: &QuerySpec) -> MatchResult {
        let first = &spec.keywords[0];
        if !self.any_field_matches(first, fields) {
            return MatchResult::rejected();
        }
        let rest: Vec<String> = spec.keywords[1..]
            .iter()
            .filter(|kw| self.any_field_matches(kw, fields))
            .cloned()
            .collect();
        if rest.is_empty() {
            return MatchResult::rejected();
        }
        let mut matched_keywords = vec![first.clone()];
        matched_keywords.extend(rest);
        MatchResult {
            matched: true,
            matched_keywords,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluator() -> QueryEvaluator {
        QueryEvaluator::new(MatchPolicy::Elastic)
    }

    fn spec(mode: SearchMode, keywords: &[&str]) -> QuerySpec {
        QuerySpec {
            mode,
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            ..QuerySpec::default()
        }
    }

    const FIELDS: [&str; 3] = ["형법 제268조", "업무상 과실치사", "피고인의 고의 없음"];

    #[test]
    fn test_empty_keywords_match_everything() {
        for mode in [
            SearchMode::Single,
            SearchMode::Or,
            SearchMode::And,
            SearchMode::AndOr,
        ] {
            let result = evaluator().evaluate(&FIELDS, &spec(mode, &[]));
            assert!(result.matched);
            assert!(result.matched_keywords.is_empty());
        }
    }

    #[test]
    fn test_single_uses_only_first_keyword() {
        let result = evaluator().evaluate(&FIELDS, &spec(SearchMode::Single, &["없는것", "형법"]));
        assert!(!result.matched);
        let result = evaluator().evaluate(&FIELDS, &spec(SearchMode::Single, &["형법", "없는것"]));
        assert!(result.matched);
        assert_eq!(result.matched_keywords, vec!["형법"]);
    }

    #[test]
    fn test_or_matches_any_keyword() {
        let result = evaluator().evaluate(&FIELDS, &spec(SearchMode::Or, &["없는것", "고의"]));
        assert!(result.matched);
        assert_eq!(result.matched_keywords, vec!["고의"]);
    }

    #[test]
    fn test_and_requires_all_keywords() {
        assert!(
            evaluator()
                .evaluate(&FIELDS, &spec(SearchMode::And, &["형법", "과실", "고의"]))
                .matched
        );
        assert!(
            !evaluator()
                .evaluate(&FIELDS, &spec(SearchMode::And, &["형법", "없는것"]))
                .matched
        );
    }

    #[test]
    fn test_and_or_semantics() {
        // First keyword plus at least one of the rest
        let fields = ["형법 제268조", "피고인의 고의"];
        let result =
            evaluator().evaluate(&fields, &spec(SearchMode::AndOr, &["형법", "과실", "고의"]));
        assert!(result.matched);
        assert_eq!(result.matched_keywords, vec!["형법", "고의"]);

        let fields = ["형법 제268조"];
        let result =
            evaluator().evaluate(&fields, &spec(SearchMode::AndOr, &["형법", "과실", "고의"]));
        assert!(!result.matched);
    }

    #[test]
    fn test_and_or_degrades_to_single_below_two_keywords() {
        let result = evaluator().evaluate(&FIELDS, &spec(SearchMode::AndOr, &["형법"]));
        assert!(result.matched);
        assert_eq!(result.matched_keywords, vec!["형법"]);
    }

    #[test]
    fn test_exclusion_rejects_regardless_of_keywords() {
        let mut query = spec(SearchMode::Or, &["형법"]);
        query.exclude = vec!["고의".to_string()];
        assert!(!evaluator().evaluate(&FIELDS, &query).matched);

        // Exclusion applies even with an empty keyword list
        let mut query = spec(SearchMode::Single, &[]);
        query.exclude = vec!["과 실".to_string()];
        assert!(!evaluator().evaluate(&FIELDS, &query).matched);
    }

    #[test]
    fn test_empty_string_keyword_never_matches() {
        let result = evaluator().evaluate(&FIELDS, &spec(SearchMode::Or, &[""]));
        assert!(!result.matched);
    }

    #[test]
    fn test_query_spec_wire_format() {
        let json = r#"{
            "mode": "AND_OR",
            "keywords": ["형법", "과실"],
            "exclude": ["고의"],
            "sortBy": "latest",
            "page": 2,
            "pageSize": 10
        }"#;
        let query: QuerySpec = serde_json::from_str(json).unwrap();
        assert_eq!(query.mode, SearchMode::AndOr);
        assert_eq!(query.sort_by, SortOrder::Latest);
        assert_eq!(query.page_size, 10);
    }

    #[test]
    fn test_query_spec_defaults() {
        let query: QuerySpec = serde_json::from_str("{}").unwrap();
        assert_eq!(query.mode, SearchMode::Single);
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 20);
        assert!(query.keywords.is_empty());
    }
}
