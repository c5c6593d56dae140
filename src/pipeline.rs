//! # Search Pipeline Module
//!
//! ## Purpose
//! Orchestrates one search request over an in-memory record set: field
//! filter → keyword/exclusion evaluation → sort-key extraction → ordering →
//! pagination → display transforms and highlighting. The pipeline holds no
//! mutable state; every call is a bounded, synchronous scan that is safe to
//! run in parallel across independent requests.
//!
//! ## Input/Output Specification
//! - **Input**: a record slice (owned by the data-loading collaborator), a
//!   `QuerySpec`, and optionally a field-filter predicate
//! - **Output**: `{ total, page, pageSize, results }` where results carry
//!   highlight markers in their text leaves
//! - **Ordering**: stable with respect to ties on the sort key; `DEFAULT`
//!   preserves corpus order
//!
//! Out-of-range pages return an empty result slice, never an error; an empty
//! record set returns an empty envelope.

use crate::config::{Config, DataConfig, PaginationConfig};
use crate::datekey::{DateKeyNormalizer, SortKey};
use crate::highlight::Highlighter;
use crate::query::{QueryEvaluator, QuerySpec, SortOrder};
use crate::record::Record;
use crate::reference::ReferenceGrouper;
use serde::Serialize;
use tracing::debug;

/// Paginated result envelope returned to the caller
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Post-filter, pre-pagination hit count
    pub total: usize,
    /// 1-based page number as requested
    pub page: usize,
    /// Effective page size
    pub page_size: usize,
    /// Highlighted records for the requested page
    pub results: Vec<Record>,
}

/// Restricts a search to selected corpus categories. The sentinel category
/// "전체" (or an empty selection) passes every record.
#[derive(Debug, Clone)]
pub struct CategoryFilter {
    field: String,
    categories: Vec<String>,
}

impl CategoryFilter {
    pub fn new(field: impl Into<String>, categories: Vec<String>) -> Self {
        Self {
            field: field.into(),
            categories,
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        if self.categories.is_empty() || self.categories.iter().any(|c| c == "전체") {
            return true;
        }
        match record.get_text(&self.field) {
            Some(category) => self.categories.iter().any(|c| c == category),
            None => false,
        }
    }
}

/// Restricts a search to records citing a selected statute, optionally a
/// specific article of it, by containment against the raw reference field.
#[derive(Debug, Clone)]
pub struct ReferenceFilter {
    field: String,
    statute: String,
    article: Option<String>,
}

impl ReferenceFilter {
    pub fn new(field: impl Into<String>, statute: impl Into<String>, article: Option<String>) -> Self {
        Self {
            field: field.into(),
            statute: statute.into(),
            article,
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        if self.statute.is_empty() {
            return true;
        }
        let raw = record.get_text(&self.field).unwrap_or("");
        if !raw.contains(&self.statute) {
            return false;
        }
        match &self.article {
            Some(article) if !article.is_empty() => {
                raw.contains(&format!("{} {}", self.statute, article))
            }
            _ => true,
        }
    }
}

/// One-way orchestration of the matching, sorting and highlighting steps
#[derive(Debug, Clone)]
pub struct SearchPipeline {
    evaluator: QueryEvaluator,
    highlighter: Highlighter,
    date_keys: DateKeyNormalizer,
    grouper: ReferenceGrouper,
    data: DataConfig,
    pagination: PaginationConfig,
}

impl SearchPipeline {
    /// Build a pipeline from the engine configuration
    pub fn new(config: &Config) -> Self {
        Self {
            evaluator: QueryEvaluator::new(config.matching.policy),
            highlighter: Highlighter::new(
                config.highlight.open_tag.clone(),
                config.highlight.close_tag.clone(),
            ),
            date_keys: DateKeyNormalizer::new(),
            grouper: ReferenceGrouper::new(),
            data: config.data.clone(),
            pagination: config.pagination.clone(),
        }
    }

    /// Search the whole record set
    pub fn search(&self, records: &[Record], spec: &QuerySpec) -> SearchResponse {
        self.search_filtered(records, spec, |_| true)
    }

    /// Search the subset of records passing `filter`
    pub fn search_filtered<F>(&self, records: &[Record], spec: &QuerySpec, filter: F) -> SearchResponse
    where
        F: Fn(&Record) -> bool,
    {
        // Filter and evaluate, keeping corpus order
        let mut hits: Vec<(SortKey, &Record)> = Vec::new();
        for record in records {
            if !filter(record) {
                continue;
            }
            let fields = self.match_fields(record);
            if !self.evaluator.evaluate(&fields, spec).matched {
                continue;
            }
            let date_text = record.get_text(&self.data.date_field).unwrap_or("");
            let key = self.date_keys.to_sort_key(date_text, self.data.date_grammar);
            hits.push((key, record));
        }

        // Stable sorts keep corpus order for tied keys
        match spec.sort_by {
            SortOrder::Default => {}
            SortOrder::Latest => hits.sort_by(|a, b| b.0.cmp(&a.0)),
            SortOrder::Oldest => hits.sort_by(|a, b| a.0.cmp(&b.0)),
        }

        let total = hits.len();
        let page_size = self.effective_page_size(spec.page_size);
        let start = spec.page.saturating_sub(1).saturating_mul(page_size).min(total);
        let end = start.saturating_add(page_size).min(total);
        debug!(total, page = spec.page, page_size, "search evaluated");

        let results = hits[start..end]
            .iter()
            .map(|(_, record)| self.render(record, &spec.keywords))
            .collect();

        SearchResponse {
            total,
            page: spec.page,
            page_size,
            results,
        }
    }

    /// The text fields one record exposes to matching: the configured
    /// subset, or every reachable text leaf when none is configured
    fn match_fields<'a>(&self, record: &'a Record) -> Vec<&'a str> {
        if self.data.search_fields.is_empty() {
            record.collect_text()
        } else {
            self.data
                .search_fields
                .iter()
                .filter_map(|name| record.get_text(name))
                .collect()
        }
    }

    /// Display transforms for one result: reference grouping on the
    /// configured citation field, then highlighting with the original
    /// keyword list
    fn render(&self, record: &Record, keywords: &[String]) -> Record {
        let record = if self.data.group_references {
            record.map_text_field(&self.data.reference_field, |raw| self.grouper.group(raw))
        } else {
            record.clone()
        };
        self.highlighter.highlight_record(&record, keywords)
    }

    fn effective_page_size(&self, requested: usize) -> usize {
        if requested == 0 {
            self.pagination.default_page_size
        } else {
            requested.min(self.pagination.max_page_size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;

    fn record(title: &str, date: &str, refs: &str) -> Record {
        let mut r = Record::new();
        r.insert("제목", FieldValue::from(title));
        r.insert("선고일자", FieldValue::from(date));
        r.insert("참조조문", FieldValue::from(refs));
        r
    }

    fn pipeline() -> SearchPipeline {
        SearchPipeline::new(&Config::default())
    }

    fn corpus() -> Vec<Record> {
        vec![
            record("업무상과실치사 사건", "2021. 3. 15.", "형법 제268조"),
            record("사기 사건", "2019. 1. 5.", "형법 제347조, 제348조"),
            record("불법행위 손해배상", "날짜미상", "민법 제750조"),
        ]
    }

    #[test]
    fn test_latest_sorts_unknown_dates_last() {
        let spec = QuerySpec {
            sort_by: SortOrder::Latest,
            ..QuerySpec::default()
        };
        let response = pipeline().search(&corpus(), &spec);
        assert_eq!(response.total, 3);
        let titles: Vec<_> = response
            .results
            .iter()
            .map(|r| r.get_text("제목").unwrap())
            .collect();
        assert_eq!(
            titles,
            vec!["업무상과실치사 사건", "사기 사건", "불법행위 손해배상"]
        );
    }

    #[test]
    fn test_default_order_preserves_corpus_order() {
        let response = pipeline().search(&corpus(), &QuerySpec::default());
        let titles: Vec<_> = response
            .results
            .iter()
            .map(|r| r.get_text("제목").unwrap())
            .collect();
        assert_eq!(
            titles,
            vec!["업무상과실치사 사건", "사기 사건", "불법행위 손해배상"]
        );
    }

    #[test]
    fn test_results_are_highlighted_and_grouped() {
        let spec = QuerySpec::single("사기");
        let response = pipeline().search(&corpus(), &spec);
        assert_eq!(response.total, 1);
        let hit = &response.results[0];
        assert_eq!(hit.get_text("제목"), Some("<mark>사기</mark> 사건"));
        // The citation list is re-rendered with the statute named once
        assert_eq!(hit.get_text("참조조문"), Some("형법 제347조, 제348조"));
    }

    #[test]
    fn test_reference_filter() {
        let filter = ReferenceFilter::new("참조조문", "형법", None);
        let response =
            pipeline().search_filtered(&corpus(), &QuerySpec::default(), |r| filter.matches(r));
        assert_eq!(response.total, 2);

        let filter = ReferenceFilter::new("참조조문", "형법", Some("제268조".to_string()));
        let response =
            pipeline().search_filtered(&corpus(), &QuerySpec::default(), |r| filter.matches(r));
        assert_eq!(response.total, 1);
        assert_eq!(
            response.results[0].get_text("제목"),
            Some("업무상과실치사 사건")
        );
    }

    #[test]
    fn test_category_filter_sentinel_passes_everything() {
        let mut records = corpus();
        for (i, r) in records.iter_mut().enumerate() {
            r.insert("분류", FieldValue::from(if i == 0 { "형사" } else { "민사" }));
        }
        let all = CategoryFilter::new("분류", vec!["전체".to_string()]);
        assert_eq!(
            pipeline()
                .search_filtered(&records, &QuerySpec::default(), |r| all.matches(r))
                .total,
            3
        );
        let criminal = CategoryFilter::new("분류", vec!["형사".to_string()]);
        assert_eq!(
            pipeline()
                .search_filtered(&records, &QuerySpec::default(), |r| criminal.matches(r))
                .total,
            1
        );
    }

    #[test]
    fn test_empty_record_set() {
        let response = pipeline().search(&[], &QuerySpec::single("형법"));
        assert_eq!(response.total, 0);
        assert!(response.results.is_empty());
    }

    #[test]
    fn test_zero_page_size_uses_default() {
        let spec = QuerySpec {
            page_size: 0,
            ..QuerySpec::default()
        };
        let response = pipeline().search(&corpus(), &spec);
        assert_eq!(response.page_size, 20);
    }

    #[test]
    fn test_search_fields_projection() {
        let mut config = Config::default();
        config.data.search_fields = vec!["제목".to_string()];
        let pipeline = SearchPipeline::new(&config);
        // "제268조" only appears in the reference field, which is no longer
        // part of the match projection
        let response = pipeline.search(&corpus(), &QuerySpec::single("제268조"));
        assert_eq!(response.total, 0);
        let response = pipeline.search(&corpus(), &QuerySpec::single("과실치사"));
        assert_eq!(response.total, 1);
    }
}
