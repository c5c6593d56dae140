//! # Legal Reference Module
//!
//! ## Purpose
//! Parses raw citation strings ("참조조문") into (statute, article) pairs,
//! maintains the statute → articles lookup table as an immutable snapshot
//! that reloads swap atomically, and re-renders citation lists into the
//! compact display grouping used in search results.
//!
//! ## Input/Output Specification
//! - **Input**: comma/parenthesis-delimited free-text citation lists, e.g.
//!   "형법 제1조, 제2조, 민법 제750조"
//! - **Output**: `CitationRef` pairs, sorted statute/article listings, and
//!   grouped display strings
//! - **Failure policy**: a fragment yielding neither statute nor article is
//!   silently dropped; this is data-quality handling, not an error
//!
//! ## Tokenizer state machine
//! Each fragment is tokenized on whitespace and consumed left to right with
//! two states: `AccumulatingStatute` until the first article token, then
//! `AccumulatingArticle` for that token and everything after it. A fragment
//! with no statute tokens of its own inherits the statute most recently
//! established by an earlier fragment, since citation lists routinely omit
//! the repeated statute name for consecutive articles.

use parking_lot::RwLock;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

/// Article token: "제<digits>조", optionally "의<digits>" or "-<digits>"
const ARTICLE_TOKEN_PATTERN: &str = r"^제\d+조(?:의\d+)?(?:-\d+)?$";

/// Prefix split for display grouping: first statute-looking prefix, rest is
/// the article string
const STATUTE_PREFIX_PATTERN: &str = r"^(.*?)\s*(제\d+조.*)$";

/// One parsed (statute, article) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CitationRef {
    pub statute: String,
    pub article: String,
}

/// Token-consumption state while splitting one fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    AccumulatingStatute,
    AccumulatingArticle,
}

/// Citation string parser
#[derive(Debug, Clone)]
pub struct ReferenceParser {
    article_token: Regex,
}

impl Default for ReferenceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceParser {
    pub fn new() -> Self {
        Self {
            article_token: Regex::new(ARTICLE_TOKEN_PATTERN).unwrap(),
        }
    }

    /// Whether `token` is an article token like "제268조", "제2조의2", "제5조-1"
    pub fn is_article_token(&self, token: &str) -> bool {
        self.article_token.is_match(token)
    }

    /// Split one comma-delimited fragment into (statute, article) strings.
    /// Stray parentheses are discarded before tokenization. Either side may
    /// come back empty.
    pub fn split_fragment(&self, fragment: &str) -> (String, String) {
        let cleaned: String = fragment
            .chars()
            .map(|c| if c == '(' || c == ')' { ' ' } else { c })
            .collect();

        let mut state = ParserState::AccumulatingStatute;
        let mut statute_tokens: Vec<&str> = Vec::new();
        let mut article_tokens: Vec<&str> = Vec::new();

        for token in cleaned.split_whitespace() {
            if self.is_article_token(token) {
                state = ParserState::AccumulatingArticle;
            }
            match state {
                ParserState::AccumulatingStatute => statute_tokens.push(token),
                ParserState::AccumulatingArticle => article_tokens.push(token),
            }
        }

        (statute_tokens.join(" "), article_tokens.join(" "))
    }

    /// Parse a full citation list into (statute, article) pairs, carrying the
    /// last-known statute into fragments that omit it
    pub fn parse(&self, raw: &str) -> Vec<CitationRef> {
        let mut refs = Vec::new();
        let mut last_statute: Option<String> = None;

        for fragment in raw.split(',') {
            let fragment = fragment.trim();
            if fragment.is_empty() {
                continue;
            }
            let (mut statute, article) = self.split_fragment(fragment);
            if !statute.is_empty() {
                last_statute = Some(statute.clone());
            } else if !article.is_empty() {
                if let Some(last) = &last_statute {
                    statute = last.clone();
                }
            }
            if !statute.is_empty() && !article.is_empty() {
                refs.push(CitationRef { statute, article });
            }
        }
        refs
    }
}

/// Immutable statute → articles lookup table, built wholesale at data load
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    by_statute: BTreeMap<String, Vec<String>>,
}

/// Accumulates citation pairs and finalizes them into a `ReferenceTable`
#[derive(Debug, Default)]
pub struct ReferenceTableBuilder {
    by_statute: BTreeMap<String, BTreeSet<String>>,
}

/// Leading numeric index of an article code ("제268조" → 268); 0 when the
/// code carries no digits
fn leading_number(article: &str) -> u64 {
    let digits: String = article
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

impl ReferenceTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every pair parsed from one raw citation field
    pub fn add_reference_field(&mut self, parser: &ReferenceParser, raw: &str) {
        for citation in parser.parse(raw) {
            self.by_statute
                .entry(citation.statute)
                .or_default()
                .insert(citation.article);
        }
    }

    /// Sort each statute's articles by leading numeric index (ties broken
    /// lexicographically) and freeze the table
    pub fn build(self) -> ReferenceTable {
        let by_statute = self
            .by_statute
            .into_iter()
            .map(|(statute, articles)| {
                let mut articles: Vec<String> = articles.into_iter().collect();
                articles.sort_by(|a, b| {
                    leading_number(a)
                        .cmp(&leading_number(b))
                        .then_with(|| a.cmp(b))
                });
                (statute, articles)
            })
            .collect();
        ReferenceTable { by_statute }
    }
}

impl ReferenceTable {
    /// List all known statutes, lexicographically sorted
    pub fn statutes(&self) -> Vec<&str> {
        self.by_statute.keys().map(|s| s.as_str()).collect()
    }

    /// List the sorted articles of one statute; empty for an unknown statute
    pub fn articles(&self, statute: &str) -> &[String] {
        self.by_statute
            .get(statute)
            .map(|articles| articles.as_slice())
            .unwrap_or(&[])
    }

    /// Number of known statutes
    pub fn len(&self) -> usize {
        self.by_statute.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_statute.is_empty()
    }
}

/// Owner of the current `ReferenceTable` snapshot. Reload builds a fresh
/// table and swaps the handle; readers holding an earlier snapshot keep a
/// consistent view and never observe a partially-rebuilt table.
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    current: RwLock<Arc<ReferenceTable>>,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot
    pub fn snapshot(&self) -> Arc<ReferenceTable> {
        Arc::clone(&self.current.read())
    }

    /// Replace the snapshot atomically
    pub fn swap(&self, table: ReferenceTable) {
        debug!(statutes = table.len(), "swapping reference table snapshot");
        *self.current.write() = Arc::new(table);
    }
}

/// Display-only re-rendering of a citation list: fragments sharing a statute
/// are emitted as one cell with the statute named once before its first
/// article. Never affects matching or the statute/article index.
#[derive(Debug, Clone)]
pub struct ReferenceGrouper {
    statute_prefix: Regex,
}

impl Default for ReferenceGrouper {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceGrouper {
    pub fn new() -> Self {
        Self {
            statute_prefix: Regex::new(STATUTE_PREFIX_PATTERN).unwrap(),
        }
    }

    /// Group a raw citation list for display. Fragments with no recognizable
    /// statute prefix land in an empty-statute bucket and pass through
    /// unchanged, without statute inheritance.
    pub fn group(&self, raw: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }

        // First-appearance order of statute buckets is preserved
        let mut buckets: Vec<(String, Vec<String>)> = Vec::new();
        for fragment in raw.split(',') {
            let fragment = fragment.trim();
            if fragment.is_empty() {
                continue;
            }
            let (statute, article) = match self.statute_prefix.captures(fragment) {
                Some(caps) => (
                    caps.get(1).map_or("", |m| m.as_str()).trim().to_string(),
                    caps.get(2).map_or("", |m| m.as_str()).trim().to_string(),
                ),
                None => (String::new(), fragment.to_string()),
            };
            match buckets.iter_mut().find(|(s, _)| *s == statute) {
                Some((_, articles)) => articles.push(article),
                None => buckets.push((statute, vec![article])),
            }
        }

        let cells: Vec<String> = buckets
            .into_iter()
            .map(|(statute, articles)| {
                if statute.is_empty() {
                    articles.join(", ")
                } else {
                    let mut cell = vec![format!("{} {}", statute, articles[0])];
                    cell.extend(articles.into_iter().skip(1));
                    cell.join(", ")
                }
            })
            .collect();
        cells.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_token_classification() {
        let parser = ReferenceParser::new();
        assert!(parser.is_article_token("제1조"));
        assert!(parser.is_article_token("제2조의2"));
        assert!(parser.is_article_token("제268조-1"));
        assert!(!parser.is_article_token("형법"));
        assert!(!parser.is_article_token("제조"));
        assert!(!parser.is_article_token("제1조와"));
    }

    #[test]
    fn test_split_fragment_state_machine() {
        let parser = ReferenceParser::new();
        assert_eq!(
            parser.split_fragment("형법 제268조"),
            ("형법".to_string(), "제268조".to_string())
        );
        // Everything after the first article token stays in the article string
        assert_eq!(
            parser.split_fragment("형사소송법 제312조 제1항"),
            ("형사소송법".to_string(), "제312조 제1항".to_string())
        );
        // Parentheses are discarded before tokenization
        assert_eq!(
            parser.split_fragment("민법 제750조 (불법행위)"),
            ("민법".to_string(), "제750조 불법행위".to_string())
        );
        assert_eq!(
            parser.split_fragment("제2조"),
            (String::new(), "제2조".to_string())
        );
    }

    #[test]
    fn test_parse_inherits_previous_statute() {
        let parser = ReferenceParser::new();
        let refs = parser.parse("형법 제1조, 제2조, 민법 제750조");
        assert_eq!(
            refs,
            vec![
                CitationRef {
                    statute: "형법".to_string(),
                    article: "제1조".to_string()
                },
                CitationRef {
                    statute: "형법".to_string(),
                    article: "제2조".to_string()
                },
                CitationRef {
                    statute: "민법".to_string(),
                    article: "제750조".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_parse_drops_useless_fragments() {
        let parser = ReferenceParser::new();
        // A leading bare article has no statute to attach to; a fragment with
        // neither side is dropped silently
        assert!(parser.parse("제1조").is_empty());
        assert!(parser.parse(" , ,, ").is_empty());
        // A statute-only fragment establishes context without emitting a pair
        let refs = parser.parse("형법, 제2조");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].statute, "형법");
        assert_eq!(refs[0].article, "제2조");
    }

    #[test]
    fn test_table_sorts_articles_numerically() {
        let parser = ReferenceParser::new();
        let mut builder = ReferenceTableBuilder::new();
        builder.add_reference_field(&parser, "형법 제10조, 제2조, 제2조의2, 제1조");
        builder.add_reference_field(&parser, "민법 제750조");
        let table = builder.build();

        assert_eq!(table.statutes(), vec!["민법", "형법"]);
        assert_eq!(
            table.articles("형법"),
            &[
                "제1조".to_string(),
                "제2조".to_string(),
                "제2조의2".to_string(),
                "제10조".to_string()
            ]
        );
        assert!(table.articles("없는법").is_empty());
    }

    #[test]
    fn test_table_deduplicates_articles() {
        let parser = ReferenceParser::new();
        let mut builder = ReferenceTableBuilder::new();
        builder.add_reference_field(&parser, "형법 제1조");
        builder.add_reference_field(&parser, "형법 제1조, 제2조");
        let table = builder.build();
        assert_eq!(table.articles("형법").len(), 2);
    }

    #[test]
    fn test_index_snapshot_swap() {
        let index = ReferenceIndex::new();
        let before = index.snapshot();
        assert!(before.is_empty());

        let parser = ReferenceParser::new();
        let mut builder = ReferenceTableBuilder::new();
        builder.add_reference_field(&parser, "형법 제1조");
        index.swap(builder.build());

        // The old snapshot stays consistent; the new one is visible
        assert!(before.is_empty());
        assert_eq!(index.snapshot().statutes(), vec!["형법"]);
    }

    #[test]
    fn test_group_names_each_statute_once() {
        let grouper = ReferenceGrouper::new();
        assert_eq!(
            grouper.group("형법 제1조, 제2조, 민법 제750조"),
            "형법 제1조, 제2조, 민법 제750조"
        );
        assert_eq!(
            grouper.group("형법 제1조, 형법 제2조, 민법 제750조"),
            "형법 제1조, 제2조, 민법 제750조"
        );
    }

    #[test]
    fn test_group_passes_unrecognized_fragments_through() {
        let grouper = ReferenceGrouper::new();
        assert_eq!(grouper.group("헌법재판소법"), "헌법재판소법");
        assert_eq!(grouper.group(""), "");
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("제268조"), 268);
        assert_eq!(leading_number("제2조의2"), 2);
        assert_eq!(leading_number("조문없음"), 0);
    }
}
