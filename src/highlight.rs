//! # Highlight Module
//!
//! ## Purpose
//! Re-scans matched text and wraps matched spans in display markers, tolerant
//! of the same whitespace variance as the elastic matcher. Calling UIs render
//! the marker syntax, they never reinterpret it.
//!
//! ## Input/Output Specification
//! - **Input**: field text plus the original (non-normalized) keyword list
//! - **Output**: text with paired markers around matched spans, and a report
//!   of keywords whose pattern could not be built
//! - **Invariant**: markers never nest or corrupt each other; all keywords'
//!   match ranges are collected against the original text, merged, and the
//!   markers are inserted in a single reconstruction pass
//!
//! A keyword whose pattern fails to compile is skipped: its failure is logged
//! and reported per keyword, and the rest of the batch proceeds unaffected.

use crate::errors::SearchError;
use crate::normalize::TextNormalizer;
use crate::record::Record;
use regex::RegexBuilder;
use tracing::warn;

/// Default opening marker
pub const DEFAULT_OPEN_TAG: &str = "<mark>";
/// Default closing marker
pub const DEFAULT_CLOSE_TAG: &str = "</mark>";

/// Match-span highlighter
#[derive(Debug, Clone)]
pub struct Highlighter {
    open_tag: String,
    close_tag: String,
}

/// Outcome of highlighting one piece of text
#[derive(Debug)]
pub struct HighlightReport {
    /// The marked-up text
    pub text: String,
    /// Per-keyword failures; the corresponding keywords contributed no spans
    pub skipped: Vec<SearchError>,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(DEFAULT_OPEN_TAG, DEFAULT_CLOSE_TAG)
    }
}

impl Highlighter {
    /// Create a highlighter with the given marker pair
    pub fn new(open_tag: impl Into<String>, close_tag: impl Into<String>) -> Self {
        Self {
            open_tag: open_tag.into(),
            close_tag: close_tag.into(),
        }
    }

    /// Build the elastic match pattern for one keyword: escaped characters
    /// joined by optional whitespace runs, case-insensitive. A
    /// single-character keyword is matched literally.
    fn keyword_pattern(keyword: &str) -> Result<regex::Regex, SearchError> {
        let chars: Vec<String> = keyword.chars().map(|c| regex::escape(&c.to_string())).collect();
        let pattern = if chars.len() > 1 {
            chars.join(r"\s*")
        } else {
            chars.concat()
        };
        RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| SearchError::InvalidPattern {
                keyword: keyword.to_string(),
                details: e.to_string(),
            })
    }

    /// Highlight every matched span of `keywords` in `text`, reporting
    /// per-keyword pattern failures.
    ///
    /// Spans are located on `text` as given: keywords may stretch across
    /// whitespace but not across invisible characters, so a record that
    /// matched only because invisible characters were stripped during
    /// matching comes back unmarked.
    pub fn apply(&self, text: &str, keywords: &[String]) -> HighlightReport {
        let mut ranges: Vec<(usize, usize)> = Vec::new();
        let mut skipped = Vec::new();

        for keyword in keywords {
            let keyword = TextNormalizer::strip_invisible(keyword);
            if keyword.is_empty() {
                continue;
            }
            match Self::keyword_pattern(&keyword) {
                Ok(pattern) => {
                    for m in pattern.find_iter(text) {
                        if m.start() < m.end() {
                            ranges.push((m.start(), m.end()));
                        }
                    }
                }
                Err(err) => {
                    warn!(keyword = keyword.as_str(), error = %err, "skipping highlight keyword");
                    skipped.push(err);
                }
            }
        }

        if ranges.is_empty() {
            return HighlightReport {
                text: text.to_string(),
                skipped,
            };
        }

        // Merge overlapping and touching spans so markers never nest
        ranges.sort_unstable();
        let mut merged: Vec<(usize, usize)> = Vec::with_capacity(ranges.len());
        for (start, end) in ranges {
            match merged.last_mut() {
                Some((_, last_end)) if start <= *last_end => {
                    *last_end = (*last_end).max(end);
                }
                _ => merged.push((start, end)),
            }
        }

        let mut out = String::with_capacity(
            text.len() + merged.len() * (self.open_tag.len() + self.close_tag.len()),
        );
        let mut cursor = 0;
        for (start, end) in merged {
            out.push_str(&text[cursor..start]);
            out.push_str(&self.open_tag);
            out.push_str(&text[start..end]);
            out.push_str(&self.close_tag);
            cursor = end;
        }
        out.push_str(&text[cursor..]);

        HighlightReport { text: out, skipped }
    }

    /// Highlight one piece of text, discarding the per-keyword report
    pub fn highlight(&self, text: &str, keywords: &[String]) -> String {
        self.apply(text, keywords).text
    }

    /// Replace every text leaf of `record` with its highlighted version;
    /// non-text values pass through unchanged
    pub fn highlight_record(&self, record: &Record, keywords: &[String]) -> Record {
        if keywords.is_empty() {
            return record.clone();
        }
        record.map_text(&|leaf| self.highlight(leaf, keywords))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_highlights_elastic_span() {
        let h = Highlighter::default();
        assert_eq!(
            h.highlight("업무상 과 실치사", &kw(&["과실"])),
            "업무상 <mark>과 실</mark>치사"
        );
    }

    #[test]
    fn test_multi_keyword_markers_never_nest() {
        let h = Highlighter::default();
        // Overlapping matches collapse into one marked span
        let out = h.highlight("업무상과실치사", &kw(&["과실", "실치사"]));
        assert_eq!(out, "업무상<mark>과실치사</mark>");
        assert!(!out.contains("<mark><mark>"));

        // A keyword must not match inside another keyword's markers
        let out = h.highlight("형법상 과실", &kw(&["형법", "과실"]));
        assert_eq!(out, "<mark>형법</mark>상 <mark>과실</mark>");
    }

    #[test]
    fn test_case_insensitive_highlight_preserves_original_casing() {
        let h = Highlighter::default();
        assert_eq!(
            h.highlight("Due Process clause", &kw(&["due process"])),
            "<mark>Due Process</mark> clause"
        );
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let h = Highlighter::default();
        assert_eq!(
            h.highlight("조문 (1) 참조", &kw(&["(1)"])),
            "조문 <mark>(1)</mark> 참조"
        );
    }

    #[test]
    fn test_empty_keyword_contributes_nothing() {
        let h = Highlighter::default();
        let report = h.apply("형법 제1조", &kw(&["", "형법"]));
        assert_eq!(report.text, "<mark>형법</mark> 제1조");
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_zero_width_interrupted_span_stays_unmarked() {
        // Elastic matching strips the zero-width space, so this text is a
        // hit for the keyword, but the span is not contiguous in the
        // original text and receives no markers
        let text = "형\u{200B}법 제1조";
        assert!(crate::matcher::KeywordMatcher::elastic_match("형법", text));
        let h = Highlighter::default();
        assert_eq!(h.highlight(text, &kw(&["형법"])), text);
    }

    #[test]
    fn test_unmatched_text_passes_through() {
        let h = Highlighter::default();
        assert_eq!(h.highlight("민법 제750조", &kw(&["형법"])), "민법 제750조");
    }

    #[test]
    fn test_custom_markers() {
        let h = Highlighter::new("[", "]");
        assert_eq!(h.highlight("과실 여부", &kw(&["과실"])), "[과실] 여부");
    }

    #[test]
    fn test_highlight_record_touches_only_text_leaves() {
        let h = Highlighter::default();
        let mut record = Record::new();
        record.insert("제목", FieldValue::from("과실치사"));
        record.insert("연도", FieldValue::Number(2021.into()));
        let highlighted = h.highlight_record(&record, &kw(&["과실"]));
        assert_eq!(highlighted.get_text("제목"), Some("<mark>과실</mark>치사"));
        assert_eq!(highlighted.get("연도"), record.get("연도"));
    }
}
