//! # Date Sort Key Module
//!
//! ## Purpose
//! Extracts a decision date from free text and produces a fixed-width,
//! lexicographically sortable `YYYYMMDD` key. Dates appear either inside a
//! narrative sentence ("대법원 2021. 3. 15. 선고 ...") or in a dedicated
//! date field ("2021. 3. 15."); the caller selects which extraction grammar
//! applies to its field.
//!
//! ## Input/Output Specification
//! - **Input**: arbitrary text and a grammar selector
//! - **Output**: a `SortKey`; the sentinel `"00000000"` for unparseable
//!   input, so unknown dates sort first ascending and last descending
//! - **Total**: never fails over any input
//!
//! When the dot-separated pattern is absent, a fallback takes the text up to
//! the first comma, strips every non-digit, and interprets exactly eight
//! remaining digits as `YYYYMMDD`. Calendar-invalid dates (month 13, Feb 30)
//! fall back to the sentinel.

use crate::normalize::TextNormalizer;
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel key for unparseable or absent dates
pub const UNKNOWN_DATE_KEY: &str = "00000000";

const NARRATIVE_PATTERN: &str =
    r"(?:대법원|헌법재판소)\s+(\d{4})\.\s*(\d{1,2})\.\s*(\d{1,2})\.?\s*선고";
const FIELD_PATTERN: &str = r"(\d{4})\.\s*(\d{1,2})\.\s*(\d{1,2})";

/// Fixed-width `YYYYMMDD` sort key; ordering is plain lexicographic
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SortKey(String);

impl SortKey {
    /// The unknown-date sentinel
    pub fn unknown() -> Self {
        Self(UNKNOWN_DATE_KEY.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_DATE_KEY
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extraction grammar selected by the caller per field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateGrammar {
    /// Inside a narrative sentence, anchored by an issuing-body label and
    /// the trailing "선고"
    Narrative,
    /// A dedicated date-bearing field
    Field,
}

/// Free-text date extractor
#[derive(Debug, Clone)]
pub struct DateKeyNormalizer {
    narrative: Regex,
    field: Regex,
}

impl Default for DateKeyNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl DateKeyNormalizer {
    pub fn new() -> Self {
        Self {
            narrative: Regex::new(NARRATIVE_PATTERN).unwrap(),
            field: Regex::new(FIELD_PATTERN).unwrap(),
        }
    }

    /// Extract a sort key from `text` under the selected grammar
    pub fn to_sort_key(&self, text: &str, grammar: DateGrammar) -> SortKey {
        let text = TextNormalizer::strip_invisible(text);
        let pattern = match grammar {
            DateGrammar::Narrative => &self.narrative,
            DateGrammar::Field => &self.field,
        };

        if let Some(caps) = pattern.captures(&text) {
            let parts = (
                caps[1].parse::<i32>().ok(),
                caps[2].parse::<u32>().ok(),
                caps[3].parse::<u32>().ok(),
            );
            if let (Some(year), Some(month), Some(day)) = parts {
                if let Some(key) = Self::calendar_key(year, month, day) {
                    return key;
                }
            }
        }

        Self::fallback(&text).unwrap_or_else(SortKey::unknown)
    }

    /// Validate against the calendar and zero-pad into `YYYYMMDD`
    fn calendar_key(year: i32, month: u32, day: u32) -> Option<SortKey> {
        NaiveDate::from_ymd_opt(year, month, day)?;
        Some(SortKey(format!("{:04}{:02}{:02}", year, month, day)))
    }

    /// Digit-salvage path: text up to the first comma, every non-digit
    /// stripped, exactly eight digits read as `YYYYMMDD`
    fn fallback(text: &str) -> Option<SortKey> {
        let head = text.split(',').next().unwrap_or("");
        let digits: String = head.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() != 8 {
            return None;
        }
        let year = digits[0..4].parse::<i32>().ok()?;
        let month = digits[4..6].parse::<u32>().ok()?;
        let day = digits[6..8].parse::<u32>().ok()?;
        Self::calendar_key(year, month, day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> DateKeyNormalizer {
        DateKeyNormalizer::new()
    }

    #[test]
    fn test_narrative_extraction() {
        let key = normalizer().to_sort_key(
            "대법원 2021. 3. 15. 선고 2020도1234 판결",
            DateGrammar::Narrative,
        );
        assert_eq!(key.as_str(), "20210315");

        let key = normalizer().to_sort_key(
            "헌법재판소 1999. 12. 1. 선고 98헌마123 결정",
            DateGrammar::Narrative,
        );
        assert_eq!(key.as_str(), "19991201");
    }

    #[test]
    fn test_narrative_requires_issuing_body_and_verdict_marker() {
        // A bare date in a narrative field only survives via the digit
        // fallback, which this text fails (not eight digits before a comma)
        let key = normalizer().to_sort_key("2021. 3. 15. 선고, 기타", DateGrammar::Narrative);
        assert!(key.is_unknown());
    }

    #[test]
    fn test_field_extraction_zero_pads() {
        let key = normalizer().to_sort_key("2021. 3. 5.", DateGrammar::Field);
        assert_eq!(key.as_str(), "20210305");
        let key = normalizer().to_sort_key("  2019.11.30 ", DateGrammar::Field);
        assert_eq!(key.as_str(), "20191130");
    }

    #[test]
    fn test_unparseable_inputs_yield_sentinel() {
        for text in ["", "날짜 없음", "123", "2021-03", "대법원 판결"] {
            let key = normalizer().to_sort_key(text, DateGrammar::Field);
            assert!(key.is_unknown(), "{:?}", text);
        }
    }

    #[test]
    fn test_calendar_invalid_dates_yield_sentinel() {
        assert!(normalizer()
            .to_sort_key("2021. 13. 1.", DateGrammar::Field)
            .is_unknown());
        assert!(normalizer()
            .to_sort_key("2021. 2. 30.", DateGrammar::Field)
            .is_unknown());
    }

    #[test]
    fn test_fallback_digit_salvage() {
        let key = normalizer().to_sort_key("20210315선고", DateGrammar::Field);
        assert_eq!(key.as_str(), "20210315");
        let key = normalizer().to_sort_key("2021/03/15", DateGrammar::Field);
        assert_eq!(key.as_str(), "20210315");
    }

    #[test]
    fn fallback_comma_groups_rejected() {
        // Pinned behavior: only the text before the first comma feeds the
        // fallback, so comma-delimited digit groups do not form a date.
        let key = normalizer().to_sort_key("2019,01,05", DateGrammar::Field);
        assert_eq!(key.as_str(), UNKNOWN_DATE_KEY);
    }

    #[test]
    fn test_sentinel_orders_first_ascending() {
        let unknown = SortKey::unknown();
        let real = normalizer().to_sort_key("1950. 1. 1.", DateGrammar::Field);
        assert!(unknown < real);
    }

    #[test]
    fn test_invisible_characters_do_not_break_extraction() {
        let key = normalizer().to_sort_key(
            "대법원\u{200B} 2021. 3. 15. 선고",
            DateGrammar::Narrative,
        );
        assert_eq!(key.as_str(), "20210315");
    }
}
