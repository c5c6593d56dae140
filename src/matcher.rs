//! # Keyword Matching Module
//!
//! ## Purpose
//! Decides whether a keyword occurs in a field's text under the configured
//! tolerance policy. Two interchangeable policies are supported:
//!
//! - **Strict**: normalize both sides (invisible-character strip plus
//!   whitespace strip) and test ordinary substring containment. Used for
//!   exclusion terms and the whitespace-insensitive matching mode.
//! - **Elastic**: the keyword's characters must appear in order in the text,
//!   each permitted to be followed by an arbitrary run of whitespace before
//!   the next, matched case-insensitively. Whitespace in the text is
//!   preserved and tolerated positionally, so a keyword split across a line
//!   break still matches. A single-character keyword degrades to plain
//!   containment.
//!
//! ## Input/Output Specification
//! - **Input**: keyword and field text
//! - **Output**: boolean match decision; total, never fails
//! - **Edge case**: the empty keyword never matches under either policy
//!   (an empty keyword *list* is a separate condition handled by the
//!   evaluator, not here)
//!
//! The elastic policy is implemented as a hand-rolled ordered character scan
//! rather than a compiled pattern, so no keyword can fail to match for
//! syntactic reasons on the matching path.

use crate::normalize::TextNormalizer;
use serde::{Deserialize, Serialize};

/// Matching tolerance policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Exact substring containment after invisible + whitespace stripping
    Strict,
    /// Ordered character scan tolerating whitespace between keyword characters
    Elastic,
}

/// Keyword matcher carrying its configured policy
#[derive(Debug, Clone, Copy)]
pub struct KeywordMatcher {
    policy: MatchPolicy,
}

impl KeywordMatcher {
    /// Create a matcher with the given policy
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    /// The configured policy
    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Test whether `keyword` occurs in `text` under the configured policy
    pub fn matches(&self, keyword: &str, text: &str) -> bool {
        match self.policy {
            MatchPolicy::Strict => Self::strict_match(keyword, text),
            MatchPolicy::Elastic => Self::elastic_match(keyword, text),
        }
    }

    /// Exact-substring-after-normalization containment, case-sensitive
    pub fn strict_match(keyword: &str, text: &str) -> bool {
        let keyword = TextNormalizer::normalize(keyword, true);
        if keyword.is_empty() {
            return false;
        }
        TextNormalizer::normalize(text, true).contains(&keyword)
    }

    /// Elastic-character containment: keyword characters in order with
    /// arbitrary whitespace runs tolerated between them, case-insensitive
    pub fn elastic_match(keyword: &str, text: &str) -> bool {
        let keyword: Vec<char> = TextNormalizer::strip_invisible(keyword)
            .to_lowercase()
            .chars()
            .collect();
        if keyword.is_empty() {
            return false;
        }
        let text: Vec<char> = TextNormalizer::strip_invisible(text)
            .to_lowercase()
            .chars()
            .collect();
        if keyword.len() == 1 {
            return text.contains(&keyword[0]);
        }

        'starts: for start in 0..text.len() {
            if text[start] != keyword[0] {
                continue;
            }
            let mut pos = start + 1;
            for &expected in &keyword[1..] {
                if expected.is_whitespace() {
                    // A literal whitespace keyword character consumes the
                    // whole whitespace run, at least one character of it.
                    if pos >= text.len() || !text[pos].is_whitespace() {
                        continue 'starts;
                    }
                    while pos < text.len() && text[pos].is_whitespace() {
                        pos += 1;
                    }
                } else {
                    while pos < text.len() && text[pos].is_whitespace() {
                        pos += 1;
                    }
                    if pos >= text.len() || text[pos] != expected {
                        continue 'starts;
                    }
                    pos += 1;
                }
            }
            return true;
        }
        false
    }
}
