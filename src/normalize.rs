//! # Text Normalization Module
//!
//! ## Purpose
//! Foundation for every matching component: strips the zero-width/invisible
//! characters that OCR and manual formatting leave inside corpus text, and
//! optionally removes all whitespace so containment checks become insensitive
//! to spacing artifacts.
//!
//! ## Input/Output Specification
//! - **Input**: Arbitrary text
//! - **Output**: Cleaned text; total over all inputs, never fails
//! - **Invariant**: `normalize` is idempotent

/// Characters in the zero-width/invisible class targeted by the engine:
/// zero-width space, zero-width non-joiner, zero-width joiner, BOM.
const INVISIBLE: [char; 4] = ['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'];

/// Text normalization utilities
pub struct TextNormalizer;

impl TextNormalizer {
    /// Remove zero-width and invisible characters
    pub fn strip_invisible(text: &str) -> String {
        text.chars().filter(|c| !INVISIBLE.contains(c)).collect()
    }

    /// Remove invisible characters and, when `strip_whitespace` is set, all
    /// whitespace as well
    pub fn normalize(text: &str, strip_whitespace: bool) -> String {
        text.chars()
            .filter(|c| !INVISIBLE.contains(c))
            .filter(|c| !(strip_whitespace && c.is_whitespace()))
            .collect()
    }
}
