//! Zone-specific text normalization.
//!
//! Each function takes the (already cleaned) recognizer output for one cell
//! and maps it onto the vocabulary of its zone. Anything that does not fit
//! normalizes to the empty string; that is not an error.

use super::vocabulary::{BODY_TYPO_FIXES, CANONICAL_BODY_CODES, DAY_RANGE, is_name_char};
use once_cell::sync::Lazy;
use regex::Regex;

static DAY_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]{1,2}").expect("valid regex"));

/// Cleanup applied to every raw recognition result: dashes become `-`,
/// vertical bars (usually rule lines) become spaces and whitespace is
/// collapsed.
pub fn clean_recognized(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| match c {
            '—' | '–' => '-',
            '|' => ' ',
            other => other,
        })
        .collect();
    collapse_whitespace(&replaced)
}

/// Header cells hold a day of the month. The first run of one or two digits
/// is taken and accepted only within 1..=31, in canonical form (`"07"` → `"7"`).
pub fn normalize_header(raw: &str) -> String {
    DAY_DIGITS
        .find(raw)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|day| DAY_RANGE.contains(day))
        .map(|day| day.to_string())
        .unwrap_or_default()
}

/// Name cells keep letters (including accented ones), spaces, hyphens,
/// periods and apostrophes.
pub fn normalize_name(raw: &str) -> String {
    let kept: String = raw.chars().filter(|&c| is_name_char(c)).collect();
    collapse_whitespace(&kept)
}

/// Body cells must map onto the canonical shift codes, either directly or
/// through the typo-correction table.
pub fn normalize_body(raw: &str) -> String {
    let token: String = raw
        .to_uppercase()
        .chars()
        .filter_map(|c| match c {
            '0' => Some('O'),
            '\\' => Some('/'),
            ' ' => None,
            other => Some(other),
        })
        .collect();

    if CANONICAL_BODY_CODES.contains(&token.as_str()) {
        return token;
    }
    BODY_TYPO_FIXES
        .get(token.as_str())
        .map(|fixed| fixed.to_string())
        .unwrap_or_default()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
