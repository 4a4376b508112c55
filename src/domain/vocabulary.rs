//! Fixed vocabularies: recognition whitelists, the canonical shift codes and
//! the typo-correction table.
//!
//! All of this is read-only process-wide data.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::ops::RangeInclusive;

/// Closed set of valid body-cell codes.
pub const CANONICAL_BODY_CODES: [&str; 11] =
    ["R", "D", "N", "DO", "V", "SC", "PN", "O", "OV", "SV", "/"];

/// Known recognition slips and their canonical code.
pub static BODY_TYPO_FIXES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("SVV", "SV"),
        ("SCC", "SC"),
        ("DOO", "DO"),
        ("OVV", "OV"),
        ("PPN", "PN"),
        ("PNN", "PN"),
        ("VV", "V"),
        ("DD", "D"),
        ("NN", "N"),
        ("RR", "R"),
        ("OO", "O"),
    ])
});

/// Valid day numbers in the header row.
pub const DAY_RANGE: RangeInclusive<u32> = 1..=31;

/// Characters the recognizer may emit for header cells.
pub const DIGIT_WHITELIST: &str = "0123456789";

/// Characters the recognizer may emit for body cells.
pub const BODY_WHITELIST: &str = "RDNOVSCPO/";

/// Letters with diacritics accepted in names, in addition to ASCII letters.
pub const NAME_ACCENTED_LETTERS: &str = "ÁČĎÉĚÍŇÓŘŠŤÚŮÝŽáčďéěíňóřšťúůýž";

/// Punctuation accepted in names.
pub const NAME_PUNCTUATION: &str = "-.'’";

/// Characters the recognizer may emit for name cells.
pub const NAME_WHITELIST: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZÁČĎÉĚÍŇÓŘŠŤÚŮÝŽabcdefghijklmnopqrstuvwxyzáčďéěíňóřšťúůýž-.'’";

/// Options that keep the recognizer from snapping names to dictionary words.
pub const NAME_RECOGNITION_OPTIONS: [(&str, &str); 3] = [
    ("preserve_interword_spaces", "1"),
    ("load_system_dawg", "0"),
    ("load_freq_dawg", "0"),
];

/// Label given to the first column of the assembled table.
pub const NAME_COLUMN_LABEL: &str = "JMENO";

/// Name for the column at `index` when its header cell is empty.
pub fn placeholder_column_name(index: usize) -> String {
    format!("col_{index}")
}

/// Returns true if `c` may appear in a normalized name.
pub fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic()
        || c == ' '
        || NAME_ACCENTED_LETTERS.contains(c)
        || NAME_PUNCTUATION.contains(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typo_targets_are_canonical() {
        for target in BODY_TYPO_FIXES.values() {
            assert!(CANONICAL_BODY_CODES.contains(target), "{target}");
        }
    }

    #[test]
    fn test_name_whitelist_is_name_alphabet() {
        assert!(NAME_WHITELIST.chars().all(is_name_char));
        assert!(!is_name_char('0'));
        assert!(!is_name_char('#'));
        assert!(is_name_char('Ř'));
    }

    #[test]
    fn test_placeholder_name() {
        assert_eq!(placeholder_column_name(4), "col_4");
    }
}
