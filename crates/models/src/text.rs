//! Accent- and case-insensitive text matching.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Canonical decomposition, combining marks removed, then lowercased.
pub fn fold_text(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Substring test on folded forms of both sides.
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    fold_text(haystack).contains(&fold_text(needle))
}
