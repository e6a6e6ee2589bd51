//! Slugs and accent folding.
//!
//! Slugs are the natural keys catalog rows are joined on, so [`slugify`]
//! must stay deterministic: same display name in, same slug out.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Strips diacritics, leaving the base letters (`"Cálida"` → `"Calida"`).
///
/// Letters without a canonical decomposition that still have an obvious
/// ASCII spelling (`ø`, `ß`, `æ`, ...) are transliterated.
#[must_use]
pub fn fold_diacritics(s: &str) -> String {
    let mut folded = String::with_capacity(s.len());
    for c in s.nfd().filter(|c| !is_combining_mark(*c)) {
        match c {
            'ø' => folded.push('o'),
            'Ø' => folded.push('O'),
            'ß' => folded.push_str("ss"),
            'æ' => folded.push_str("ae"),
            'Æ' => folded.push_str("AE"),
            'œ' => folded.push_str("oe"),
            'Œ' => folded.push_str("OE"),
            'ł' => folded.push('l'),
            'Ł' => folded.push('L'),
            'đ' => folded.push('d'),
            'Đ' => folded.push('D'),
            other => folded.push(other),
        }
    }
    folded
}

/// Converts a display name into a URL-safe slug.
///
/// Lower-cases, folds diacritics, replaces every run of characters outside
/// `[a-z0-9]` with a single `-`, and trims leading/trailing dashes.
#[must_use]
pub fn slugify(display_name: &str) -> String {
    let folded = fold_diacritics(display_name).to_lowercase();
    let mut slug = String::with_capacity(folded.len());
    let mut pending_dash = false;

    for c in folded.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Case- and accent-insensitive lookup key: folded, lower-cased, trimmed,
/// with internal whitespace collapsed.
#[must_use]
pub fn lookup_key(s: &str) -> String {
    fold_diacritics(s)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
