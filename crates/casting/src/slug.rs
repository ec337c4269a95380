//! URL-safe identifiers derived from artist display names.

use unicode_normalization::UnicodeNormalization;

/// Combining diacritical marks removed after canonical decomposition.
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036f}';

/// Derive the public slug for an artist name.
///
/// Lowercases, strips diacritics, collapses every run of characters outside
/// `[a-z0-9]` into a single hyphen, and trims hyphens at both ends. No
/// disambiguation happens here; uniqueness is enforced by the artist store.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name
        .to_lowercase()
        .nfd()
        .filter(|c| !COMBINING_MARKS.contains(c))
    {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}
