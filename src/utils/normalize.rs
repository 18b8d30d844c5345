//! Title normalization for comparison and for query strings.

/// HTML ampersand entity that leaks into titles from scraped metadata
pub const AMPERSAND_ENTITY: &str = "&amp;";

/// Normalize a title for similarity comparison.
///
/// Removes `&amp;`, lowercases, drops every character that is neither
/// alphanumeric nor whitespace, and collapses runs of whitespace into single
/// spaces. Idempotent for every input.
pub fn normalize_title(title: &str) -> String {
    title
        .replace(AMPERSAND_ENTITY, "")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize a title for use as a URL query value.
///
/// Same as [`normalize_title`], then percent-encoded so spaces become `%20`.
pub fn normalize_for_query(title: &str) -> String {
    urlencoding::encode(&normalize_title(title)).into_owned()
}
