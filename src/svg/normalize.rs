//! Whitespace normalization for storage and transmission.

use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

static GAP_BETWEEN_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+<").expect("tag gap pattern is valid"));

/// Collapse insignificant whitespace without changing rendering.
///
/// Every whitespace run becomes a single space, whitespace between `>` and
/// `<` is dropped, and the ends are trimmed. Idempotent.
pub fn normalize(markup: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(markup, " ");
    GAP_BETWEEN_TAGS
        .replace_all(&collapsed, "><")
        .trim()
        .to_string()
}
