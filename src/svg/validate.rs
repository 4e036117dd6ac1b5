//! Structural validity checks.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static ELEMENT_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?:circle|rect|path|polygon|polyline|ellipse|line|g)\b")
        .expect("element tag pattern is valid")
});

/// Whether `markup` is plausibly a complete SVG document.
///
/// A shallow check: non-empty, has an opening `<svg`, a `</svg>` and at least
/// one closing tag marker. This gates persisting and exporting markup.
pub fn is_valid_svg(markup: &str) -> bool {
    !markup.is_empty()
        && markup.contains("<svg")
        && markup.contains("</svg>")
        && markup.contains("</")
}

/// Number of drawable or grouping elements in the markup.
pub fn element_count(markup: &str) -> usize {
    ELEMENT_TAG.find_iter(markup).count()
}

/// Summary returned to callers that validate markup without editing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    /// Markup length in bytes.
    pub size: usize,
    pub element_count: usize,
}

/// Validate markup and count its elements.
pub fn validate(markup: &str) -> ValidationReport {
    ValidationReport {
        is_valid: is_valid_svg(markup),
        size: markup.len(),
        element_count: element_count(markup),
    }
}
