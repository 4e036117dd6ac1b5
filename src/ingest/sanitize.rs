use tracing::debug;

use super::IngestError;
use crate::icon::{CandidateIcon, Icon};
use crate::svg::normalize;

pub const DEFAULT_NAME: &str = "Untitled Icon";
pub const DEFAULT_DESCRIPTION: &str = "AI generated icon";
pub const DEFAULT_CATEGORY: &str = "ai-generated";

/// Keep structurally plausible candidates and fill in missing fields.
///
/// A candidate survives when its `svg` is non-empty and contains `<svg`.
/// Survivors get default descriptive fields where missing or blank, a
/// normalized `svg`, and a fresh id.
///
/// # Errors
/// Returns [`IngestError::EmptyResult`] when no candidate survives.
pub fn sanitize(candidates: Vec<CandidateIcon>) -> Result<Vec<Icon>, IngestError> {
    let total = candidates.len();
    let icons: Vec<Icon> = candidates.into_iter().filter_map(sanitize_one).collect();
    debug!(total, kept = icons.len(), "sanitized candidates");

    if icons.is_empty() {
        return Err(IngestError::EmptyResult { candidates: total });
    }
    Ok(icons)
}

fn sanitize_one(candidate: CandidateIcon) -> Option<Icon> {
    let svg = candidate.svg.filter(|svg| svg.contains("<svg"))?;
    Some(Icon::new(
        or_default(candidate.name, DEFAULT_NAME),
        or_default(candidate.description, DEFAULT_DESCRIPTION),
        normalize(&svg),
        or_default(candidate.category, DEFAULT_CATEGORY),
    ))
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_empty_input_fails() {
        assert_eq!(
            sanitize(Vec::new()),
            Err(IngestError::EmptyResult { candidates: 0 })
        );
    }

    #[test]
    fn test_sanitize_rejects_non_svg() {
        let result = sanitize(vec![CandidateIcon::from_svg("not svg"), CandidateIcon::default()]);
        assert_eq!(result, Err(IngestError::EmptyResult { candidates: 2 }));
    }

    #[test]
    fn test_sanitize_defaults_missing_fields() {
        let icons = sanitize(vec![CandidateIcon::from_svg("<svg/>")]).unwrap();
        assert_eq!(icons.len(), 1);
        assert_eq!(icons[0].name, DEFAULT_NAME);
        assert_eq!(icons[0].description, DEFAULT_DESCRIPTION);
        assert_eq!(icons[0].category, DEFAULT_CATEGORY);
        assert_eq!(icons[0].svg, "<svg/>");
        assert!(!icons[0].is_edited);
    }

    #[test]
    fn test_sanitize_defaults_blank_fields_and_keeps_given_ones() {
        let candidate = CandidateIcon {
            name: Some("  ".to_string()),
            description: Some("a bell".to_string()),
            svg: Some("<svg>\n  <path d=\"M0 0\"/>\n</svg>".to_string()),
            category: Some("alerts".to_string()),
        };
        let icons = sanitize(vec![candidate]).unwrap();
        assert_eq!(icons[0].name, DEFAULT_NAME);
        assert_eq!(icons[0].description, "a bell");
        assert_eq!(icons[0].category, "alerts");
        assert_eq!(icons[0].svg, "<svg><path d=\"M0 0\"/></svg>");
    }

    #[test]
    fn test_sanitize_assigns_distinct_ids() {
        let icons = sanitize(vec![
            CandidateIcon::from_svg("<svg></svg>"),
            CandidateIcon::from_svg("<svg></svg>"),
        ])
        .unwrap();
        assert_ne!(icons[0].id, icons[1].id);
    }
}
