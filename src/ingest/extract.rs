use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::icon::CandidateIcon;

/// Maximum number of icons recovered from free text.
pub const MAX_FALLBACK_ICONS: usize = 6;

const FALLBACK_CATEGORY: &str = "ai-generated";

// Shortest match per fragment so neighbouring icons stay separate.
static SVG_FRAGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<svg\b[^>]*>.*?</svg>").expect("svg fragment pattern is valid")
});

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?```$").expect("code fence pattern is valid")
});

/// Candidates pulled out of a raw model response, tagged by how they were found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The response parsed as a JSON object with an `icons` array.
    Strict(Vec<CandidateIcon>),
    /// Structured parsing failed; markup fragments were lifted from the text.
    Fallback(Vec<CandidateIcon>),
    /// Neither structured data nor markup fragments were found.
    Empty,
}

impl Extraction {
    /// The extracted candidates, in response order.
    pub fn candidates(&self) -> &[CandidateIcon] {
        match self {
            Self::Strict(candidates) | Self::Fallback(candidates) => candidates,
            Self::Empty => &[],
        }
    }

    pub fn into_candidates(self) -> Vec<CandidateIcon> {
        match self {
            Self::Strict(candidates) | Self::Fallback(candidates) => candidates,
            Self::Empty => Vec::new(),
        }
    }

    /// Whether the heuristic text path produced these candidates.
    pub const fn used_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Turn a raw model response into candidate icon records.
///
/// Structured parsing is tried first; when it fails, every
/// `<svg ...>...</svg>` fragment in the text becomes a candidate with
/// placeholder descriptive fields, up to [`MAX_FALLBACK_ICONS`].
pub fn extract(raw: &str) -> Extraction {
    if let Some(candidates) = parse_structured(raw) {
        debug!(count = candidates.len(), "parsed structured model response");
        return Extraction::Strict(candidates);
    }

    let candidates: Vec<CandidateIcon> = SVG_FRAGMENT
        .find_iter(raw)
        .take(MAX_FALLBACK_ICONS)
        .enumerate()
        .map(|(index, fragment)| placeholder_candidate(index, fragment.as_str()))
        .collect();

    if candidates.is_empty() {
        warn!(len = raw.len(), "model response contained no icons");
        crate::perf::log_event("ingest.empty", format!("len={}", raw.len()));
        return Extraction::Empty;
    }

    warn!(
        count = candidates.len(),
        "model response was not valid JSON; recovered icons from markup fragments"
    );
    crate::perf::log_event(
        "ingest.fallback",
        format!("len={} recovered={}", raw.len(), candidates.len()),
    );
    Extraction::Fallback(candidates)
}

/// Parse `{"icons": [...]}`, either bare or inside a Markdown code fence.
fn parse_structured(raw: &str) -> Option<Vec<CandidateIcon>> {
    let trimmed = raw.trim();
    let body = CODE_FENCE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map_or(trimmed, |body| body.as_str());

    let value: Value = serde_json::from_str(body).ok()?;
    let icons = value.get("icons")?.as_array()?;
    Some(icons.iter().map(CandidateIcon::from_json).collect())
}

fn placeholder_candidate(index: usize, fragment: &str) -> CandidateIcon {
    let number = index + 1;
    CandidateIcon {
        name: Some(format!("Icon {number}")),
        description: Some(format!("AI generated icon {number}")),
        svg: Some(unescape_json_fragment(fragment)),
        category: Some(FALLBACK_CATEGORY.to_string()),
    }
}

/// Undo JSON string escapes in markup lifted out of a broken JSON document.
///
/// Only applies when the fragment carries escaped quotes, which never appear
/// in markup that was emitted as plain text.
fn unescape_json_fragment(fragment: &str) -> String {
    if !fragment.contains("\\\"") {
        return fragment.to_string();
    }
    let mut out = String::with_capacity(fragment.len());
    let mut chars = fragment.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('/') => out.push('/'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
