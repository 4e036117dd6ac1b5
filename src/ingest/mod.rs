//! Ingestion of raw model responses.
//!
//! Two stages:
//! - [`extract`]: raw text to candidate records, strict JSON first, markup
//!   fragments as a fallback
//! - [`sanitize`]: candidates to [`Icon`]s, failing when none are usable
//!
//! [`ingest`] runs both and keeps track of which extraction path was taken.

mod extract;
mod sanitize;

pub use extract::{Extraction, MAX_FALLBACK_ICONS, extract};
pub use sanitize::{DEFAULT_CATEGORY, DEFAULT_DESCRIPTION, DEFAULT_NAME, sanitize};

use serde::Serialize;
use thiserror::Error;

use crate::icon::Icon;

/// Ingestion failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// No candidate carried usable markup; nothing is returned to the caller.
    #[error("no valid SVG icons found in response ({candidates} candidates checked)")]
    EmptyResult { candidates: usize },
}

/// Icons ingested from one model response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "icons", rename_all = "snake_case")]
pub enum Ingestion {
    /// Parsed from well-formed structured output.
    Strict(Vec<Icon>),
    /// Recovered heuristically from markup embedded in free text.
    Fallback(Vec<Icon>),
}

impl Ingestion {
    pub fn icons(&self) -> &[Icon] {
        match self {
            Self::Strict(icons) | Self::Fallback(icons) => icons,
        }
    }

    pub fn into_icons(self) -> Vec<Icon> {
        match self {
            Self::Strict(icons) | Self::Fallback(icons) => icons,
        }
    }

    pub const fn used_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    /// Keep at most `count` icons.
    pub fn truncate(&mut self, count: usize) {
        match self {
            Self::Strict(icons) | Self::Fallback(icons) => icons.truncate(count),
        }
    }
}

/// Extract and sanitize a raw model response.
///
/// # Errors
/// Returns [`IngestError::EmptyResult`] when the response yields no usable icon.
pub fn ingest(raw: &str) -> Result<Ingestion, IngestError> {
    let _scope = crate::perf::scope("ingest");
    match extract(raw) {
        Extraction::Strict(candidates) => sanitize(candidates).map(Ingestion::Strict),
        Extraction::Fallback(candidates) => sanitize(candidates).map(Ingestion::Fallback),
        Extraction::Empty => Err(IngestError::EmptyResult { candidates: 0 }),
    }
}
