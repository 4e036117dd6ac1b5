//! Icon records.
//!
//! - [`CandidateIcon`]: unsanitized record pulled out of a model response
//! - [`Icon`]: sanitized icon with a stable id
//! - [`IconCollection`]: named, ordered, immutable set of icons

mod collection;

pub use collection::{CollectionError, CollectionId, IconCollection};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::svg::is_valid_svg;

/// Opaque icon identifier assigned at ingestion.
pub type IconId = Uuid;

/// A sanitized icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    #[serde(default = "Uuid::new_v4")]
    pub id: IconId,
    pub name: String,
    pub description: String,
    pub svg: String,
    pub category: String,
    /// Set once a user edit has been applied and accepted.
    #[serde(rename = "isEdited", default)]
    pub is_edited: bool,
}

impl Icon {
    /// Create an unedited icon with a fresh id.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        svg: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            svg: svg.into(),
            category: category.into(),
            is_edited: false,
        }
    }

    /// Whether the markup passes the structural validator.
    pub fn has_valid_svg(&self) -> bool {
        is_valid_svg(&self.svg)
    }
}

/// An icon record as the model produced it. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CandidateIcon {
    pub name: Option<String>,
    pub description: Option<String>,
    pub svg: Option<String>,
    pub category: Option<String>,
}

impl CandidateIcon {
    /// Candidate carrying only markup.
    pub fn from_svg(svg: impl Into<String>) -> Self {
        Self {
            svg: Some(svg.into()),
            ..Self::default()
        }
    }

    /// Read a candidate from one element of a model's `icons` array.
    ///
    /// Fields of the wrong JSON type count as missing; non-object entries
    /// produce an empty candidate that sanitization will drop.
    pub fn from_json(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            name: text("name"),
            description: text("description"),
            svg: text("svg"),
            category: text("category"),
        }
    }
}
