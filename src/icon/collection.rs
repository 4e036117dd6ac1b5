use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::Icon;

/// Identifier of a saved collection.
pub type CollectionId = Uuid;

const DEFAULT_COLLECTION_NAME: &str = "Untitled Collection";

/// Reasons a set of icons cannot become a collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectionError {
    #[error("a collection needs at least one icon")]
    Empty,
    #[error("icon {index} (`{name}`) does not contain valid SVG markup")]
    InvalidIcon { index: usize, name: String },
    #[error("icon_count {declared} does not match {actual} stored icons")]
    CountMismatch { declared: usize, actual: usize },
}

/// A saved, ordered set of icons.
///
/// Immutable once created; `icon_count` always equals `icons().len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CollectionRecord")]
pub struct IconCollection {
    id: CollectionId,
    name: String,
    icons: Vec<Icon>,
    created_at: DateTime<Utc>,
    icon_count: usize,
}

/// Wire shape checked before it becomes an [`IconCollection`].
#[derive(Deserialize)]
struct CollectionRecord {
    id: CollectionId,
    name: String,
    icons: Vec<Icon>,
    created_at: DateTime<Utc>,
    icon_count: usize,
}

impl TryFrom<CollectionRecord> for IconCollection {
    type Error = CollectionError;

    fn try_from(record: CollectionRecord) -> Result<Self, Self::Error> {
        if record.icon_count != record.icons.len() {
            return Err(CollectionError::CountMismatch {
                declared: record.icon_count,
                actual: record.icons.len(),
            });
        }
        Ok(Self {
            id: record.id,
            name: record.name,
            icons: record.icons,
            created_at: record.created_at,
            icon_count: record.icon_count,
        })
    }
}

impl IconCollection {
    /// Build a new collection from icons selected for saving.
    ///
    /// A blank or missing name becomes `"Untitled Collection"`.
    ///
    /// # Errors
    /// Returns an error when `icons` is empty or any icon fails the SVG validator.
    pub fn new(name: Option<&str>, icons: Vec<Icon>) -> Result<Self, CollectionError> {
        if icons.is_empty() {
            return Err(CollectionError::Empty);
        }
        if let Some((index, icon)) = icons
            .iter()
            .enumerate()
            .find(|(_, icon)| !icon.has_valid_svg())
        {
            return Err(CollectionError::InvalidIcon {
                index,
                name: icon.name.clone(),
            });
        }

        let name = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_COLLECTION_NAME)
            .to_string();
        let icon_count = icons.len();
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            icons,
            created_at: Utc::now(),
            icon_count,
        })
    }

    pub const fn id(&self) -> CollectionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn icons(&self) -> &[Icon] {
        &self.icons
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn icon_count(&self) -> usize {
        self.icon_count
    }
}
