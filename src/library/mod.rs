//! Saved icon collections.
//!
//! # Invariants
//! - Collections are listed in save order.
//! - Pages are 1-based; a page or limit of 0 is rejected.
//! - Stored collections are immutable; only save and delete mutate a store.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use thiserror::Error;

use crate::icon::{CollectionError, CollectionId, IconCollection};

/// Errors returned by collection stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("collection not found: {0}")]
    NotFound(CollectionId),
    #[error("page and limit must both be at least 1 (got page {page}, limit {limit})")]
    InvalidPage { page: usize, limit: usize },
    #[error("invalid collection: {0}")]
    InvalidCollection(#[from] CollectionError),
    #[error("library file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("library file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One page of a collection listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionPage {
    pub collections: Vec<IconCollection>,
    /// Number of collections in the whole store.
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    /// `ceil(total / limit)`; zero for an empty store.
    pub pages: usize,
}

impl CollectionPage {
    /// Slice `all` into the requested page.
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidPage`] when `page` or `limit` is zero.
    pub fn paginate(all: &[IconCollection], page: usize, limit: usize) -> StoreResult<Self> {
        if page == 0 || limit == 0 {
            return Err(StoreError::InvalidPage { page, limit });
        }
        let total = all.len();
        let collections = all
            .iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .cloned()
            .collect();
        Ok(Self {
            collections,
            total,
            page,
            limit,
            pages: total.div_ceil(limit),
        })
    }
}

/// Repository interface for saved collections.
pub trait CollectionStore {
    /// Persist a collection and return its id.
    fn save(&mut self, collection: IconCollection) -> StoreResult<CollectionId>;
    /// List collections in save order, one page at a time.
    fn list(&self, page: usize, limit: usize) -> StoreResult<CollectionPage>;
    /// Get one collection by id.
    fn get(&self, id: CollectionId) -> StoreResult<Option<IconCollection>>;
    /// Remove one collection. Unknown ids are [`StoreError::NotFound`].
    fn delete(&mut self, id: CollectionId) -> StoreResult<()>;
}
