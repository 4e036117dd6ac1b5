use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{CollectionPage, CollectionStore, StoreError, StoreResult};
use crate::icon::{CollectionId, IconCollection};

/// Store backed by a single JSON file holding the ordered collection list.
///
/// The file is read once on open and rewritten after every mutation by
/// writing a sibling temporary file and renaming it over the original.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    collections: Vec<IconCollection>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    /// Fails when the file exists but cannot be read or does not hold a
    /// valid collection list.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let collections = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            Vec::new()
        };
        debug!(path = %path.display(), count = collections.len(), "opened library");
        Ok(Self { path, collections })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.collections)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl CollectionStore for JsonFileStore {
    fn save(&mut self, collection: IconCollection) -> StoreResult<CollectionId> {
        let id = collection.id();
        let icons = collection.icon_count();
        self.collections.push(collection);
        if let Err(err) = self.persist() {
            self.collections.pop();
            return Err(err);
        }
        info!(%id, icons, path = %self.path.display(), "saved collection");
        Ok(id)
    }

    fn list(&self, page: usize, limit: usize) -> StoreResult<CollectionPage> {
        CollectionPage::paginate(&self.collections, page, limit)
    }

    fn get(&self, id: CollectionId) -> StoreResult<Option<IconCollection>> {
        Ok(self.collections.iter().find(|c| c.id() == id).cloned())
    }

    fn delete(&mut self, id: CollectionId) -> StoreResult<()> {
        let index = self
            .collections
            .iter()
            .position(|c| c.id() == id)
            .ok_or(StoreError::NotFound(id))?;
        let removed = self.collections.remove(index);
        if let Err(err) = self.persist() {
            self.collections.insert(index, removed);
            return Err(err);
        }
        info!(%id, path = %self.path.display(), "deleted collection");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::Icon;
    use tempfile::tempdir;

    fn collection(name: &str) -> IconCollection {
        IconCollection::new(Some(name), vec![Icon::new("dot", "a dot", "<svg><g></g></svg>", "ui")])
            .unwrap()
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("library.json")).unwrap();
        assert_eq!(store.list(1, 5).unwrap().total, 0);
    }

    #[test]
    fn test_mutations_persist_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("library.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        let keep = store.save(collection("keep")).unwrap();
        let drop = store.save(collection("drop")).unwrap();
        store.delete(drop).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        let page = reopened.list(1, 10).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.collections[0].id(), keep);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_json_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("library.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Json(_))));
    }
}
