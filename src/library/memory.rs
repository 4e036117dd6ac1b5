use tracing::info;

use super::{CollectionPage, CollectionStore, StoreError, StoreResult};
use crate::icon::{CollectionId, IconCollection};

/// In-process store; contents are lost when dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    collections: Vec<IconCollection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

impl CollectionStore for MemoryStore {
    fn save(&mut self, collection: IconCollection) -> StoreResult<CollectionId> {
        let id = collection.id();
        info!(%id, icons = collection.icon_count(), "saved collection");
        self.collections.push(collection);
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
        self.collections.remove(index);
        info!(%id, "deleted collection");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::Icon;
    use uuid::Uuid;

    fn collection(name: &str) -> IconCollection {
        IconCollection::new(Some(name), vec![Icon::new("dot", "a dot", "<svg><circle r=\"1\"/></svg>", "ui")])
            .unwrap()
    }

    #[test]
    fn test_save_get_and_list_in_order() {
        let mut store = MemoryStore::new();
        let first = store.save(collection("first")).unwrap();
        store.save(collection("second")).unwrap();

        assert_eq!(store.get(first).unwrap().unwrap().name(), "first");
        let names: Vec<_> = store
            .list(1, 10)
            .unwrap()
            .collections
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_delete_removes_and_unknown_is_not_found() {
        let mut store = MemoryStore::new();
        let id = store.save(collection("gone")).unwrap();
        store.delete(id).unwrap();
        assert!(store.is_empty());
        assert!(store.get(id).unwrap().is_none());
        assert!(matches!(store.delete(id), Err(StoreError::NotFound(missing)) if missing == id));
        assert!(matches!(store.delete(Uuid::new_v4()), Err(StoreError::NotFound(_))));
    }
}
