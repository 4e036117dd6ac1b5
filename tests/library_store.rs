use icon_factory::icon::{Icon, IconCollection};
use icon_factory::library::{CollectionStore, JsonFileStore, MemoryStore, StoreError};

fn collection(name: &str, icons: usize) -> IconCollection {
    let icons = (0..icons)
        .map(|i| Icon::new(format!("icon {i}"), "test", "<svg><path d=\"M0 0\"/></svg>", "test"))
        .collect();
    IconCollection::new(Some(name), icons).unwrap()
}

fn exercise_store(store: &mut dyn CollectionStore) {
    let ids: Vec<_> = (0..7)
        .map(|i| store.save(collection(&format!("set {i}"), i + 1)).unwrap())
        .collect();

    let page = store.list(2, 3).unwrap();
    assert_eq!(page.total, 7);
    assert_eq!(page.pages, 3);
    assert_eq!(page.page, 2);
    assert_eq!(page.limit, 3);
    let names: Vec<_> = page.collections.iter().map(|c| c.name().to_string()).collect();
    assert_eq!(names, vec!["set 3", "set 4", "set 5"]);

    let fetched = store.get(ids[4]).unwrap().unwrap();
    assert_eq!(fetched.icon_count(), 5);
    assert_eq!(fetched.icons().len(), 5);

    store.delete(ids[0]).unwrap();
    assert!(matches!(store.delete(ids[0]), Err(StoreError::NotFound(_))));
    assert_eq!(store.list(1, 10).unwrap().total, 6);

    assert!(matches!(store.list(0, 10), Err(StoreError::InvalidPage { .. })));
    assert!(matches!(store.list(1, 0), Err(StoreError::InvalidPage { .. })));
}

#[test]
fn test_memory_store_contract() {
    exercise_store(&mut MemoryStore::new());
}

#[test]
fn test_json_file_store_contract_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.json");

    let mut store = JsonFileStore::open(&path).unwrap();
    exercise_store(&mut store);
    let before = store.list(1, 10).unwrap();

    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(reopened.list(1, 10).unwrap(), before);
}

#[test]
fn test_json_file_store_rejects_tampered_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("library.json");
    {
        let mut store = JsonFileStore::open(&path).unwrap();
        store.save(collection("tampered", 2)).unwrap();
    }
    let text = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, text.replace("\"icon_count\": 2", "\"icon_count\": 5")).unwrap();

    assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Json(_))));
}
