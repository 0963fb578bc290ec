//! Integration tests for saved entries and export.

use regexlab::store::{EXPORT_FILE_NAME, FileStorage, SavedStore};
use regexlab::{LocalService, RegexPair, SessionBuilder, StorageConfig};

#[test]
fn file_store_survives_reload() {
    let dir = tempfile::tempdir().unwrap();

    let mut store = SavedStore::load(FileStorage::new(dir.path()), "savedRegexes").unwrap();
    store.save(RegexPair::new("a", "1")).unwrap();
    store.save(RegexPair::new("b", "2")).unwrap();
    store.save(RegexPair::new("a", "1")).unwrap();
    store.delete(0).unwrap();

    let reloaded = SavedStore::load(FileStorage::new(dir.path()), "savedRegexes").unwrap();
    assert_eq!(
        reloaded.entries(),
        &[RegexPair::new("b", "2"), RegexPair::new("a", "1")]
    );
}

#[test]
fn slot_file_uses_service_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());
    let mut store = SavedStore::load(storage.clone(), "savedRegexes").unwrap();
    store.save(RegexPair::new(r"\s", " ")).unwrap();

    let raw = std::fs::read_to_string(storage.slot_path("savedRegexes")).unwrap();
    assert_eq!(raw, r#"[{"pattern":"\\s","testString":" "}]"#);
}

#[test]
fn export_writes_pretty_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = SavedStore::in_memory();
    store.save(RegexPair::new("x", "y")).unwrap();

    let path = store.export_to(dir.path()).unwrap();

    assert_eq!(path.file_name().unwrap(), EXPORT_FILE_NAME);
    let exported: Vec<RegexPair> =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(exported, store.entries());
}

#[tokio::test]
async fn session_save_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let session = SessionBuilder::new(LocalService::new())
        .storage(StorageConfig::in_dir(dir.path()))
        .clipboard(regexlab::NoClipboard)
        .build()
        .unwrap();

    session.set_pattern("a+").await;
    session.set_sample("aa");
    session.save_current().await.unwrap();
    session.set_pattern("b+").await;
    session.save_current().await.unwrap();
    session.save_current().await.unwrap();

    assert_eq!(session.saved().len(), 3);
    let removed = session.delete_saved(1).unwrap();
    assert_eq!(removed, RegexPair::new("b+", "aa"));
    assert_eq!(
        session.saved(),
        vec![RegexPair::new("a+", "aa"), RegexPair::new("b+", "aa")]
    );
    assert!(session.delete_saved(5).is_err());

    let path = session.export_saved(dir.path()).unwrap();
    assert!(path.exists());
}
