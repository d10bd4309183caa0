//! Synthetic documents written for an analyzed recipe.

use bitbake_ls::embedded::{EMBEDDED_DOCUMENTS_DIR, EmbeddedDocumentStore, EmbeddedLanguage};

use crate::helpers::fixtures::RECIPE;
use crate::helpers::host_helpers::{file_uri, host_with};

#[tokio::test]
async fn test_views_of_a_recipe_on_disk() {
    let storage = tempfile::tempdir().expect("tempdir");
    let store = EmbeddedDocumentStore::new(storage.path());
    let (host, uri) = host_with("/work/demo_1.0.bb", RECIPE);

    for language in EmbeddedLanguage::ALL {
        let text = host.analysis().embedded_text(&uri, language).expect("analyzed");
        let saved = store.save(&uri, language, &text).await.expect("saved");
        assert!(saved.path.starts_with(storage.path().join(EMBEDDED_DOCUMENTS_DIR)));
        assert_eq!(saved.line_offset, language.line_offset());
        assert_eq!(tokio::fs::read_to_string(&saved.path).await.expect("read"), text);
    }

    let python = store.get(&uri, EmbeddedLanguage::Python).expect("python view");
    assert_eq!(python.uri.scheme(), "file");
    assert!(python.path.extension().is_some_and(|ext| ext == "py"));
    assert_eq!(store.find_by_uri(&python.uri).map(|d| d.original_uri), Some(uri.clone()));
}

#[tokio::test]
async fn test_each_recipe_owns_its_files() {
    let storage = tempfile::tempdir().expect("tempdir");
    let store = EmbeddedDocumentStore::new(storage.path());
    let first = file_uri("/work/a.bb");
    let second = file_uri("/work/b.bb");

    store.save(&first, EmbeddedLanguage::Bash, "true\n").await.expect("saved");
    let kept = store.save(&second, EmbeddedLanguage::Bash, "false\n").await.expect("saved");

    let removed = store.remove(&first).await;
    assert_eq!(removed.len(), 1);
    assert!(!removed[0].path.exists());
    assert!(kept.path.exists());
    assert_eq!(store.documents_for(&second), vec![kept]);
}

#[tokio::test]
async fn test_rename_keeps_files() {
    let storage = tempfile::tempdir().expect("tempdir");
    let store = EmbeddedDocumentStore::new(storage.path());
    let old = file_uri("/work/demo_1.0.bb");
    let new = file_uri("/work/demo_1.1.bb");

    let saved = store.save(&old, EmbeddedLanguage::Python, "import bb\n").await.expect("saved");
    store.rename(&old, &new);

    assert!(store.documents_for(&old).is_empty());
    let moved = store.get(&new, EmbeddedLanguage::Python).expect("moved");
    assert_eq!(moved.uri, saved.uri);
    assert!(moved.path.exists());

    store.cleanup().await.expect("cleanup");
    assert!(!saved.path.exists());
    assert!(store.get(&new, EmbeddedLanguage::Python).is_none());
}
