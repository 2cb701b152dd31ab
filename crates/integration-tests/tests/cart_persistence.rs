//! File-backed carts across store restarts.

#![allow(clippy::unwrap_used)]

use pocket_cart::{CartConfig, KeyValueStore, FileStore};
use pocket_cart_integration_tests::{TEST_KEY, open_file_cart, product, product_id, quantities};

// =============================================================================
// Restart
// =============================================================================

#[tokio::test]
async fn test_cart_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let store = open_file_cart(dir.path(), CartConfig::default()).await;
    store.add_to_cart(product("a", "Shirt", 1000)).await.unwrap();
    store.add_to_cart(product("b", "Hat", 500)).await.unwrap();
    store.increment(&product_id("a")).await.unwrap();
    let before = store.cart();
    store.shutdown().await;

    let reopened = open_file_cart(dir.path(), CartConfig::default()).await;
    assert_eq!(reopened.cart(), before);
    assert_eq!(
        quantities(&reopened.cart()),
        vec![("a".into(), 2), ("b".into(), 1)]
    );
}

#[tokio::test]
async fn test_empty_directory_hydrates_empty_twice() {
    let dir = tempfile::tempdir().unwrap();

    let first = open_file_cart(dir.path(), CartConfig::default()).await;
    assert!(first.cart().is_empty());
    first.shutdown().await;

    let second = open_file_cart(dir.path(), CartConfig::default()).await;
    assert!(second.cart().is_empty());
}

#[tokio::test]
async fn test_cleared_cart_stays_cleared() {
    let dir = tempfile::tempdir().unwrap();

    let store = open_file_cart(dir.path(), CartConfig::default()).await;
    store.add_to_cart(product("a", "Shirt", 1000)).await.unwrap();
    store.clear().await.unwrap();
    store.shutdown().await;

    let reopened = open_file_cart(dir.path(), CartConfig::default()).await;
    assert!(reopened.cart().is_empty());
}

// =============================================================================
// Stored blobs
// =============================================================================

#[tokio::test]
async fn test_stored_blob_is_json_array() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_file_cart(dir.path(), CartConfig::default()).await;
    store.add_to_cart(product("a", "Shirt", 1000)).await.unwrap();

    let storage = FileStore::open(dir.path()).await.unwrap();
    let blob = storage.get(TEST_KEY).await.unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&blob).unwrap();

    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items.first().unwrap()["id"], "a");
    assert_eq!(items.first().unwrap()["quantity"], 1);
    assert_eq!(
        items.first().unwrap()["image_url"],
        "https://img.example/a.png"
    );
}

#[tokio::test]
async fn test_legacy_blob_with_duplicates_is_normalized() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStore::open(dir.path()).await.unwrap();
    let legacy = r#"[
        {"id":"a","title":"Shirt","image_url":"u","price":10,"quantity":1},
        {"id":"a","title":"Shirt","image_url":"u","price":10,"quantity":1},
        {"id":"b","title":"Hat","image_url":"v","price":5,"quantity":0}
    ]"#;
    storage.set(TEST_KEY, legacy).await.unwrap();

    let store = open_file_cart(dir.path(), CartConfig::default()).await;
    assert_eq!(quantities(&store.cart()), vec![("a".into(), 2)]);

    store.increment(&product_id("a")).await.unwrap();
    let blob = storage.get(TEST_KEY).await.unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&blob).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_corrupt_blob_starts_empty_and_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStore::open(dir.path()).await.unwrap();
    storage.set(TEST_KEY, "[{\"id\":").await.unwrap();

    let store = open_file_cart(dir.path(), CartConfig::default()).await;
    assert!(store.cart().is_empty());

    store.add_to_cart(product("a", "Shirt", 1000)).await.unwrap();
    store.shutdown().await;

    let reopened = open_file_cart(dir.path(), CartConfig::default()).await;
    assert_eq!(quantities(&reopened.cart()), vec![("a".into(), 1)]);
}
