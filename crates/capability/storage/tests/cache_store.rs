use olt_storage::{CacheStore, InMemoryCacheStore};

#[tokio::test]
async fn in_memory_cache_set_get_delete() {
    let store = InMemoryCacheStore::new();
    store
        .set("board_1_pon_1", "[]", 60)
        .await
        .expect("set");
    assert_eq!(
        store.get("board_1_pon_1").await.expect("get").as_deref(),
        Some("[]")
    );
    assert!(store.delete("board_1_pon_1").await.expect("delete"));
    assert!(store.get("board_1_pon_1").await.expect("get").is_none());
}

#[tokio::test]
async fn in_memory_cache_delete_absent_key_is_ok() {
    let store = InMemoryCacheStore::new();
    assert!(!store.delete("board_2_pon_16").await.expect("delete"));
}

#[tokio::test]
async fn in_memory_cache_keys_are_independent() {
    let store = InMemoryCacheStore::new();
    store.set("board_1_pon_1", "a", 60).await.expect("set");
    store.set("board_1_pon_1_onu_1", "b", 60).await.expect("set");
    store.delete("board_1_pon_1").await.expect("delete");
    assert_eq!(
        store.get("board_1_pon_1_onu_1").await.expect("get").as_deref(),
        Some("b")
    );
    assert_eq!(store.len(), 1);
}
