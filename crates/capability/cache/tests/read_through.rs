use domain::DeviceAddress;
use olt_cache::{ReadThroughCache, ScopeInvalidator, ScopeKey};
use olt_storage::{CacheStore, InMemoryCacheStore, StorageError};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

struct BrokenStore;

#[async_trait::async_trait]
impl CacheStore for BrokenStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::new("connection refused"))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: u64) -> Result<(), StorageError> {
        Err(StorageError::new("connection refused"))
    }

    async fn delete(&self, _key: &str) -> Result<bool, StorageError> {
        Err(StorageError::new("connection refused"))
    }
}

fn pon_scope() -> ScopeKey {
    ScopeKey::Pon(DeviceAddress::pon(1, 1).expect("addr"))
}

#[tokio::test]
async fn put_then_get_hits() {
    let store = Arc::new(InMemoryCacheStore::new());
    let cache: ReadThroughCache<Vec<u32>, String> = ReadThroughCache::new(store, 600);
    cache.put(&pon_scope(), &vec![1, 2, 3]).await.expect("put");
    assert_eq!(
        cache.get(&pon_scope()).await.expect("get"),
        Some(vec![1, 2, 3])
    );

    let fetched = cache
        .get_or_fetch(&pon_scope(), || async { Err::<Vec<u32>, String>("device".to_string()) })
        .await
        .expect("hit");
    assert_eq!(fetched, vec![1, 2, 3]);
}

#[tokio::test]
async fn invalidate_then_miss_refetches() {
    let store: Arc<dyn CacheStore> = Arc::new(InMemoryCacheStore::new());
    let cache: ReadThroughCache<u32, String> = ReadThroughCache::new(store.clone(), 600);
    let calls = AtomicUsize::new(0);
    let fetch = || async {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok::<u32, String>(7)
    };
    assert_eq!(cache.get_or_fetch(&pon_scope(), fetch).await, Ok(7));
    assert_eq!(cache.get_or_fetch(&pon_scope(), fetch).await, Ok(7));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    ScopeInvalidator::new(store).invalidate(&[pon_scope()]).await;
    assert_eq!(cache.get(&pon_scope()).await.expect("get"), None);
    assert_eq!(cache.get_or_fetch(&pon_scope(), fetch).await, Ok(7));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_fetch_is_not_cached() {
    let store = Arc::new(InMemoryCacheStore::new());
    let cache: ReadThroughCache<u32, String> = ReadThroughCache::new(store.clone(), 600);
    let result = cache
        .get_or_fetch(&pon_scope(), || async { Err::<u32, String>("timeout".to_string()) })
        .await;
    assert_eq!(result, Err("timeout".to_string()));
    assert!(store.is_empty());
}

#[tokio::test]
async fn concurrent_misses_share_one_fetch() {
    let store = Arc::new(InMemoryCacheStore::new());
    let cache: Arc<ReadThroughCache<u32, String>> =
        Arc::new(ReadThroughCache::new(store, 600));
    let calls = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let cache = cache.clone();
        let calls = calls.clone();
        handles.push(tokio::spawn(async move {
            cache
                .get_or_fetch(&pon_scope(), || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok::<u32, String>(42)
                })
                .await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.expect("join"), Ok(42));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unavailable_store_is_bypassed() {
    let cache: ReadThroughCache<u32, String> = ReadThroughCache::new(Arc::new(BrokenStore), 600);
    assert!(cache.get(&pon_scope()).await.is_err());
    let value = cache
        .get_or_fetch(&pon_scope(), || async { Ok::<u32, String>(5) })
        .await;
    assert_eq!(value, Ok(5));
    ScopeInvalidator::new(Arc::new(BrokenStore))
        .invalidate(&[pon_scope()])
        .await;
}
