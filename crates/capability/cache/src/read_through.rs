//! 读穿缓存。
//!
//! 命中直接返回；未命中获取、写回、返回。存储故障时记录日志并绕过缓存。

use crate::error::CacheError;
use crate::scope::ScopeKey;
use crate::single_flight::SingleFlight;
use olt_storage::CacheStore;
use olt_telemetry::{record_cache_bypass, record_cache_hit, record_cache_miss};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ReadThroughCache<T, E> {
    store: Arc<dyn CacheStore>,
    ttl_seconds: u64,
    flights: SingleFlight<Result<T, E>>,
}

impl<T, E> ReadThroughCache<T, E>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync,
    E: Clone,
{
    pub fn new(store: Arc<dyn CacheStore>, ttl_seconds: u64) -> Self {
        Self {
            store,
            ttl_seconds,
            flights: SingleFlight::new(),
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// 读取缓存；条目损坏视为未命中。
    pub async fn get(&self, scope: &ScopeKey) -> Result<Option<T>, CacheError> {
        let key = scope.to_string();
        let Some(text) = self
            .store
            .get(&key)
            .await
            .map_err(CacheError::Unavailable)?
        else {
            return Ok(None);
        };
        match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(target: "olt.cache", key = %key, error = %err, "cache_entry_corrupt");
                Ok(None)
            }
        }
    }

    pub async fn put(&self, scope: &ScopeKey, value: &T) -> Result<(), CacheError> {
        self.put_with_ttl(scope, value, self.ttl_seconds).await
    }

    pub async fn put_with_ttl(
        &self,
        scope: &ScopeKey,
        value: &T,
        ttl_seconds: u64,
    ) -> Result<(), CacheError> {
        let text = serde_json::to_string(value).map_err(|err| CacheError::Encode(err.to_string()))?;
        self.store
            .set(&scope.to_string(), &text, ttl_seconds)
            .await
            .map_err(CacheError::Unavailable)
    }

    pub async fn invalidate(&self, scope: &ScopeKey) -> Result<bool, CacheError> {
        self.store
            .delete(&scope.to_string())
            .await
            .map_err(CacheError::Unavailable)
    }

    /// 命中返回缓存值；未命中时同一键的并发调用只执行一次 `fetch`。
    ///
    /// `fetch` 失败不写缓存，错误原样返回给所有等待方。
    pub async fn get_or_fetch<F, Fut>(&self, scope: &ScopeKey, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = scope.to_string();
        let mut store_available = true;
        match self.get(scope).await {
            Ok(Some(value)) => {
                record_cache_hit();
                debug!(target: "olt.cache", key = %key, "cache_hit");
                return Ok(value);
            }
            Ok(None) => record_cache_miss(),
            Err(err) => {
                store_available = false;
                record_cache_bypass();
                warn!(target: "olt.cache", key = %key, error = %err, "cache_bypassed");
            }
        }
        self.flights
            .run(&key, || async {
                let value = fetch().await?;
                if store_available {
                    if let Err(err) = self.put(scope, &value).await {
                        record_cache_bypass();
                        warn!(target: "olt.cache", key = %key, error = %err, "cache_repopulate_failed");
                    }
                }
                Ok(value)
            })
            .await
    }
}

/// 跨类型的作用域失效。失效失败只记录日志，不影响调用方。
#[derive(Clone)]
pub struct ScopeInvalidator {
    store: Arc<dyn CacheStore>,
}

impl ScopeInvalidator {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    pub async fn invalidate(&self, scopes: &[ScopeKey]) {
        for scope in scopes {
            let key = scope.to_string();
            match self.store.delete(&key).await {
                Ok(removed) => {
                    debug!(target: "olt.cache", key = %key, removed, "cache_invalidated");
                }
                Err(err) => {
                    warn!(target: "olt.cache", key = %key, error = %err, "cache_invalidate_failed");
                }
            }
        }
    }
}
