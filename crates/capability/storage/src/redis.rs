//! Redis 缓存存储
//!
//! 多实例共享；写入使用 `SETEX`，过期由 Redis 负责。

use crate::error::StorageError;
use crate::traits::CacheStore;
use redis::AsyncCommands;

pub struct RedisCacheStore {
    client: redis::Client,
}

impl RedisCacheStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    pub fn connect(redis_url: &str) -> Result<Self, StorageError> {
        let client =
            redis::Client::open(redis_url).map_err(|err| StorageError::new(err.to_string()))?;
        Ok(Self::new(client))
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, StorageError> {
        self.client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|err| StorageError::new(err.to_string()))
    }
}

#[async_trait::async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut connection = self.connection().await?;
        connection
            .get(key)
            .await
            .map_err(|err| StorageError::new(err.to_string()))
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StorageError> {
        let mut connection = self.connection().await?;
        connection
            .set_ex::<_, _, ()>(key, value, ttl_seconds.max(1))
            .await
            .map_err(|err| StorageError::new(err.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let mut connection = self.connection().await?;
        let removed: u64 = connection
            .del(key)
            .await
            .map_err(|err| StorageError::new(err.to_string()))?;
        Ok(removed > 0)
    }
}
