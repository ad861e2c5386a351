//! 缓存错误类型定义

use olt_storage::StorageError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    /// 缓存存储不可用（调用方应绕过缓存直接读设备）
    #[error("cache unavailable: {0}")]
    Unavailable(StorageError),

    /// 缓存值无法序列化 / 反序列化
    #[error("cache encode: {0}")]
    Encode(String),
}
