//! 存储接口定义
//!
//! - `CacheStore`：带过期时间的字符串键值存储（读穿缓存后端）
//! - `BackupStore`：配置快照文档存储，文档写入后不再修改

use crate::error::StorageError;
use domain::{BackupSummary, BackupType, ConfigBackup};
use uuid::Uuid;

#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StorageError>;

    /// 删除键；键不存在时返回 `Ok(false)`。
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;
}

#[async_trait::async_trait]
pub trait BackupStore: Send + Sync {
    /// 保存新文档；同 ID 已存在时返回错误。
    async fn save(&self, backup: &ConfigBackup) -> Result<(), StorageError>;

    async fn get(&self, id: Uuid) -> Result<Option<ConfigBackup>, StorageError>;

    /// 按创建时间倒序列出摘要；`limit` 为 0 表示不限制。
    async fn list(
        &self,
        backup_type: Option<BackupType>,
        limit: usize,
    ) -> Result<Vec<BackupSummary>, StorageError>;

    async fn delete(&self, id: Uuid) -> Result<bool, StorageError>;
}

/// 内存 / 文件实现共用的排序与过滤。
pub(crate) fn select_summaries(
    mut items: Vec<BackupSummary>,
    backup_type: Option<BackupType>,
    limit: usize,
) -> Vec<BackupSummary> {
    if let Some(backup_type) = backup_type {
        items.retain(|item| item.backup_type == backup_type);
    }
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    if limit > 0 {
        items.truncate(limit);
    }
    items
}
