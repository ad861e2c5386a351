//! 备份文档内存实现

use crate::error::StorageError;
use crate::traits::{BackupStore, select_summaries};
use domain::{BackupSummary, BackupType, ConfigBackup};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

pub struct InMemoryBackupStore {
    backups: RwLock<HashMap<Uuid, ConfigBackup>>,
}

impl InMemoryBackupStore {
    pub fn new() -> Self {
        Self {
            backups: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.backups.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryBackupStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl BackupStore for InMemoryBackupStore {
    async fn save(&self, backup: &ConfigBackup) -> Result<(), StorageError> {
        let mut backups = self
            .backups
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if backups.contains_key(&backup.id) {
            return Err(StorageError::new(format!("backup {} already exists", backup.id)));
        }
        backups.insert(backup.id, backup.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ConfigBackup>, StorageError> {
        let backups = self
            .backups
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(backups.get(&id).cloned())
    }

    async fn list(
        &self,
        backup_type: Option<BackupType>,
        limit: usize,
    ) -> Result<Vec<BackupSummary>, StorageError> {
        let backups = self
            .backups
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let items = backups.values().map(ConfigBackup::summary).collect();
        Ok(select_summaries(items, backup_type, limit))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StorageError> {
        let mut backups = self
            .backups
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(backups.remove(&id).is_some())
    }
}
