//! 备份文档文件存储
//!
//! 每个备份一个 `{dir}/{id}.json` 文件，内容即导出格式。

use crate::error::StorageError;
use crate::traits::{BackupStore, select_summaries};
use domain::{BackupSummary, BackupType, ConfigBackup};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

pub struct FileBackupStore {
    dir: PathBuf,
    // 同一进程内的写入 / 删除串行
    write_lock: Mutex<()>,
}

impl FileBackupStore {
    /// 打开目录，不存在时创建。
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

async fn read_document(path: &Path) -> Result<Option<ConfigBackup>, StorageError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

#[async_trait::async_trait]
impl BackupStore for FileBackupStore {
    async fn save(&self, backup: &ConfigBackup) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let path = self.path_for(backup.id);
        if tokio::fs::try_exists(&path).await? {
            return Err(StorageError::new(format!("backup {} already exists", backup.id)));
        }
        let data = serde_json::to_vec_pretty(backup)?;
        // 先写临时文件再改名，读取方不会看到半个文档
        let tmp = self.dir.join(format!(".{}.json.tmp", backup.id));
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ConfigBackup>, StorageError> {
        read_document(&self.path_for(id)).await
    }

    async fn list(
        &self,
        backup_type: Option<BackupType>,
        limit: usize,
    ) -> Result<Vec<BackupSummary>, StorageError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut items = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_document = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(".json") && !name.starts_with('.'));
            if !is_document {
                continue;
            }
            match read_document(&path).await {
                Ok(Some(backup)) => items.push(backup.summary()),
                Ok(None) => {}
                Err(err) => {
                    warn!(
                        target: "olt.storage",
                        path = %path.display(),
                        error = %err,
                        "backup_document_unreadable"
                    );
                }
            }
        }
        Ok(select_summaries(items, backup_type, limit))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StorageError> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(self.path_for(id)).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}
