//! Postgres 备份文档存储
//!
//! 表结构：
//! ```sql
//! create table config_backups (
//!     id text primary key,
//!     backup_type text not null,
//!     created_at_ms bigint not null,
//!     description text not null,
//!     tags jsonb not null,
//!     total_onus integer not null,
//!     document jsonb not null
//! );
//! ```

use crate::error::StorageError;
use crate::traits::BackupStore;
use chrono::{DateTime, Utc};
use domain::{BackupSummary, BackupType, ConfigBackup};
use sqlx::{PgPool, Row};
use uuid::Uuid;

const SCHEMA: &str = "create table if not exists config_backups (\
     id text primary key, \
     backup_type text not null, \
     created_at_ms bigint not null, \
     description text not null, \
     tags jsonb not null, \
     total_onus integer not null, \
     document jsonb not null)";

pub struct PgBackupStore {
    pub pool: PgPool,
}

impl PgBackupStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 通过数据库 URL 建立连接池并确保表存在
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<(), StorageError> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}

fn parse_id(value: &str) -> Result<Uuid, StorageError> {
    Uuid::parse_str(value).map_err(|err| StorageError::new(format!("invalid backup id: {err}")))
}

fn from_ms(ms: i64) -> Result<DateTime<Utc>, StorageError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StorageError::new(format!("invalid created_at_ms: {ms}")))
}

#[async_trait::async_trait]
impl BackupStore for PgBackupStore {
    async fn save(&self, backup: &ConfigBackup) -> Result<(), StorageError> {
        let document = serde_json::to_string(backup)?;
        let tags = serde_json::to_string(&backup.tags)?;
        sqlx::query(
            "insert into config_backups \
             (id, backup_type, created_at_ms, description, tags, total_onus, document) \
             values ($1, $2, $3, $4, $5::jsonb, $6, $7::jsonb)",
        )
        .bind(backup.id.to_string())
        .bind(backup.backup_type.as_str())
        .bind(backup.created_at.timestamp_millis())
        .bind(&backup.description)
        .bind(tags)
        .bind(backup.metadata.total_onus as i32)
        .bind(document)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ConfigBackup>, StorageError> {
        let row = sqlx::query("select document::text as document from config_backups where id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let document: String = row.try_get("document")?;
        Ok(Some(serde_json::from_str(&document)?))
    }

    async fn list(
        &self,
        backup_type: Option<BackupType>,
        limit: usize,
    ) -> Result<Vec<BackupSummary>, StorageError> {
        // limit 为 0 时不限制
        let limit = if limit == 0 { i64::MAX } else { limit as i64 };
        let rows = sqlx::query(
            "select id, backup_type, created_at_ms, description, tags::text as tags, total_onus \
             from config_backups \
             where ($1::text is null or backup_type = $1) \
             order by created_at_ms desc, id desc \
             limit $2",
        )
        .bind(backup_type.map(|t| t.as_str()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get("id")?;
            let backup_type: String = row.try_get("backup_type")?;
            let tags: String = row.try_get("tags")?;
            let total_onus: i32 = row.try_get("total_onus")?;
            items.push(BackupSummary {
                id: parse_id(&id)?,
                backup_type: BackupType::parse(&backup_type).ok_or_else(|| {
                    StorageError::new(format!("invalid backup_type: {backup_type}"))
                })?,
                created_at: from_ms(row.try_get("created_at_ms")?)?,
                description: row.try_get("description")?,
                tags: serde_json::from_str(&tags)?,
                total_onus: total_onus.max(0) as u32,
            });
        }
        Ok(items)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StorageError> {
        let result = sqlx::query("delete from config_backups where id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
