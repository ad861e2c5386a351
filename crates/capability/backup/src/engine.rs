//! 快照采集、存储、导出 / 导入。

use crate::error::BackupError;
use chrono::Utc;
use domain::{
    BackupFailure, BackupMetadata, BackupPayload, BackupSummary, BackupType, ConfigBackup,
    DeviceAddress, OnuConfigBackup,
};
use futures::stream::{self, StreamExt};
use olt_control::{ControlError, OnuService, ProvisioningService, RequestScope};
use olt_storage::BackupStore;
use olt_telemetry::{record_backup_created, record_backup_failure};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct BackupEngineConfig {
    pub created_by: String,
    /// 整机快照的来源标识（设备端点）。
    pub source: String,
    pub device_version: String,
    pub concurrency: usize,
}

impl Default for BackupEngineConfig {
    fn default() -> Self {
        Self {
            created_by: "olt-api".to_string(),
            source: "olt".to_string(),
            device_version: "C320-V2.1".to_string(),
            concurrency: 8,
        }
    }
}

pub struct BackupEngine {
    pub(crate) store: Arc<dyn BackupStore>,
    pub(crate) onus: Arc<OnuService>,
    pub(crate) provisioning: Arc<ProvisioningService>,
    pub(crate) config: BackupEngineConfig,
}

impl BackupEngine {
    pub fn new(
        store: Arc<dyn BackupStore>,
        onus: Arc<OnuService>,
        provisioning: Arc<ProvisioningService>,
    ) -> Self {
        Self::new_with_config(store, onus, provisioning, BackupEngineConfig::default())
    }

    pub fn new_with_config(
        store: Arc<dyn BackupStore>,
        onus: Arc<OnuService>,
        provisioning: Arc<ProvisioningService>,
        config: BackupEngineConfig,
    ) -> Self {
        let config = BackupEngineConfig {
            concurrency: config.concurrency.clamp(1, olt_control::MAX_BATCH_CONCURRENCY),
            ..config
        };
        Self {
            store,
            onus,
            provisioning,
            config,
        }
    }

    /// 单个 ONU 快照；任一子读取失败则不存储。
    pub async fn backup_onu(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
        description: String,
        tags: Vec<String>,
    ) -> Result<ConfigBackup, BackupError> {
        let entry = match self.capture(scope, address).await {
            Ok(entry) => entry,
            Err(err) => {
                record_backup_failure();
                warn!(
                    target: "olt.backup",
                    request_id = %scope.request_id(),
                    address = %address,
                    error = %err,
                    "onu_backup_failed"
                );
                return Err(err.into());
            }
        };
        let backup = self.document(
            BackupPayload::Onu(entry),
            address.to_string(),
            description,
            tags,
        );
        self.persist(scope, backup).await
    }

    /// 整机快照：逐 PON 枚举 ONU，单个实体失败只记录在快照中。
    pub async fn backup_olt(
        &self,
        scope: &RequestScope,
        description: String,
        tags: Vec<String>,
    ) -> Result<ConfigBackup, BackupError> {
        let concurrency = self.config.concurrency;
        let listings: Vec<_> = stream::iter(DeviceAddress::all_pons())
            .map(|pon| async move { (pon, self.onus.list_pon(scope, pon).await) })
            .buffered(concurrency)
            .collect()
            .await;
        let mut failures = Vec::new();
        let mut addresses = Vec::new();
        for (pon, listing) in listings {
            match listing {
                Ok(records) => addresses.extend(
                    records
                        .iter()
                        .filter_map(|record| pon.with_onu(record.onu_id).ok()),
                ),
                Err(ControlError::NotFound(_)) => {}
                Err(ControlError::Cancelled) => return Err(BackupError::Cancelled),
                Err(err) => failures.push(failure(pon, &err)),
            }
        }
        let captures: Vec<_> = stream::iter(addresses)
            .map(|address| async move { (address, self.capture(scope, address).await) })
            .buffered(concurrency)
            .collect()
            .await;
        if scope.is_cancelled() {
            return Err(BackupError::Cancelled);
        }
        let mut onus = Vec::with_capacity(captures.len());
        for (address, capture) in captures {
            match capture {
                Ok(entry) => onus.push(entry),
                Err(err) => {
                    warn!(target: "olt.backup", address = %address, error = %err, "onu_capture_failed");
                    failures.push(failure(address, &err));
                }
            }
        }
        onus.sort_by_key(|entry| entry.address);
        failures.sort_by_key(|failure| failure.address);
        info!(
            target: "olt.backup",
            request_id = %scope.request_id(),
            captured = onus.len(),
            failed = failures.len(),
            "olt_backup_captured"
        );
        let backup = self.document(
            BackupPayload::Olt { onus, failures },
            self.config.source.clone(),
            description,
            tags,
        );
        self.persist(scope, backup).await
    }

    pub async fn list(
        &self,
        backup_type: Option<BackupType>,
        limit: usize,
    ) -> Result<Vec<BackupSummary>, BackupError> {
        Ok(self.store.list(backup_type, limit).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<ConfigBackup, BackupError> {
        self.store.get(id).await?.ok_or(BackupError::NotFound(id))
    }

    /// 永久删除。
    pub async fn delete(&self, id: Uuid) -> Result<(), BackupError> {
        if !self.store.delete(id).await? {
            return Err(BackupError::NotFound(id));
        }
        info!(target: "olt.backup", backup_id = %id, "backup_deleted");
        Ok(())
    }

    /// 原样导出为格式化 JSON 文档。
    pub async fn export(&self, id: Uuid) -> Result<Vec<u8>, BackupError> {
        let backup = self.get(id).await?;
        serde_json::to_vec_pretty(&backup).map_err(|err| BackupError::Document(err.to_string()))
    }

    /// 导入文档：校验后分配新 ID 与时间戳，作为新快照保存。
    pub async fn import(
        &self,
        scope: &RequestScope,
        document: &[u8],
    ) -> Result<ConfigBackup, BackupError> {
        let mut backup: ConfigBackup = serde_json::from_slice(document)
            .map_err(|err| BackupError::Validation(format!("malformed backup document: {err}")))?;
        backup
            .check_consistency()
            .map_err(BackupError::Validation)?;
        let original_id = backup.id;
        backup.id = Uuid::new_v4();
        backup.created_at = Utc::now();
        info!(
            target: "olt.backup",
            request_id = %scope.request_id(),
            original_id = %original_id,
            backup_id = %backup.id,
            "backup_imported"
        );
        self.persist(scope, backup).await
    }

    pub(crate) async fn capture(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
    ) -> Result<OnuConfigBackup, ControlError> {
        let identity = self.provisioning.read_identity(scope, address).await?;
        let config = self.provisioning.read_config(scope, address).await?;
        Ok(OnuConfigBackup {
            address,
            serial_number: identity.serial_number,
            onu_type: identity.onu_type,
            name: identity.name,
            admin_state: identity.admin_state,
            config,
        })
    }

    fn document(
        &self,
        payload: BackupPayload,
        source: String,
        description: String,
        tags: Vec<String>,
    ) -> ConfigBackup {
        ConfigBackup {
            id: Uuid::new_v4(),
            backup_type: payload.backup_type(),
            created_at: Utc::now(),
            description,
            tags,
            metadata: BackupMetadata {
                created_by: self.config.created_by.clone(),
                source,
                version: self.config.device_version.clone(),
                total_onus: payload.onus().len() as u32,
            },
            payload,
        }
    }

    async fn persist(
        &self,
        scope: &RequestScope,
        backup: ConfigBackup,
    ) -> Result<ConfigBackup, BackupError> {
        if let Err(reason) = backup.check_consistency() {
            record_backup_failure();
            return Err(BackupError::Document(reason));
        }
        if let Err(err) = self.store.save(&backup).await {
            record_backup_failure();
            return Err(err.into());
        }
        record_backup_created();
        info!(
            target: "olt.backup",
            request_id = %scope.request_id(),
            backup_id = %backup.id,
            backup_type = backup.backup_type.as_str(),
            total_onus = backup.metadata.total_onus,
            "backup_stored"
        );
        Ok(backup)
    }
}

fn failure(address: DeviceAddress, err: &ControlError) -> BackupFailure {
    BackupFailure {
        address,
        kind: err.kind(),
        message: err.to_string(),
    }
}
