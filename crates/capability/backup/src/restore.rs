//! 快照恢复。

use crate::engine::BackupEngine;
use crate::error::BackupError;
use domain::{BackupPayload, ConfigItem, DeviceAddress, ItemError, OnuConfigBackup};
use futures::stream::{self, StreamExt};
use olt_control::{ElementStatus, RequestScope};
use olt_telemetry::{record_restore_item_failed, record_restore_run};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

/// 恢复选项。目标覆盖只适用于单 ONU 快照，未给出的部分沿用快照中的地址。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreRequest {
    #[serde(default)]
    pub target_board: Option<u32>,
    #[serde(default)]
    pub target_pon: Option<u32>,
    #[serde(default)]
    pub target_onu: Option<u32>,
    #[serde(default)]
    pub dry_run: bool,
    /// 为空表示全部类别。
    #[serde(default)]
    pub items: Option<Vec<ConfigItem>>,
}

impl RestoreRequest {
    fn has_override(&self) -> bool {
        self.target_board.is_some() || self.target_pon.is_some() || self.target_onu.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreItemResult {
    pub address: DeviceAddress,
    pub item: ConfigItem,
    pub element_id: u32,
    pub status: ElementStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ItemError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreResult {
    pub backup_id: Uuid,
    pub dry_run: bool,
    pub success: bool,
    pub restored_onus: usize,
    pub failed_onus: usize,
    pub items: Vec<RestoreItemResult>,
    pub execution_time_ms: u64,
}

impl BackupEngine {
    /// 按 VLAN → T-CONT → GEM → 业务端口顺序回放快照。
    ///
    /// 整机快照的各 ONU 并发恢复（有上限），结果按地址排序。
    pub async fn restore(
        &self,
        scope: &RequestScope,
        backup_id: Uuid,
        request: RestoreRequest,
    ) -> Result<RestoreResult, BackupError> {
        let started = Instant::now();
        let backup = self.get(backup_id).await?;
        let entries = targets(&backup.payload, &request)?;
        let items = request.items.clone().unwrap_or_default();
        record_restore_run();
        info!(
            target: "olt.backup",
            request_id = %scope.request_id(),
            backup_id = %backup_id,
            onus = entries.len(),
            dry_run = request.dry_run,
            "restore_started"
        );

        let items = &items;
        let dry_run = request.dry_run;
        let per_onu: Vec<Vec<RestoreItemResult>> = stream::iter(entries)
            .map(|(address, entry)| async move {
                self.restore_onu(scope, address, entry, items, dry_run).await
            })
            .buffered(self.config.concurrency)
            .boxed()
            .collect()
            .await;

        let mut restored_onus = 0;
        let mut failed_onus = 0;
        for results in &per_onu {
            let ok = results
                .iter()
                .all(|r| matches!(r.status, ElementStatus::Applied | ElementStatus::Planned));
            if ok {
                restored_onus += 1;
            } else {
                failed_onus += 1;
            }
        }
        let items: Vec<RestoreItemResult> = per_onu.into_iter().flatten().collect();
        for item in &items {
            if item.status == ElementStatus::Failed {
                record_restore_item_failed();
            }
        }
        let result = RestoreResult {
            backup_id,
            dry_run,
            success: failed_onus == 0,
            restored_onus,
            failed_onus,
            items,
            execution_time_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            target: "olt.backup",
            request_id = %scope.request_id(),
            backup_id = %backup_id,
            restored = result.restored_onus,
            failed = result.failed_onus,
            execution_time_ms = result.execution_time_ms,
            "restore_finished"
        );
        Ok(result)
    }

    async fn restore_onu(
        &self,
        scope: &RequestScope,
        address: DeviceAddress,
        entry: &OnuConfigBackup,
        items: &[ConfigItem],
        dry_run: bool,
    ) -> Vec<RestoreItemResult> {
        match self
            .provisioning
            .apply_tree(scope, address, &entry.config, items, dry_run)
            .await
        {
            Ok(outcomes) => outcomes
                .into_iter()
                .map(|outcome| RestoreItemResult {
                    address,
                    item: outcome.item,
                    element_id: outcome.element_id,
                    status: outcome.status,
                    error: outcome.error,
                })
                .collect(),
            Err(err) => ConfigItem::ALL
                .iter()
                .filter(|item| items.is_empty() || items.contains(item))
                .map(|item| RestoreItemResult {
                    address,
                    item: *item,
                    element_id: 0,
                    status: ElementStatus::Failed,
                    error: Some(err.to_item_error()),
                })
                .collect(),
        }
    }
}

/// 解析恢复目标；整机快照不接受目标覆盖。
fn targets<'a>(
    payload: &'a BackupPayload,
    request: &RestoreRequest,
) -> Result<Vec<(DeviceAddress, &'a OnuConfigBackup)>, BackupError> {
    match payload {
        BackupPayload::Onu(entry) => {
            let original = entry.address;
            let address = if request.has_override() {
                DeviceAddress::onu(
                    request.target_board.unwrap_or(original.board()),
                    request.target_pon.unwrap_or(original.pon_id()),
                    request
                        .target_onu
                        .or(original.onu_id())
                        .unwrap_or_default(),
                )
                .map_err(|err| BackupError::Validation(err.to_string()))?
            } else {
                original
            };
            Ok(vec![(address, entry)])
        }
        BackupPayload::Olt { onus, .. } => {
            if request.has_override() {
                return Err(BackupError::Validation(
                    "target override applies to onu backups only".to_string(),
                ));
            }
            let mut entries: Vec<_> = onus.iter().map(|entry| (entry.address, entry)).collect();
            entries.sort_by_key(|(address, _)| *address);
            Ok(entries)
        }
    }
}
