//! 配置快照文档。
//!
//! 快照创建后不可修改，只能按 ID 读取或永久删除。载荷自描述：恢复时不依赖载荷之外的任何状态。

use crate::address::DeviceAddress;
use crate::failure::FailureKind;
use crate::provisioning::OnuConfigTree;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupType {
    Onu,
    Olt,
}

impl BackupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackupType::Onu => "onu",
            BackupType::Olt => "olt",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "onu" => Some(BackupType::Onu),
            "olt" => Some(BackupType::Olt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupMetadata {
    pub created_by: String,
    /// 采集来源（设备地址）。
    pub source: String,
    pub version: String,
    pub total_onus: u32,
}

/// 单个 ONU 的快照条目。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnuConfigBackup {
    pub address: DeviceAddress,
    pub serial_number: String,
    pub onu_type: String,
    pub name: String,
    pub admin_state: String,
    pub config: OnuConfigTree,
}

/// 整机备份时单个实体的采集失败记录。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupFailure {
    pub address: DeviceAddress,
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackupPayload {
    Onu(OnuConfigBackup),
    Olt {
        /// 按 DeviceAddress 升序。
        onus: Vec<OnuConfigBackup>,
        #[serde(default)]
        failures: Vec<BackupFailure>,
    },
}

impl BackupPayload {
    pub fn backup_type(&self) -> BackupType {
        match self {
            BackupPayload::Onu(_) => BackupType::Onu,
            BackupPayload::Olt { .. } => BackupType::Olt,
        }
    }

    pub fn onus(&self) -> Vec<&OnuConfigBackup> {
        match self {
            BackupPayload::Onu(entry) => vec![entry],
            BackupPayload::Olt { onus, .. } => onus.iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigBackup {
    pub id: Uuid,
    pub backup_type: BackupType,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub metadata: BackupMetadata,
    pub payload: BackupPayload,
}

impl ConfigBackup {
    pub fn summary(&self) -> BackupSummary {
        BackupSummary {
            id: self.id,
            backup_type: self.backup_type,
            created_at: self.created_at,
            description: self.description.clone(),
            tags: self.tags.clone(),
            total_onus: self.metadata.total_onus,
        }
    }

    /// 校验文档自洽：类型与载荷一致、地址合法、配置树内引用闭合。
    pub fn check_consistency(&self) -> Result<(), String> {
        if self.payload.backup_type() != self.backup_type {
            return Err(format!(
                "backup_type {} does not match payload",
                self.backup_type.as_str()
            ));
        }
        for entry in self.payload.onus() {
            entry
                .address
                .validate()
                .map_err(|err| format!("{}: {}", entry.address, err))?;
            if !entry.address.is_onu() {
                return Err(format!("{} is not an onu address", entry.address));
            }
            if let Some(reference) = entry.config.dangling_reference() {
                return Err(format!("{}: {}", entry.address, reference));
            }
        }
        Ok(())
    }
}

/// 列表接口返回的元数据（不含载荷）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSummary {
    pub id: Uuid,
    pub backup_type: BackupType,
    pub created_at: DateTime<Utc>,
    pub description: String,
    pub tags: Vec<String>,
    pub total_onus: u32,
}
