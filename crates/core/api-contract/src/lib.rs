//! 稳定的 DTO 与 API 响应契约。

use serde::{Deserialize, Serialize};

/// 标准 API 响应封装。
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 单个 ONU 的管理请求体（重启 / 禁用 / 启用 / 删除）。
#[derive(Debug, Deserialize)]
pub struct OnuTargetRequest {
    pub board: u32,
    pub pon: u32,
    #[serde(alias = "onuId")]
    pub onu_id: u32,
}

/// 修改 ONU 描述的请求体。
#[derive(Debug, Deserialize)]
pub struct UpdateDescriptionRequest {
    pub board: u32,
    pub pon: u32,
    #[serde(alias = "onuId")]
    pub onu_id: u32,
    pub description: String,
}

/// 管理操作结果。
#[derive(Debug, Serialize, Deserialize)]
pub struct OnuActionDto {
    pub board: u32,
    pub pon: u32,
    pub onu_id: u32,
    pub action: String,
    pub message: String,
}

/// 批量目标。
#[derive(Debug, Clone, Deserialize)]
pub struct BatchTargetDto {
    pub board: u32,
    pub pon: u32,
    #[serde(alias = "onuId")]
    pub onu_id: u32,
    /// 仅 description 批量使用。
    #[serde(default)]
    pub description: Option<String>,
}

/// 批量请求体。
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub targets: Vec<BatchTargetDto>,
}

/// 整机快照请求体，可省略。
#[derive(Debug, Default, Deserialize)]
pub struct BackupRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// 单 ONU 快照请求体。
#[derive(Debug, Deserialize)]
pub struct BackupOnuRequest {
    pub board: u32,
    pub pon: u32,
    #[serde(alias = "onuId")]
    pub onu_id: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// 快照列表查询参数。
#[derive(Debug, Default, Deserialize)]
pub struct ListBackupsQuery {
    #[serde(default, alias = "type")]
    pub backup_type: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// 进程内计数器快照。
#[derive(Debug, Serialize, Deserialize)]
pub struct MetricsSnapshotDto {
    pub snmp_requests: u64,
    pub snmp_failures: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_bypasses: u64,
    pub single_flight_joins: u64,
    pub batch_item_success: u64,
    pub batch_item_failure: u64,
    pub batch_item_cancelled: u64,
    pub batch_latency_ms_total: u64,
    pub batch_latency_ms_count: u64,
    pub backups_created: u64,
    pub backup_failures: u64,
    pub restores_run: u64,
    pub restore_items_failed: u64,
}
