use domain::FailureKind;
use olt_control::ControlError;
use olt_storage::StorageError;
use uuid::Uuid;

/// 配置快照错误。
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("backup {0} not found")]
    NotFound(Uuid),
    /// 采集阶段的设备 / 缓存错误，整份快照放弃。
    #[error("capture failed: {0}")]
    Capture(#[from] ControlError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("document error: {0}")]
    Document(String),
    #[error("backup cancelled")]
    Cancelled,
}

impl BackupError {
    pub fn kind(&self) -> FailureKind {
        match self {
            BackupError::Validation(_) => FailureKind::Validation,
            BackupError::NotFound(_) => FailureKind::NotFound,
            BackupError::Capture(err) => err.kind(),
            BackupError::Storage(_) | BackupError::Document(_) => FailureKind::Internal,
            BackupError::Cancelled => FailureKind::Cancelled,
        }
    }
}
