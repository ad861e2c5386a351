//! 控制链路错误。

use domain::{AddressError, DeviceAddress, FailureKind, InvalidConfig, ItemError};
use olt_protocol::GatewayError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ControlError {
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// 设备交互失败；`address` 为空表示 OLT 级对象（板卡、模板）。
    #[error("{operation} failed: {source}")]
    Device {
        address: Option<DeviceAddress>,
        operation: &'static str,
        #[source]
        source: GatewayError,
    },
    #[error("request cancelled")]
    Cancelled,
    #[error("request deadline exceeded")]
    Timeout,
    #[error("storage error: {0}")]
    Storage(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ControlError {
    pub fn device(
        address: Option<DeviceAddress>,
        operation: &'static str,
        source: GatewayError,
    ) -> Self {
        ControlError::Device {
            address,
            operation,
            source,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            ControlError::Validation(_) => FailureKind::Validation,
            ControlError::NotFound(_) => FailureKind::NotFound,
            ControlError::Device { source, .. } => source.kind(),
            ControlError::Cancelled => FailureKind::Cancelled,
            ControlError::Timeout => FailureKind::Timeout,
            ControlError::Storage(_) | ControlError::Internal(_) => FailureKind::Internal,
        }
    }

    pub fn to_item_error(&self) -> ItemError {
        ItemError::new(self.kind(), self.to_string())
    }
}

impl From<AddressError> for ControlError {
    fn from(err: AddressError) -> Self {
        ControlError::Validation(err.to_string())
    }
}

impl From<InvalidConfig> for ControlError {
    fn from(err: InvalidConfig) -> Self {
        ControlError::Validation(err.to_string())
    }
}
