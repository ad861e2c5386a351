//! HTTP 响应辅助函数
//!
//! 所有失败按分类映射为状态码与错误码，响应体统一为 `ApiResponse`：
//!
//! | 分类 | 状态码 | 错误码 |
//! |---|---|---|
//! | Validation | 400 | `INVALID.REQUEST` |
//! | NotFound | 404 | `RESOURCE.NOT_FOUND` |
//! | Unreachable | 503 | `DEVICE.UNREACHABLE` |
//! | Timeout | 504 | `DEVICE.TIMEOUT` |
//! | Rejected | 502 | `DEVICE.REJECTED` |
//! | Malformed | 502 | `DEVICE.MALFORMED` |
//! | Cancelled | 503 | `REQUEST.CANCELLED` |
//! | Internal | 500 | `INTERNAL.ERROR` |

use api_contract::ApiResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::FailureKind;
use olt_backup::BackupError;
use olt_control::ControlError;
use serde::Serialize;
use tracing::warn;

/// 200 成功响应
pub fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    failure_response(FailureKind::Validation, message)
}

pub fn status_and_code(kind: FailureKind) -> (StatusCode, &'static str) {
    match kind {
        FailureKind::Validation => (StatusCode::BAD_REQUEST, "INVALID.REQUEST"),
        FailureKind::NotFound => (StatusCode::NOT_FOUND, "RESOURCE.NOT_FOUND"),
        FailureKind::Unreachable => (StatusCode::SERVICE_UNAVAILABLE, "DEVICE.UNREACHABLE"),
        FailureKind::Timeout => (StatusCode::GATEWAY_TIMEOUT, "DEVICE.TIMEOUT"),
        FailureKind::Rejected => (StatusCode::BAD_GATEWAY, "DEVICE.REJECTED"),
        FailureKind::Malformed => (StatusCode::BAD_GATEWAY, "DEVICE.MALFORMED"),
        FailureKind::Cancelled => (StatusCode::SERVICE_UNAVAILABLE, "REQUEST.CANCELLED"),
        FailureKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL.ERROR"),
    }
}

pub fn failure_response(kind: FailureKind, message: impl Into<String>) -> Response {
    let (status, code) = status_and_code(kind);
    (status, Json(ApiResponse::<()>::error(code, message.into()))).into_response()
}

/// 控制面错误响应
pub fn control_error(err: ControlError) -> Response {
    let kind = err.kind();
    if kind == FailureKind::Internal {
        warn!(target: "olt.api", error = %err, "control_internal_error");
    }
    failure_response(kind, err.to_string())
}

/// 快照错误响应
pub fn backup_error(err: BackupError) -> Response {
    let kind = err.kind();
    if kind == FailureKind::Internal {
        warn!(target: "olt.api", error = %err, "backup_internal_error");
    }
    failure_response(kind, err.to_string())
}
