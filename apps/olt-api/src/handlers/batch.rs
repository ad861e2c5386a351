//! 批量 handlers
//!
//! - POST /batch/{reboot|block|unblock|delete|description}
//!
//! 请求整体校验失败返回 400；否则总是 200，逐项结果见 `BatchResult`。

use crate::AppState;
use crate::utils::{bad_request_error, control_error, ok};
use api_contract::BatchRequest;
use axum::{
    Extension, Json,
    extract::{Path, State},
    response::Response,
};
use olt_control::{BatchOperation, BatchTarget, RequestScope};

#[derive(serde::Deserialize)]
pub struct BatchPath {
    operation: String,
}

fn parse_operation(value: &str) -> Option<BatchOperation> {
    match value {
        "reboot" => Some(BatchOperation::Reboot),
        "block" => Some(BatchOperation::Block),
        "unblock" => Some(BatchOperation::Unblock),
        "delete" => Some(BatchOperation::Delete),
        "description" => Some(BatchOperation::UpdateDescription),
        _ => None,
    }
}

pub async fn run_batch(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<BatchPath>,
    Json(req): Json<BatchRequest>,
) -> Response {
    let Some(operation) = parse_operation(&path.operation) else {
        return bad_request_error(format!("unknown batch operation: {}", path.operation));
    };
    let targets = req
        .targets
        .into_iter()
        .map(|target| BatchTarget {
            board: target.board,
            pon: target.pon,
            onu_id: target.onu_id,
            description: target.description,
        })
        .collect();
    match state.batch.execute(&scope, operation, targets).await {
        Ok(result) => ok(result),
        Err(err) => control_error(err),
    }
}
