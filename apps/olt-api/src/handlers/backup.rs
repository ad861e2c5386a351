//! 配置快照 handlers
//!
//! - POST /backup/onu, POST /backup/olt - 采集快照
//! - GET /backups - 摘要列表（?type=onu|olt&limit=N）
//! - GET /backups/{id}, DELETE /backups/{id}
//! - GET /backups/{id}/export - 下载 JSON 文档
//! - POST /backups/import - 上传 JSON 文档，保存为新快照
//! - POST /backups/{id}/restore - 恢复（可选目标覆盖、dry_run、条目过滤）

use crate::AppState;
use crate::utils::{
    backup_error, normalize_description, normalize_tags, ok, onu_address, optional_json,
    parse_backup_id, parse_backup_type,
};
use api_contract::{BackupOnuRequest, BackupRequest, ListBackupsQuery};
use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use olt_backup::RestoreRequest;
use olt_control::RequestScope;

#[derive(serde::Deserialize)]
pub struct BackupPath {
    id: String,
}

pub async fn backup_onu(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Json(req): Json<BackupOnuRequest>,
) -> Response {
    let address = match onu_address(req.board, req.pon, req.onu_id) {
        Ok(address) => address,
        Err(response) => return response,
    };
    match state
        .backups
        .backup_onu(
            &scope,
            address,
            normalize_description(req.description),
            normalize_tags(req.tags),
        )
        .await
    {
        Ok(backup) => ok(backup),
        Err(err) => backup_error(err),
    }
}

pub async fn backup_olt(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    body: Bytes,
) -> Response {
    let req: BackupRequest = match optional_json(&body) {
        Ok(req) => req,
        Err(response) => return response,
    };
    match state
        .backups
        .backup_olt(
            &scope,
            normalize_description(req.description),
            normalize_tags(req.tags),
        )
        .await
    {
        Ok(backup) => ok(backup),
        Err(err) => backup_error(err),
    }
}

pub async fn list_backups(
    State(state): State<AppState>,
    Query(query): Query<ListBackupsQuery>,
) -> Response {
    let backup_type = match parse_backup_type(query.backup_type) {
        Ok(backup_type) => backup_type,
        Err(response) => return response,
    };
    // 0 或缺省表示不限制
    match state
        .backups
        .list(backup_type, query.limit.unwrap_or(0))
        .await
    {
        Ok(items) => ok(items),
        Err(err) => backup_error(err),
    }
}

pub async fn get_backup(
    State(state): State<AppState>,
    Path(path): Path<BackupPath>,
) -> Response {
    let id = match parse_backup_id(&path.id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.backups.get(id).await {
        Ok(backup) => ok(backup),
        Err(err) => backup_error(err),
    }
}

pub async fn delete_backup(
    State(state): State<AppState>,
    Path(path): Path<BackupPath>,
) -> Response {
    let id = match parse_backup_id(&path.id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.backups.delete(id).await {
        Ok(()) => ok(()),
        Err(err) => backup_error(err),
    }
}

/// 响应体即快照文档本身，不加 `ApiResponse` 封装。
pub async fn export_backup(
    State(state): State<AppState>,
    Path(path): Path<BackupPath>,
) -> Response {
    let id = match parse_backup_id(&path.id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let document = match state.backups.export(id).await {
        Ok(document) => document,
        Err(err) => return backup_error(err),
    };
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"backup_{id}.json\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/json")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document,
    )
        .into_response()
}

pub async fn import_backup(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    body: Bytes,
) -> Response {
    match state.backups.import(&scope, &body).await {
        Ok(backup) => ok(backup),
        Err(err) => backup_error(err),
    }
}

pub async fn restore_backup(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<BackupPath>,
    body: Bytes,
) -> Response {
    let id = match parse_backup_id(&path.id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let request: RestoreRequest = match optional_json(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    match state.backups.restore(&scope, id, request).await {
        Ok(result) => ok(result),
        Err(err) => backup_error(err),
    }
}
