//! PON / ONU 查询 handlers
//!
//! - GET /board/{b}/pon/{p} - PON 口 ONU 列表（读穿缓存）
//! - DELETE /board/{b}/pon/{p} - 清除 PON 列表缓存
//! - GET /board/{b}/pon/{p}/info - PON 口状态
//! - GET /board/{b}/pon/{p}/onu/{o} - ONU 详情
//! - GET /board/{b}/pon/{p}/onu_id/empty - 空闲 ONU 编号
//! - POST /board/{b}/pon/{p}/onu_id/update - 重新计算空闲编号
//! - GET /board/{b}/pon/{p}/onu_id_sn - ONU 编号与序列号

use crate::AppState;
use crate::utils::{control_error, ok, onu_address, pon_address};
use axum::{
    Extension,
    extract::{Path, State},
    response::Response,
};
use olt_control::RequestScope;

#[derive(serde::Deserialize)]
pub struct PonPath {
    board: u32,
    pon: u32,
}

#[derive(serde::Deserialize)]
pub struct OnuPath {
    board: u32,
    pon: u32,
    onu: u32,
}

pub async fn list_pon_onus(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<PonPath>,
) -> Response {
    let pon = match pon_address(path.board, path.pon) {
        Ok(pon) => pon,
        Err(response) => return response,
    };
    match state.onus.list_pon(&scope, pon).await {
        Ok(records) => ok(records),
        Err(err) => control_error(err),
    }
}

pub async fn clear_pon_cache(
    State(state): State<AppState>,
    Path(path): Path<PonPath>,
) -> Response {
    let pon = match pon_address(path.board, path.pon) {
        Ok(pon) => pon,
        Err(response) => return response,
    };
    state.onus.clear_pon_cache(pon).await;
    ok(serde_json::json!({ "message": format!("cache cleared for {pon}") }))
}

pub async fn get_pon_info(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<PonPath>,
) -> Response {
    let pon = match pon_address(path.board, path.pon) {
        Ok(pon) => pon,
        Err(response) => return response,
    };
    match state.onus.pon_info(&scope, pon).await {
        Ok(info) => ok(info),
        Err(err) => control_error(err),
    }
}

pub async fn get_onu_detail(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<OnuPath>,
) -> Response {
    let address = match onu_address(path.board, path.pon, path.onu) {
        Ok(address) => address,
        Err(response) => return response,
    };
    match state.onus.onu_detail(&scope, address).await {
        Ok(detail) => ok(detail),
        Err(err) => control_error(err),
    }
}

pub async fn get_empty_onu_ids(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<PonPath>,
) -> Response {
    let pon = match pon_address(path.board, path.pon) {
        Ok(pon) => pon,
        Err(response) => return response,
    };
    match state.onus.empty_onu_ids(&scope, pon).await {
        Ok(ids) => ok(ids),
        Err(err) => control_error(err),
    }
}

pub async fn update_empty_onu_ids(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<PonPath>,
) -> Response {
    let pon = match pon_address(path.board, path.pon) {
        Ok(pon) => pon,
        Err(response) => return response,
    };
    match state.onus.update_empty_onu_ids(&scope, pon).await {
        Ok(ids) => ok(ids),
        Err(err) => control_error(err),
    }
}

pub async fn get_onu_serials(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<PonPath>,
) -> Response {
    let pon = match pon_address(path.board, path.pon) {
        Ok(pon) => pon,
        Err(response) => return response,
    };
    match state.onus.onu_serials(&scope, pon).await {
        Ok(serials) => ok(serials),
        Err(err) => control_error(err),
    }
}
