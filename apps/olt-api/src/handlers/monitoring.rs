//! 实时监控 handlers
//!
//! - GET /monitoring/onu/{b}/{p}/{o} - 单个 ONU
//! - GET /monitoring/pon/{b}/{p} - PON 口汇总
//! - GET /monitoring/olt - 整机汇总

use crate::AppState;
use crate::utils::{control_error, ok, onu_address, pon_address};
use axum::{
    Extension,
    extract::{Path, State},
    response::Response,
};
use olt_control::RequestScope;

#[derive(serde::Deserialize)]
pub struct MonitorPonPath {
    board: u32,
    pon: u32,
}

#[derive(serde::Deserialize)]
pub struct MonitorOnuPath {
    board: u32,
    pon: u32,
    onu: u32,
}

pub async fn get_onu_monitoring(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<MonitorOnuPath>,
) -> Response {
    let address = match onu_address(path.board, path.pon, path.onu) {
        Ok(address) => address,
        Err(response) => return response,
    };
    match state.monitoring.onu(&scope, address).await {
        Ok(monitoring) => ok(monitoring),
        Err(err) => control_error(err),
    }
}

pub async fn get_pon_monitoring(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<MonitorPonPath>,
) -> Response {
    let pon = match pon_address(path.board, path.pon) {
        Ok(pon) => pon,
        Err(response) => return response,
    };
    match state.monitoring.pon(&scope, pon).await {
        Ok(monitoring) => ok(monitoring),
        Err(err) => control_error(err),
    }
}

pub async fn get_olt_monitoring(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
) -> Response {
    match state.monitoring.olt(&scope).await {
        Ok(summary) => ok(summary),
        Err(err) => control_error(err),
    }
}
