//! ONU 业务配置 handlers
//!
//! - GET /onu/{b}/{p}/{o}/config - 配置树
//! - POST /onu/{b}/{p}/{o}/vlan | tcont | gemport | service-port - 下发单个条目（幂等）
//! - DELETE /onu/{b}/{p}/{o}/vlan/{id} 等 - 删除单个条目

use crate::AppState;
use crate::utils::{control_error, ok, onu_address};
use axum::{
    Extension, Json,
    extract::{Path, State},
    response::Response,
};
use domain::{DeviceAddress, GemPortConfig, ServicePortConfig, TcontConfig, VlanConfig};
use olt_control::RequestScope;

#[derive(serde::Deserialize)]
pub struct OnuConfigPath {
    board: u32,
    pon: u32,
    onu: u32,
}

impl OnuConfigPath {
    fn address(&self) -> Result<DeviceAddress, Response> {
        onu_address(self.board, self.pon, self.onu)
    }
}

#[derive(serde::Deserialize)]
pub struct OnuElementPath {
    board: u32,
    pon: u32,
    onu: u32,
    id: u32,
}

impl OnuElementPath {
    fn address(&self) -> Result<DeviceAddress, Response> {
        onu_address(self.board, self.pon, self.onu)
    }
}

pub async fn get_onu_config(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<OnuConfigPath>,
) -> Response {
    let address = match path.address() {
        Ok(address) => address,
        Err(response) => return response,
    };
    match state.provisioning.read_config(&scope, address).await {
        Ok(tree) => ok(tree),
        Err(err) => control_error(err),
    }
}

pub async fn set_onu_vlan(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<OnuConfigPath>,
    Json(vlan): Json<VlanConfig>,
) -> Response {
    let address = match path.address() {
        Ok(address) => address,
        Err(response) => return response,
    };
    match state.provisioning.set_vlan(&scope, address, vlan).await {
        Ok(vlan) => ok(vlan),
        Err(err) => control_error(err),
    }
}

pub async fn remove_onu_vlan(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<OnuElementPath>,
) -> Response {
    let address = match path.address() {
        Ok(address) => address,
        Err(response) => return response,
    };
    match state.provisioning.remove_vlan(&scope, address, path.id).await {
        Ok(()) => ok(()),
        Err(err) => control_error(err),
    }
}

pub async fn set_onu_tcont(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<OnuConfigPath>,
    Json(tcont): Json<TcontConfig>,
) -> Response {
    let address = match path.address() {
        Ok(address) => address,
        Err(response) => return response,
    };
    match state.provisioning.set_tcont(&scope, address, tcont).await {
        Ok(tcont) => ok(tcont),
        Err(err) => control_error(err),
    }
}

pub async fn remove_onu_tcont(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<OnuElementPath>,
) -> Response {
    let address = match path.address() {
        Ok(address) => address,
        Err(response) => return response,
    };
    match state.provisioning.remove_tcont(&scope, address, path.id).await {
        Ok(()) => ok(()),
        Err(err) => control_error(err),
    }
}

pub async fn set_onu_gemport(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<OnuConfigPath>,
    Json(gemport): Json<GemPortConfig>,
) -> Response {
    let address = match path.address() {
        Ok(address) => address,
        Err(response) => return response,
    };
    match state.provisioning.set_gemport(&scope, address, gemport).await {
        Ok(gemport) => ok(gemport),
        Err(err) => control_error(err),
    }
}

pub async fn remove_onu_gemport(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<OnuElementPath>,
) -> Response {
    let address = match path.address() {
        Ok(address) => address,
        Err(response) => return response,
    };
    match state.provisioning.remove_gemport(&scope, address, path.id).await {
        Ok(()) => ok(()),
        Err(err) => control_error(err),
    }
}

pub async fn set_onu_service_port(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<OnuConfigPath>,
    Json(port): Json<ServicePortConfig>,
) -> Response {
    let address = match path.address() {
        Ok(address) => address,
        Err(response) => return response,
    };
    match state
        .provisioning
        .set_service_port(&scope, address, port)
        .await
    {
        Ok(port) => ok(port),
        Err(err) => control_error(err),
    }
}

pub async fn remove_onu_service_port(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<OnuElementPath>,
) -> Response {
    let address = match path.address() {
        Ok(address) => address,
        Err(response) => return response,
    };
    match state
        .provisioning
        .remove_service_port(&scope, address, path.id)
        .await
    {
        Ok(()) => ok(()),
        Err(err) => control_error(err),
    }
}
