//! ONU 管理 handlers
//!
//! - POST /onu-management/reboot | block | unblock
//! - POST /onu-management/description
//! - DELETE /onu-management/delete

use crate::AppState;
use crate::utils::{control_error, ok, onu_address};
use api_contract::{OnuActionDto, OnuTargetRequest, UpdateDescriptionRequest};
use axum::{Extension, Json, extract::State, response::Response};
use domain::DeviceAddress;
use olt_control::{ControlError, RequestScope};

#[derive(Clone, Copy)]
enum Action {
    Reboot,
    Block,
    Unblock,
    Delete,
}

impl Action {
    fn as_str(self) -> &'static str {
        match self {
            Action::Reboot => "reboot",
            Action::Block => "block",
            Action::Unblock => "unblock",
            Action::Delete => "delete",
        }
    }
}

pub async fn reboot_onu(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Json(req): Json<OnuTargetRequest>,
) -> Response {
    run_action(&state, &scope, req, Action::Reboot).await
}

pub async fn block_onu(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Json(req): Json<OnuTargetRequest>,
) -> Response {
    run_action(&state, &scope, req, Action::Block).await
}

pub async fn unblock_onu(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Json(req): Json<OnuTargetRequest>,
) -> Response {
    run_action(&state, &scope, req, Action::Unblock).await
}

pub async fn delete_onu(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Json(req): Json<OnuTargetRequest>,
) -> Response {
    run_action(&state, &scope, req, Action::Delete).await
}

pub async fn update_onu_description(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Json(req): Json<UpdateDescriptionRequest>,
) -> Response {
    let address = match onu_address(req.board, req.pon, req.onu_id) {
        Ok(address) => address,
        Err(response) => return response,
    };
    match state
        .onus
        .update_description(&scope, address, &req.description)
        .await
    {
        Ok(()) => ok(action_result(address, "update_description")),
        Err(err) => control_error(err),
    }
}

async fn run_action(
    state: &AppState,
    scope: &RequestScope,
    req: OnuTargetRequest,
    action: Action,
) -> Response {
    let address = match onu_address(req.board, req.pon, req.onu_id) {
        Ok(address) => address,
        Err(response) => return response,
    };
    let result: Result<(), ControlError> = match action {
        Action::Reboot => state.onus.reboot(scope, address).await,
        Action::Block => state.onus.block(scope, address).await,
        Action::Unblock => state.onus.unblock(scope, address).await,
        Action::Delete => state.onus.delete(scope, address).await,
    };
    match result {
        Ok(()) => ok(action_result(address, action.as_str())),
        Err(err) => control_error(err),
    }
}

fn action_result(address: DeviceAddress, action: &str) -> OnuActionDto {
    OnuActionDto {
        board: address.board(),
        pon: address.pon_id(),
        onu_id: address.onu_id().unwrap_or_default(),
        action: action.to_string(),
        message: format!("{action} applied to {address}"),
    }
}
