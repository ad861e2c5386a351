//! 机框与模板 handlers
//!
//! - GET /system/cards, GET /system/cards/{rack}/{shelf}/{slot}
//! - GET /profiles/traffic, GET /profiles/traffic/{id}, GET /profiles/vlan
//! - GET/POST /traffic/dba-profile, GET/PUT/DELETE /traffic/dba-profile/{name}

use crate::AppState;
use crate::utils::{control_error, ok};
use axum::{
    Extension, Json,
    extract::{Path, State},
    response::Response,
};
use domain::DbaProfile;
use olt_control::RequestScope;

#[derive(serde::Deserialize)]
pub struct CardPath {
    rack: u32,
    shelf: u32,
    slot: u32,
}

#[derive(serde::Deserialize)]
pub struct TrafficProfilePath {
    id: u32,
}

#[derive(serde::Deserialize)]
pub struct DbaProfilePath {
    name: String,
}

pub async fn list_cards(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
) -> Response {
    match state.inventory.cards(&scope).await {
        Ok(cards) => ok(cards),
        Err(err) => control_error(err),
    }
}

pub async fn get_card(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<CardPath>,
) -> Response {
    match state
        .inventory
        .card(&scope, path.rack, path.shelf, path.slot)
        .await
    {
        Ok(card) => ok(card),
        Err(err) => control_error(err),
    }
}

pub async fn list_traffic_profiles(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
) -> Response {
    match state.inventory.traffic_profiles(&scope).await {
        Ok(profiles) => ok(profiles),
        Err(err) => control_error(err),
    }
}

pub async fn get_traffic_profile(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<TrafficProfilePath>,
) -> Response {
    match state.inventory.traffic_profile(&scope, path.id).await {
        Ok(profile) => ok(profile),
        Err(err) => control_error(err),
    }
}

pub async fn list_vlan_profiles(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
) -> Response {
    match state.inventory.vlan_profiles(&scope).await {
        Ok(profiles) => ok(profiles),
        Err(err) => control_error(err),
    }
}

pub async fn list_dba_profiles(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
) -> Response {
    match state.inventory.dba_profiles(&scope).await {
        Ok(profiles) => ok(profiles),
        Err(err) => control_error(err),
    }
}

pub async fn create_dba_profile(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Json(profile): Json<DbaProfile>,
) -> Response {
    match state.inventory.create_dba_profile(&scope, profile).await {
        Ok(profile) => ok(profile),
        Err(err) => control_error(err),
    }
}

pub async fn get_dba_profile(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<DbaProfilePath>,
) -> Response {
    match state.inventory.dba_profile(&scope, &path.name).await {
        Ok(profile) => ok(profile),
        Err(err) => control_error(err),
    }
}

/// 名称以路径为准，请求体中的 name 被忽略。
pub async fn update_dba_profile(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<DbaProfilePath>,
    Json(profile): Json<DbaProfile>,
) -> Response {
    match state
        .inventory
        .update_dba_profile(&scope, &path.name, profile)
        .await
    {
        Ok(profile) => ok(profile),
        Err(err) => control_error(err),
    }
}

pub async fn delete_dba_profile(
    State(state): State<AppState>,
    Extension(scope): Extension<RequestScope>,
    Path(path): Path<DbaProfilePath>,
) -> Response {
    match state.inventory.delete_dba_profile(&scope, &path.name).await {
        Ok(()) => ok(()),
        Err(err) => control_error(err),
    }
}
