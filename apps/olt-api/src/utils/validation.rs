//! 输入验证辅助函数
//!
//! 路径与请求体中的地址、快照 ID、标签统一在此校验，失败返回 400 响应。

use crate::utils::response::bad_request_error;
use axum::response::Response;
use domain::{BackupType, DeviceAddress};
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// PON 口地址
pub fn pon_address(board: u32, pon: u32) -> Result<DeviceAddress, Response> {
    DeviceAddress::pon(board, pon).map_err(|err| bad_request_error(err.to_string()))
}

/// ONU 地址
pub fn onu_address(board: u32, pon: u32, onu: u32) -> Result<DeviceAddress, Response> {
    DeviceAddress::onu(board, pon, onu).map_err(|err| bad_request_error(err.to_string()))
}

pub fn parse_backup_id(value: &str) -> Result<Uuid, Response> {
    Uuid::parse_str(value.trim()).map_err(|_| bad_request_error(format!("invalid backup id: {value}")))
}

pub fn parse_backup_type(value: Option<String>) -> Result<Option<BackupType>, Response> {
    match value {
        Some(value) => BackupType::parse(value.trim())
            .map(Some)
            .ok_or_else(|| bad_request_error(format!("invalid backup type: {value}"))),
        None => Ok(None),
    }
}

/// 去除首尾空格，丢弃空标签并去重。
pub fn normalize_tags(tags: Option<Vec<String>>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags.unwrap_or_default() {
        let tag = tag.trim();
        if !tag.is_empty() && !normalized.iter().any(|existing| existing == tag) {
            normalized.push(tag.to_string());
        }
    }
    normalized
}

pub fn normalize_description(value: Option<String>) -> String {
    value.map(|value| value.trim().to_string()).unwrap_or_default()
}

/// 可省略的 JSON 请求体：空体取默认值。
pub fn optional_json<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, Response> {
    if body.iter().all(|byte| byte.is_ascii_whitespace()) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|err| bad_request_error(format!("invalid body: {err}")))
}
