use api_contract::{ApiResponse, OnuActionDto};
use serde_json::Value;

#[test]
fn api_response_success() {
    let response = ApiResponse::success("ok");
    assert!(response.success);
    assert!(response.data.is_some());
    assert!(response.error.is_none());
}

#[test]
fn api_response_error() {
    let response = ApiResponse::<()>::error("DEVICE.UNREACHABLE", "no response");
    assert!(!response.success);
    assert!(response.data.is_none());
    let error = response.error.expect("error");
    assert_eq!(error.code, "DEVICE.UNREACHABLE");
    assert_eq!(error.message, "no response");
}

#[test]
fn error_envelope_keeps_null_data() {
    let value = serde_json::to_value(ApiResponse::<()>::error("RESOURCE.NOT_FOUND", "missing"))
        .expect("serialize");
    assert_eq!(value["success"], Value::Bool(false));
    assert!(value["data"].is_null());
    assert_eq!(value["error"]["code"], "RESOURCE.NOT_FOUND");
}

#[test]
fn action_result_is_snake_case() {
    let dto = OnuActionDto {
        board: 1,
        pon: 2,
        onu_id: 3,
        action: "reboot".to_string(),
        message: "applied".to_string(),
    };
    let value = serde_json::to_value(ApiResponse::success(dto)).expect("serialize");
    assert_eq!(value["data"]["onu_id"], 3);
    assert!(value["data"].get("onuId").is_none());
}
