use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use domain::DeviceAddress;
use http_body_util::BodyExt;
use olt_api::{AppState, ServiceSettings, build_app};
use olt_protocol::codec::{encode, EntityKind, MonitorAttribute};
use olt_protocol::{DeviceGateway, MemoryTransport, Oid, SnmpValue};
use olt_storage::{InMemoryBackupStore, InMemoryCacheStore};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

fn app_with(agent: Arc<MemoryTransport>) -> Router {
    let gateway = DeviceGateway::new(agent, Duration::from_millis(500), "memory".to_string());
    let state = AppState::new(
        gateway,
        Arc::new(InMemoryCacheStore::new()),
        Arc::new(InMemoryBackupStore::new()),
        ServiceSettings::default(),
        CancellationToken::new(),
    );
    build_app(state)
}

fn seeded_agent() -> Arc<MemoryTransport> {
    let agent = Arc::new(MemoryTransport::new());
    for onu in [2, 1] {
        let address = DeviceAddress::onu(1, 1, onu).expect("address");
        agent.register_onu(&address, &format!("user-{onu}"), &format!("ZTEG0000000{onu}"));
    }
    agent
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = call_raw(app, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn call_raw(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, bytes::Bytes) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect")
        .to_bytes();
    (status, bytes)
}

#[tokio::test]
async fn health_echoes_request_ids() {
    let app = app_with(Arc::new(MemoryTransport::new()));
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert!(response.headers().contains_key("x-trace-id"));
}

#[tokio::test]
async fn pon_listing_is_sorted_in_envelope() {
    let app = app_with(seeded_agent());
    let (status, body) = call(&app, Method::GET, "/api/v1/board/1/pon/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let ids: Vec<u64> = body["data"]
        .as_array()
        .expect("list")
        .iter()
        .map(|record| record["onu_id"].as_u64().expect("onu_id"))
        .collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn failures_map_to_status_and_code() {
    let app = app_with(seeded_agent());

    let (status, body) = call(&app, Method::GET, "/api/v1/board/3/pon/1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID.REQUEST");

    let (status, body) = call(&app, Method::GET, "/api/v1/board/2/pon/5", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "RESOURCE.NOT_FOUND");
    assert_eq!(body["success"], false);

    let silent = Arc::new(MemoryTransport::new());
    silent.silence_prefix(Oid::new(vec![1]));
    let app = app_with(silent);
    let (status, body) = call(&app, Method::GET, "/api/v1/board/1/pon/1/onu/1", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "DEVICE.UNREACHABLE");
}

#[tokio::test]
async fn clearing_an_uncached_pon_succeeds() {
    let app = app_with(Arc::new(MemoryTransport::new()));
    let (status, body) = call(&app, Method::DELETE, "/api/v1/board/1/pon/4", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn reboot_writes_reset() {
    let agent = seeded_agent();
    let app = app_with(agent.clone());
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/onu-management/reboot",
        Some(json!({ "board": 1, "pon": 1, "onu_id": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["action"], "reboot");
    assert_eq!(agent.writes().len(), 1);
}

#[tokio::test]
async fn batch_validates_before_device_calls() {
    let agent = seeded_agent();
    let app = app_with(agent.clone());

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/batch/reboot",
        Some(json!({ "targets": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID.REQUEST");

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/batch/explode",
        Some(json!({ "targets": [{ "board": 1, "pon": 1, "onu_id": 1 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(agent.request_count(), 0);
}

#[tokio::test]
async fn batch_reports_items_in_input_order() {
    let app = app_with(seeded_agent());
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/batch/block",
        Some(json!({ "targets": [
            { "board": 1, "pon": 1, "onu_id": 2 },
            { "board": 1, "pon": 1, "onu_id": 9 },
            { "board": 1, "pon": 1, "onu_id": 1 }
        ] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["total"], 3);
    assert_eq!(data["success_count"], 2);
    assert_eq!(data["failure_count"], 1);
    let ids: Vec<u64> = data["results"]
        .as_array()
        .expect("results")
        .iter()
        .map(|item| item["onu_id"].as_u64().expect("onu_id"))
        .collect();
    assert_eq!(ids, vec![2, 9, 1]);
    assert_eq!(data["results"][1]["status"], "failed");
}

#[tokio::test]
async fn backup_export_import_restore_flow() {
    let agent = seeded_agent();
    let app = app_with(agent.clone());

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/onu/1/1/1/tcont",
        Some(json!({ "tcont_id": 1, "name": "internet", "profile_name": "fiber-100m" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/backup/onu",
        Some(json!({ "board": 1, "pon": 1, "onu_id": 1, "description": " nightly ", "tags": ["a", "a"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["description"], "nightly");
    assert_eq!(body["data"]["tags"], json!(["a"]));
    let id = body["data"]["id"].as_str().expect("id").to_string();

    let (status, document) =
        call_raw(&app, Method::GET, &format!("/api/v1/backups/{id}/export"), None).await;
    assert_eq!(status, StatusCode::OK);
    let exported: Value = serde_json::from_slice(&document).expect("document");
    assert_eq!(exported["id"], id.as_str());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/backups/import")
        .header("content-type", "application/json")
        .body(Body::from(document))
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = call(&app, Method::GET, "/api/v1/backups?type=onu", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().expect("list").len(), 2);

    agent.clear_writes();
    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/v1/backups/{id}/restore"),
        Some(json!({ "target_onu": 2, "dry_run": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["dry_run"], true);
    assert_eq!(body["data"]["items"][0]["status"], "planned");
    assert!(agent.writes().is_empty());

    let (status, _) = call(&app, Method::GET, "/api/v1/backups/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = call(&app, Method::DELETE, &format!("/api/v1/backups/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = call(&app, Method::GET, &format!("/api/v1/backups/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "RESOURCE.NOT_FOUND");
}

#[tokio::test]
async fn metrics_snapshot_is_exposed() {
    let app = app_with(Arc::new(MemoryTransport::new()));
    let (status, body) = call(&app, Method::GET, "/api/v1/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["snmp_requests"].is_u64());
}

#[tokio::test]
async fn monitoring_routes_report_live_readings() {
    let agent = Arc::new(MemoryTransport::new());
    let address = DeviceAddress::onu(1, 3, 4).expect("address");
    agent.insert(
        encode(EntityKind::Monitor(MonitorAttribute::SerialNumber), &address, &[]),
        SnmpValue::text("ZTEG00000004"),
    );
    agent.insert(
        encode(EntityKind::Monitor(MonitorAttribute::OnlineStatus), &address, &[]),
        SnmpValue::Integer(1),
    );
    let app = app_with(agent);

    let (status, body) = call(&app, Method::GET, "/api/v1/monitoring/onu/1/3/4", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["serial_number"], "ZTEG00000004");
    assert_eq!(body["data"]["online"], true);

    let (status, body) = call(&app, Method::GET, "/api/v1/monitoring/pon/1/3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["onu_count"], 1);

    let (status, body) = call(&app, Method::GET, "/api/v1/monitoring/olt", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["online_onus"], 1);

    let (status, body) = call(&app, Method::GET, "/api/v1/monitoring/onu/1/3/5", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "RESOURCE.NOT_FOUND");
}
