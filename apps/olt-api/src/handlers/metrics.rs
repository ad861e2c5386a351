//! 健康检查与计数器快照。
//!
//! - GET /health
//! - GET /api/v1/metrics

use crate::utils::ok;
use api_contract::MetricsSnapshotDto;
use axum::{Json, response::{IntoResponse, Response}};
use olt_telemetry::metrics;

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    ok(MetricsSnapshotDto {
        snmp_requests: snapshot.snmp_requests,
        snmp_failures: snapshot.snmp_failures,
        cache_hits: snapshot.cache_hits,
        cache_misses: snapshot.cache_misses,
        cache_bypasses: snapshot.cache_bypasses,
        single_flight_joins: snapshot.single_flight_joins,
        batch_item_success: snapshot.batch_item_success,
        batch_item_failure: snapshot.batch_item_failure,
        batch_item_cancelled: snapshot.batch_item_cancelled,
        batch_latency_ms_total: snapshot.batch_latency_ms_total,
        batch_latency_ms_count: snapshot.batch_latency_ms_count,
        backups_created: snapshot.backups_created,
        backup_failures: snapshot.backup_failures,
        restores_run: snapshot.restores_run,
        restore_items_failed: snapshot.restore_items_failed,
    })
}
