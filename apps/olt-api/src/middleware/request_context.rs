//! 请求上下文：request_id / trace_id 与请求作用域。

use crate::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use olt_control::RequestScope;
use olt_telemetry::new_request_ids;
use tracing::Instrument;

/// 生成追踪 ID 并注入一个派生自根令牌的 `RequestScope`。
///
/// 请求 future 被丢弃（客户端断开）或完成时，作用域令牌随之取消。
pub async fn request_context(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let ids = new_request_ids();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let scope = RequestScope::new(
        ids.request_id.clone(),
        state.shutdown.child_token(),
        state.request_timeout,
    );
    let _cancel_on_drop = scope.cancel_token().clone().drop_guard();
    req.extensions_mut().insert(ids.clone());
    req.extensions_mut().insert(scope);

    let span = tracing::info_span!(
        "request",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        method = %method,
        path = %path
    );

    let mut response = next.run(req).instrument(span).await;
    response.headers_mut().insert(
        "x-request-id",
        HeaderValue::from_str(&ids.request_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response.headers_mut().insert(
        "x-trace-id",
        HeaderValue::from_str(&ids.trace_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response
}
