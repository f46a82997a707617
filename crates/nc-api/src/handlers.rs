//! HTTP handlers.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use tracing::debug;

use crate::ApiState;

/// GET /metrics
///
/// Runs one scrape and renders it. Answers 200 even when the upstream fetch
/// failed; the failure shows up as `nextcloud_result_ok 0`.
pub async fn prometheus_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    let observations = state.collector.collect().await;
    let body = nc_metrics::render_prometheus(&observations);
    debug!(bytes = body.len(), "metrics rendered");

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, nc_metrics::CONTENT_TYPE)],
        body,
    )
}

/// GET /healthz
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
