//! nc-api: HTTP surface of the exporter.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/metrics` | Scrape serverinfo once, Prometheus exposition |
//! | GET | `/healthz` | Exporter liveness, never touches upstream |

pub mod handlers;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use nc_collector::Collector;

/// Shared state for handlers.
#[derive(Clone)]
pub struct ApiState {
    pub collector: Arc<Collector>,
}

/// Build the exporter router.
pub fn build_router(collector: Arc<Collector>) -> Router {
    let state = ApiState { collector };

    Router::new()
        .route("/metrics", get(handlers::prometheus_metrics))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
}
