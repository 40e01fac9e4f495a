//! Metrics endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::{db, middleware::AppState};

#[derive(Serialize)]
pub struct MetricsResponse {
    pub db_pool_size: u32,
    pub db_pool_idle: u32,
    pub process_uptime_secs: u64,
}

/// Basic process and pool metrics. Counters and histograms are recorded
/// through the metrics facade by the request middleware.
pub async fn metrics_export(State(state): State<Arc<AppState>>) -> Json<MetricsResponse> {
    db::record_pool_metrics(&state.db);

    Json(MetricsResponse {
        db_pool_size: state.db.size(),
        db_pool_idle: state.db.num_idle() as u32,
        process_uptime_secs: crate::handlers::health::get_uptime(),
    })
}
