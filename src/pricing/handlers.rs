// HTTP handlers for pricing diagnostics

use axum::{extract::State, Json};

use crate::pricing::MetricsSummary;
use crate::AppState;

/// Handler for GET /api/pricing/metrics
#[utoipa::path(
    get,
    path = "/api/pricing/metrics",
    responses(
        (status = 200, description = "Pricing engine performance counters", body = MetricsSummary)
    ),
    tag = "pricing"
)]
pub async fn get_metrics(State(state): State<AppState>) -> Json<MetricsSummary> {
    let metrics = state.pricing.metrics();
    metrics.log_summary();
    Json(metrics.summary())
}
