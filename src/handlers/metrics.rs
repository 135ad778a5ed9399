use axum::{extract::State, http::StatusCode, response::IntoResponse};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;

use crate::AppState;

pub struct MetricsState {
    pub handle: PrometheusHandle,
}

impl MetricsState {
    /// A handle backed by a recorder that is not installed globally, so
    /// several app instances can coexist in one process (tests).
    pub fn detached() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        MetricsState {
            handle: recorder.handle(),
        }
    }
}

/// Set up and globally install the Prometheus metrics recorder
pub fn setup_metrics_recorder() -> Result<MetricsState, String> {
    let builder = PrometheusBuilder::new();

    // Configure histogram buckets for latency (in seconds)
    let builder = builder
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )
        .map_err(|e| format!("Failed to set histogram buckets: {}", e))?;

    let handle = builder
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;

    Ok(MetricsState { handle })
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let metrics = state.metrics.handle.render();
    (StatusCode::OK, metrics)
}
