use axum::{extract::State, http::StatusCode, Json};
use common::types::Health;
use tracing::warn;

use super::AppState;
use crate::observability;

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Health>) {
    match state.wall.ping().await {
        Ok(()) => (StatusCode::OK, Json(Health::ok())),
        Err(e) => {
            warn!(operation = "health", error = %e, "store ping failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(Health::unavailable()))
        }
    }
}

pub async fn metrics() -> (StatusCode, String) {
    observability::encode_metrics()
}
