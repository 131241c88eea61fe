//! Health check handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use mediagate_core::AppError;
use std::sync::Arc;

use crate::error::HttpAppError;
use crate::state::AppState;

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// Readiness probe - a key set is loaded, fetching one if needed.
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let key_set = state.verifier.key_set();

    if key_set.is_empty().await {
        key_set.refresh().await.map_err(|e| {
            HttpAppError::new(AppError::ServiceUnavailable(e.to_string()))
                .with_details(!state.config.is_production())
        })?;
    }

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ready",
            "keys": key_set.len().await,
            "storage": state.storage_backend.to_string(),
        })),
    ))
}
