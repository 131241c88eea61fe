//! Route configuration and setup

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::middleware::auth_middleware;
use crate::handlers;
use crate::services::upload::body_limit;
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Router {
    let upload_limit = body_limit(state.config.upload.max_upload_bytes);

    let mut upload_routes = Router::new()
        .route("/upload", post(handlers::upload::upload))
        .layer(DefaultBodyLimit::max(upload_limit));

    if state.config.upload.require_auth {
        upload_routes = upload_routes.layer(from_fn_with_state(
            state.verifier.clone(),
            auth_middleware,
        ));
    } else {
        tracing::warn!("Upload route is not guarded by token verification");
    }

    Router::new()
        .route("/authorize", post(handlers::authorizer::authorize))
        .route("/health", get(handlers::health::liveness_check))
        .route("/health/ready", get(handlers::health::readiness_check))
        .merge(upload_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
