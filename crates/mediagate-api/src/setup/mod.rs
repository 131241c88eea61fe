//! Application setup and initialization

pub mod routes;
pub mod server;

use anyhow::{Context, Result};
use mediagate_core::Config;
use mediagate_processing::{FileAcceptancePolicy, ImageResizer, PipelineSettings, UploadPipeline};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::auth::{
    AuthorizationDecisionBuilder, HttpKeySetFetcher, KeySetCache, PolicyGrant, TokenVerifier,
};
use crate::state::AppState;

/// Build state and router from configuration.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    let fetcher = HttpKeySetFetcher::new(&config.auth.jwks_url, config.auth.jwks_fetch_timeout)
        .context("Failed to build key set HTTP client")?;
    let key_set = Arc::new(KeySetCache::new(
        Arc::new(fetcher),
        config.auth.jwks_cache_ttl,
    ));

    // Warm the cache; a failure here is retried on the first request.
    match key_set.refresh().await {
        Ok(count) => tracing::info!(key_count = count, "Key set loaded"),
        Err(e) => tracing::warn!(error = %e, url = %config.auth.jwks_url, "Key set not loaded at startup"),
    }

    let verifier = Arc::new(TokenVerifier::from_config(&config.auth, key_set));

    let storage = mediagate_storage::create_storage(&config)
        .await
        .context("Failed to initialize storage backend")?;
    tracing::info!(
        backend = %storage.backend_type(),
        bucket = %storage.bucket(),
        "Storage initialized"
    );

    let pipeline = Arc::new(UploadPipeline::new(
        storage,
        Arc::new(ImageResizer),
        FileAcceptancePolicy::with_max_bytes(config.upload.max_upload_bytes),
        PipelineSettings::from(&config),
    ));

    let state = Arc::new(AppState {
        storage_backend: config.storage.backend,
        config,
        verifier,
        decisions: AuthorizationDecisionBuilder::new(PolicyGrant::AllowInvokeAll),
        pipeline,
        shutdown: CancellationToken::new(),
    });

    let router = routes::setup_routes(state.clone());

    Ok((state, router))
}
