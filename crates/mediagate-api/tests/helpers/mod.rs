//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p mediagate-api`.

#![allow(dead_code)]

pub mod auth;
pub mod fixtures;
pub mod storage;

use axum_test::TestServer;
use mediagate_api::auth::{
    AuthorizationDecisionBuilder, HttpKeySetFetcher, KeySetCache, TokenVerifier,
};
use mediagate_api::setup::routes;
use mediagate_api::state::AppState;
use mediagate_core::Config;
use mediagate_processing::{FileAcceptancePolicy, ImageResizer, PipelineSettings, UploadPipeline};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use storage::RecordingStorage;

/// Nothing listens here; used when a test never reaches the key set.
pub const UNREACHABLE_JWKS_URL: &str = "http://127.0.0.1:9/.well-known/jwks.json";

/// Test application: server plus the doubles behind it.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub storage: Arc<RecordingStorage>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

/// Configuration as it would be read from the environment, plus overrides.
pub fn test_config(jwks_url: &str, temp_dir: &TempDir, overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("ENVIRONMENT".to_string(), "test".to_string()),
        ("JWKS_URL".to_string(), jwks_url.to_string()),
        ("JWKS_FETCH_TIMEOUT_SECS".to_string(), "2".to_string()),
        ("STORAGE_BACKEND".to_string(), "local".to_string()),
        (
            "LOCAL_STORAGE_PATH".to_string(),
            temp_dir.path().to_string_lossy().into_owned(),
        ),
        ("CDN_BASE_URL".to_string(), "https://cdn.test".to_string()),
        ("UPLOAD_REQUIRE_AUTH".to_string(), "false".to_string()),
    ]);
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }

    Config::from_source(|key| vars.get(key).cloned()).expect("Invalid test configuration")
}

pub fn setup_test_app(jwks_url: &str, overrides: &[(&str, &str)]) -> TestApp {
    setup_test_app_with_storage(jwks_url, overrides, RecordingStorage::new())
}

pub fn setup_test_app_with_storage(
    jwks_url: &str,
    overrides: &[(&str, &str)],
    storage: RecordingStorage,
) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = test_config(jwks_url, &temp_dir, overrides);

    let fetcher = HttpKeySetFetcher::new(&config.auth.jwks_url, config.auth.jwks_fetch_timeout)
        .expect("Failed to build key set client");
    let key_set = Arc::new(KeySetCache::new(
        Arc::new(fetcher),
        config.auth.jwks_cache_ttl,
    ));
    let verifier = Arc::new(TokenVerifier::from_config(&config.auth, key_set));

    let storage = Arc::new(storage);
    let pipeline = Arc::new(UploadPipeline::new(
        storage.clone(),
        Arc::new(ImageResizer),
        FileAcceptancePolicy::with_max_bytes(config.upload.max_upload_bytes),
        PipelineSettings::from(&config),
    ));

    let state = Arc::new(AppState {
        storage_backend: config.storage.backend,
        config,
        verifier,
        decisions: AuthorizationDecisionBuilder::default(),
        pipeline,
        shutdown: CancellationToken::new(),
    });

    let server = TestServer::new(routes::setup_routes(state.clone()))
        .expect("Failed to create test server");

    TestApp {
        server,
        state,
        storage,
        _temp_dir: temp_dir,
    }
}
