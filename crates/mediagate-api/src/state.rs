//! Shared application state

use mediagate_core::{Config, StorageBackend};
use mediagate_processing::UploadPipeline;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::auth::{AuthorizationDecisionBuilder, TokenVerifier};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub verifier: Arc<TokenVerifier>,
    pub decisions: AuthorizationDecisionBuilder,
    pub pipeline: Arc<UploadPipeline>,
    pub storage_backend: StorageBackend,
    /// Cancelled on shutdown; in-flight uploads observe it.
    pub shutdown: CancellationToken,
}
