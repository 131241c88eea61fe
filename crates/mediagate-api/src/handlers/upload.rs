//! Media upload endpoint

use axum::{
    extract::{Request, State},
    Extension,
};
use std::sync::Arc;

use crate::auth::Principal;
use crate::error::UploadResponse;
use crate::services::upload::read_upload_form;
use crate::state::AppState;

/// Accept one file, store every requested variant and report where they live.
#[tracing::instrument(skip_all, fields(authenticated = principal.is_some()))]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    principal: Option<Extension<Principal>>,
    request: Request,
) -> UploadResponse {
    let max_bytes = state.pipeline.policy().max_bytes();

    let result = async {
        let form = read_upload_form(request, max_bytes).await?;
        let upload = form.into_request()?;
        state.pipeline.run(upload, &state.shutdown).await
    }
    .await;

    if let Ok(outcome) = &result {
        tracing::info!(
            upload_id = %outcome.id,
            variants = outcome.uploaded_files.len(),
            "Upload stored"
        );
    }

    UploadResponse::from(result)
}
