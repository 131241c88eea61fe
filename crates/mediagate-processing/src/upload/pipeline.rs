//! Upload pipeline: accept → plan → (resize →) store, one task per variant.
//!
//! Variants are fanned out on a [`JoinSet`] and joined back in request order.
//! The first failing variant aborts the rest and becomes the request's error;
//! already-persisted variants are not rolled back and are never reported.

use bytes::Bytes;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use mediagate_core::constants::DEFAULT_RESIZE_QUALITY;
use mediagate_core::Config;
use mediagate_storage::{cdn_url, Storage};

use super::error::{PipelineError, UploadError};
use super::plan::{PlannedVariant, VariantPlan};
use super::traits::Resizer;
use super::types::{FileUpload, UploadOutcome, UploadRequest, UploadResult};
use crate::validator::FileAcceptancePolicy;

/// Tunables for [`UploadPipeline`]
#[derive(Clone, Debug)]
pub struct PipelineSettings {
    pub cdn_base_url: String,
    pub default_quality: u8,
    pub resize_timeout: Duration,
    pub storage_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            cdn_base_url: mediagate_core::constants::DEFAULT_CDN_BASE_URL.to_string(),
            default_quality: DEFAULT_RESIZE_QUALITY,
            resize_timeout: Duration::from_secs(30),
            storage_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            cdn_base_url: config.upload.cdn_base_url.clone(),
            default_quality: config.upload.default_quality,
            resize_timeout: config.upload.resize_timeout,
            storage_timeout: config.upload.storage_timeout,
        }
    }
}

pub struct UploadPipeline {
    storage: Arc<dyn Storage>,
    resizer: Arc<dyn Resizer>,
    policy: FileAcceptancePolicy,
    settings: PipelineSettings,
}

impl UploadPipeline {
    pub fn new(
        storage: Arc<dyn Storage>,
        resizer: Arc<dyn Resizer>,
        policy: FileAcceptancePolicy,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            storage,
            resizer,
            policy,
            settings,
        }
    }

    pub fn policy(&self) -> &FileAcceptancePolicy {
        &self.policy
    }

    /// Run one upload under a fresh upload id.
    #[tracing::instrument(
        skip_all,
        fields(
            site_id = %request.site_id,
            upload_type = %request.upload_type,
            link_id = %request.link_id,
            content_type = %request.file.content_type,
            size_bytes = request.file.len(),
        )
    )]
    pub async fn run(
        &self,
        request: UploadRequest,
        cancel: &CancellationToken,
    ) -> Result<UploadOutcome, UploadError> {
        if let Err(rejection) = self
            .policy
            .check(request.file.len(), &request.file.content_type)
        {
            tracing::info!(reason = %rejection, "Upload rejected by acceptance policy");
            return Err(UploadError::FileRejected(rejection));
        }

        let upload_id = Uuid::new_v4().to_string();
        let plan = VariantPlan::expand(&request, &upload_id)?;

        tracing::info!(
            upload_id = %upload_id,
            variants = plan.len(),
            "Upload accepted"
        );

        let uploaded_files = self.store_variants(&plan, &request.file, cancel).await?;

        Ok(UploadOutcome {
            id: upload_id,
            uploaded_files,
        })
    }

    /// Fan out one task per planned variant and join results in plan order.
    pub async fn store_variants(
        &self,
        plan: &VariantPlan,
        file: &FileUpload,
        cancel: &CancellationToken,
    ) -> Result<Vec<UploadResult>, PipelineError> {
        let mut tasks = JoinSet::new();

        for (index, variant) in plan.variants().iter().enumerate() {
            let job = VariantJob {
                variant: variant.clone(),
                file: file.clone(),
                storage: Arc::clone(&self.storage),
                resizer: Arc::clone(&self.resizer),
                settings: self.settings.clone(),
            };
            tasks.spawn(async move { (index, job.execute().await) });
        }

        let mut results: Vec<Option<UploadResult>> = (0..plan.len()).map(|_| None).collect();

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tasks.abort_all();
                    tracing::warn!(upload_id = %plan.upload_id(), "Upload cancelled");
                    return Err(PipelineError::Cancelled);
                }

                joined = tasks.join_next() => match joined {
                    None => break,
                    Some(Ok((index, Ok(result)))) => results[index] = Some(result),
                    Some(Ok((_, Err(e)))) => {
                        tasks.abort_all();
                        tracing::error!(upload_id = %plan.upload_id(), error = %e, "Variant failed");
                        return Err(e);
                    }
                    Some(Err(join_error)) => {
                        tasks.abort_all();
                        return Err(PipelineError::TaskFailed(join_error.to_string()));
                    }
                },
            }
        }

        Ok(results.into_iter().flatten().collect())
    }
}

struct VariantJob {
    variant: PlannedVariant,
    file: FileUpload,
    storage: Arc<dyn Storage>,
    resizer: Arc<dyn Resizer>,
    settings: PipelineSettings,
}

impl VariantJob {
    async fn execute(self) -> Result<UploadResult, PipelineError> {
        let name = self.variant.spec.name.clone();
        let content_type = self.file.content_type.as_str();
        let original_size = self.file.len();

        let body: Bytes = match self.variant.spec.resize_dimensions() {
            Some((width, height)) => {
                let quality = self.variant.spec.quality_or(self.settings.default_quality);
                let start = Instant::now();
                let resized = tokio::time::timeout(
                    self.settings.resize_timeout,
                    self.resizer.resize(
                        self.file.data.clone(),
                        content_type,
                        width,
                        height,
                        quality,
                    ),
                )
                .await
                .map_err(|_| PipelineError::Timeout {
                    variant: name.clone(),
                    operation: "Resize",
                    seconds: self.settings.resize_timeout.as_secs(),
                })?
                .map_err(|source| PipelineError::ResizeFailed {
                    variant: name.clone(),
                    source,
                })?;

                tracing::debug!(
                    variant = %name,
                    width = ?width,
                    height = ?height,
                    quality,
                    original_bytes = original_size,
                    resized_bytes = resized.len(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Variant resized"
                );
                resized
            }
            None => self.file.data.clone(),
        };

        let key = &self.variant.key;
        let stored = tokio::time::timeout(
            self.settings.storage_timeout,
            self.storage.put(key.as_str(), body, content_type),
        )
        .await
        .map_err(|_| PipelineError::Timeout {
            variant: name.clone(),
            operation: "Storage",
            seconds: self.settings.storage_timeout.as_secs(),
        })?
        .map_err(|source| PipelineError::StorageFailed {
            variant: name.clone(),
            source,
        })?;

        Ok(UploadResult {
            mime_type: self.file.content_type.clone(),
            cdn_url: cdn_url(&self.settings.cdn_base_url, &stored.key),
            original_key: stored.key,
            bucket: stored.bucket,
            file_name: self.file.filename.clone(),
            signed_url: None,
            original_size,
        })
    }
}
