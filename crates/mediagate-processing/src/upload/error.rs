//! Errors raised while turning a request into stored variants.

use mediagate_core::AppError;
use mediagate_storage::StorageError;
use thiserror::Error;

use crate::validator::Rejection;

/// Resize collaborator failures
#[derive(Debug, Error)]
pub enum ResizeError {
    #[error("Unsupported image type for resizing: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Requested size {width}x{height} exceeds the resize limit")]
    TooLarge { width: u32, height: u32 },

    #[error("Resize task failed: {0}")]
    Task(String),
}

/// Failure of one variant's resize/store step, or of the fan-out itself
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Resizing variant '{variant}' failed: {source}")]
    ResizeFailed {
        variant: String,
        #[source]
        source: ResizeError,
    },

    #[error("Storing variant '{variant}' failed: {source}")]
    StorageFailed {
        variant: String,
        #[source]
        source: StorageError,
    },

    #[error("{operation} of variant '{variant}' timed out after {seconds}s")]
    Timeout {
        variant: String,
        operation: &'static str,
        seconds: u64,
    },

    #[error("Upload was cancelled")]
    Cancelled,

    #[error("Variant task failed: {0}")]
    TaskFailed(String),
}

/// Request-level upload failures. Display strings are the client-facing messages.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Form parser returned no files")]
    NoFiles,

    #[error("No file or file content was supplied")]
    NoFile,

    #[error("File size or type not allowed")]
    FileRejected(#[source] Rejection),

    #[error("No image sizes were provided")]
    NoVariants,

    #[error("Invalid uploadSizes: {0}")]
    VariantParse(String),

    #[error("{0}")]
    Form(String),

    #[error("Request body exceeds the maximum upload size of {max_bytes} bytes")]
    BodyTooLarge { max_bytes: usize },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Pipeline(PipelineError::StorageFailed { source, .. }) => {
                AppError::Storage(source.to_string())
            }
            UploadError::Pipeline(err @ PipelineError::ResizeFailed { .. }) => {
                AppError::ImageProcessing(err.to_string())
            }
            UploadError::Pipeline(err @ PipelineError::Timeout { .. }) => {
                AppError::Timeout(err.to_string())
            }
            UploadError::Pipeline(err @ PipelineError::Cancelled) => {
                AppError::ServiceUnavailable(err.to_string())
            }
            UploadError::Pipeline(err @ PipelineError::TaskFailed(_)) => {
                AppError::Internal(err.to_string())
            }
            err @ UploadError::BodyTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            other => AppError::InvalidInput(other.to_string()),
        }
    }
}
