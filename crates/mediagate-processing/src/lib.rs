//! Mediagate Processing Library
//!
//! Upload acceptance, variant planning, image resizing and the concurrent
//! resize-and-store pipeline.

#[cfg(feature = "image")]
pub mod image;
pub mod upload;
pub mod validator;

// Re-export commonly used types
#[cfg(feature = "image")]
pub use crate::image::{ImageResize, ImageResizer, ResizeDimensions};
pub use upload::{
    FileUpload, FormFile, PipelineError, PipelineSettings, ResizeError, Resizer, UploadError,
    UploadForm, UploadOutcome, UploadPipeline, UploadRequest, UploadResult, VariantPlan,
    VariantSpec, VariantSpecsInput,
};
pub use validator::{FileAcceptancePolicy, Rejection};
