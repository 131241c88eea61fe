//! Upload pipeline: accept → plan → resize → store.

pub mod error;
pub mod plan;
pub mod traits;
pub mod types;

mod pipeline;

pub use error::{PipelineError, ResizeError, UploadError};
pub use pipeline::{PipelineSettings, UploadPipeline};
pub use plan::{PlannedVariant, VariantPlan};
pub use traits::Resizer;
pub use types::{
    FileUpload, FormFile, UploadForm, UploadOutcome, UploadRequest, UploadResult, VariantSpec,
    VariantSpecsInput,
};
