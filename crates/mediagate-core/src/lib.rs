//! Mediagate Core Library
//!
//! Configuration, error types and constants shared by the storage, processing
//! and API crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod storage_types;

// Re-export commonly used types
pub use config::{AuthConfig, BaseConfig, Config, StorageConfig, UploadConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
