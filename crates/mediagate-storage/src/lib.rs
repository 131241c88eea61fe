//! Mediagate Storage Library
//!
//! Storage abstraction and backends for upload variants. It includes the
//! Storage trait and implementations for S3 and the local filesystem.
//!
//! # Storage key format
//!
//! `{siteId}/{uploadType}/{linkId}/{uploadId}_{variant}_{filename}`, where the
//! variant name and filename are sanitized into key-safe tokens. Key derivation
//! is centralized in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{cdn_url, sanitize_segment, StorageKey};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use mediagate_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult, StoredObject};
