//! Traits for the upload pipeline.

use async_trait::async_trait;
use bytes::Bytes;

use super::error::ResizeError;

/// Image resize collaborator.
///
/// Output is encoded in the same media type as the input. When only one of
/// `width`/`height` is given the other follows the source aspect ratio.
#[async_trait]
pub trait Resizer: Send + Sync {
    async fn resize(
        &self,
        data: Bytes,
        content_type: &str,
        width: Option<u32>,
        height: Option<u32>,
        quality: u8,
    ) -> Result<Bytes, ResizeError>;
}
