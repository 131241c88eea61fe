//! Raster image resizing for upload variants.

pub mod resize;

use async_trait::async_trait;
use bytes::Bytes;

use crate::upload::{ResizeError, Resizer};
pub use resize::{ImageResize, ResizeDimensions};

/// [`Resizer`] backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageResizer;

#[async_trait]
impl Resizer for ImageResizer {
    async fn resize(
        &self,
        data: Bytes,
        content_type: &str,
        width: Option<u32>,
        height: Option<u32>,
        quality: u8,
    ) -> Result<Bytes, ResizeError> {
        let format = ImageResize::format_for_content_type(content_type)
            .ok_or_else(|| ResizeError::UnsupportedFormat(content_type.to_string()))?;
        let dimensions = ResizeDimensions { width, height };

        // Decode and encode are CPU-bound; run off the async pool.
        let out = tokio::task::spawn_blocking(move || {
            ImageResize::resize_encoded(&data, dimensions, format, quality)
        })
        .await
        .map_err(|e| ResizeError::Task(e.to_string()))??;

        Ok(Bytes::from(out))
    }
}
