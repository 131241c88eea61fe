use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::io::Cursor;

use mediagate_core::constants::{MAX_RESIZE_DIMENSION, MAX_RESIZE_PIXELS};

use crate::upload::ResizeError;

/// Requested output dimensions; a missing axis follows the aspect ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeDimensions {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Image resize operations
pub struct ImageResize;

impl ImageResize {
    /// Calculate target dimensions for the requested width/height
    pub fn calculate_dimensions(
        orig_width: u32,
        orig_height: u32,
        dimensions: ResizeDimensions,
    ) -> (u32, u32) {
        match (dimensions.width, dimensions.height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => {
                let aspect_ratio = orig_height as f32 / orig_width as f32;
                let h = (w as f32 * aspect_ratio).round() as u32;
                (w, h.max(1))
            }
            (None, Some(h)) => {
                let aspect_ratio = orig_width as f32 / orig_height as f32;
                let w = (h as f32 * aspect_ratio).round() as u32;
                (w.max(1), h)
            }
            (None, None) => (orig_width, orig_height),
        }
    }

    /// Select appropriate filter type based on resize ratio
    pub fn select_filter(
        orig_width: u32,
        orig_height: u32,
        new_width: u32,
        new_height: u32,
    ) -> image::imageops::FilterType {
        let width_ratio = orig_width as f32 / new_width as f32;
        let height_ratio = orig_height as f32 / new_height as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            image::imageops::FilterType::Triangle
        } else if max_ratio > 1.5 {
            image::imageops::FilterType::CatmullRom
        } else {
            image::imageops::FilterType::Lanczos3
        }
    }

    /// Refuse targets whose buffer would be unreasonably large.
    pub fn check_target(width: u32, height: u32) -> Result<(), ResizeError> {
        let pixels = u64::from(width) * u64::from(height);
        if width > MAX_RESIZE_DIMENSION || height > MAX_RESIZE_DIMENSION || pixels > MAX_RESIZE_PIXELS {
            return Err(ResizeError::TooLarge { width, height });
        }
        Ok(())
    }

    /// Encoder format for a declared content type, if the type is a raster image we can re-encode
    pub fn format_for_content_type(content_type: &str) -> Option<ImageFormat> {
        match content_type {
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/png" => Some(ImageFormat::Png),
            "image/webp" => Some(ImageFormat::WebP),
            "image/vnd.microsoft.icon" | "image/x-icon" => Some(ImageFormat::Ico),
            "image/gif" => Some(ImageFormat::Gif),
            _ => None,
        }
    }

    /// Decode, resize and re-encode in `format`. Quality only affects JPEG output.
    pub fn resize_encoded(
        data: &[u8],
        dimensions: ResizeDimensions,
        format: ImageFormat,
        quality: u8,
    ) -> Result<Vec<u8>, ResizeError> {
        // Explicit requests are refused before decoding.
        Self::check_target(
            dimensions.width.unwrap_or(1),
            dimensions.height.unwrap_or(1),
        )?;

        let img = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ResizeError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| ResizeError::Decode(e.to_string()))?;

        let (orig_width, orig_height) = img.dimensions();
        let (width, height) = Self::calculate_dimensions(orig_width, orig_height, dimensions);
        Self::check_target(width, height)?;
        let filter = Self::select_filter(orig_width, orig_height, width, height);
        let resized = img.resize_exact(width, height, filter);

        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);
        let written = match format {
            ImageFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
                rgb.write_with_encoder(JpegEncoder::new_with_quality(
                    &mut cursor,
                    quality.clamp(1, 100),
                ))
            }
            other => resized.write_to(&mut cursor, other),
        };
        written.map_err(|e| ResizeError::Encode(e.to_string()))?;

        Ok(buffer)
    }
}
