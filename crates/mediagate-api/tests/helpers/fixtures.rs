//! Test fixtures: encoded image blobs.

use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

/// PNG of the given dimensions with a simple gradient.
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
    });
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("Failed to encode test PNG");
    buffer
}

pub fn png_dimensions(data: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory_with_format(data, ImageFormat::Png)
        .expect("Stored bytes are not a PNG");
    (img.width(), img.height())
}

/// Minimal PDF header; only the declared type matters to the pipeline.
pub fn create_test_pdf() -> Vec<u8> {
    b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n<< /Root 1 0 R >>\n%%EOF\n"
        .to_vec()
}
