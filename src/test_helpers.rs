//! Shared test utilities for the pixbatch test suite.
//!
//! Writes small synthetic images with real encoders so decode and encode
//! paths can be exercised without checked-in fixtures.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("photo.jpg");
//! create_test_jpeg(&path, 200, 150);
//! ```

use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;

// =========================================================================
// Synthetic images
// =========================================================================

/// Write an opaque gradient JPEG.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, ImageFormat::Jpeg)
        .unwrap();
}

/// Write a PNG with a real alpha channel (left half transparent).
pub fn create_test_png_rgba(path: &Path, width: u32, height: u32) {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        let alpha = if x < width / 2 { 0 } else { 255 };
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, alpha])
    });
    img.save_with_format(path, ImageFormat::Png).unwrap();
}

/// Write an opaque image in an arbitrary format the `image` crate can write.
pub fn create_test_image(path: &Path, width: u32, height: u32, format: ImageFormat) {
    gradient(width, height).save_with_format(path, format).unwrap();
}

/// Write bytes that no decoder will accept.
pub fn create_corrupt_file(path: &Path) {
    std::fs::write(path, b"definitely not an image").unwrap();
}

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}
