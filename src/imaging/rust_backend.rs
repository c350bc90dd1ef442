//! Pure Rust image backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP, BMP, GIF, TIFF) | `image::ImageReader` with content sniffing |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (quality) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (best compression, adaptive filter when optimizing) |
//! | Encode → WebP | `webp` crate (libwebp, lossy with quality) |
//! | Encode → BMP / GIF / TIFF | `DynamicImage::write_to` |
//!
//! Encoding happens in memory first so that encoder failures and filesystem
//! failures surface as distinct [`BackendError`] variants.

use super::backend::{BackendError, Dimensions, ImageBackend, SourceImage};
use super::formats::{Codec, SaveParams};
use super::params::{EncodeParams, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;
use std::path::Path;

/// Extensions whose decoders are compiled in.
pub const SUPPORTED_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "bmp", "gif", "tiff", "tif", "webp"];

/// Returns the set of image file extensions that have decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode `image` into an in-memory buffer.
fn encode_to_vec(image: &DynamicImage, codec: Codec, save: SaveParams) -> Result<Vec<u8>, BackendError> {
    let quality = save.quality.unwrap_or_default();
    match codec {
        Codec::WebP => encode_webp(image, quality, save.optimize),
        Codec::Jpeg => {
            let mut buf = Vec::new();
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.value() as u8);
            image
                .write_with_encoder(encoder)
                .map_err(|e| BackendError::Encode(format!("JPEG: {e}")))?;
            Ok(buf)
        }
        Codec::Png => {
            let mut buf = Vec::new();
            let encoder = if save.optimize {
                PngEncoder::new_with_quality(&mut buf, CompressionType::Best, PngFilter::Adaptive)
            } else {
                PngEncoder::new(&mut buf)
            };
            image
                .write_with_encoder(encoder)
                .map_err(|e| BackendError::Encode(format!("PNG: {e}")))?;
            Ok(buf)
        }
        Codec::Bmp | Codec::Gif | Codec::Tiff => {
            let mut cursor = Cursor::new(Vec::new());
            image
                .write_to(&mut cursor, codec.image_format())
                .map_err(|e| BackendError::Encode(format!("{codec}: {e}")))?;
            Ok(cursor.into_inner())
        }
    }
}

/// Slowest, smallest libwebp compression method.
const WEBP_METHOD_OPTIMIZE: i32 = 6;

/// Lossy WebP through libwebp. Expects RGB8 or RGBA8 pixels.
///
/// libwebp rejects edges above 16383 px; that comes back as an encode error.
fn encode_webp(
    image: &DynamicImage,
    quality: Quality,
    optimize: bool,
) -> Result<Vec<u8>, BackendError> {
    let (width, height) = (image.width(), image.height());
    let encoder = match image {
        DynamicImage::ImageRgb8(buf) => webp::Encoder::from_rgb(buf.as_raw(), width, height),
        DynamicImage::ImageRgba8(buf) => webp::Encoder::from_rgba(buf.as_raw(), width, height),
        other => {
            return Err(BackendError::Encode(format!(
                "WEBP: unsupported pixel layout {:?}",
                other.color()
            )));
        }
    };

    let mut config = webp::WebPConfig::new()
        .map_err(|_| BackendError::Encode("WEBP: cannot initialise encoder config".into()))?;
    config.lossless = 0;
    config.alpha_compression = 1;
    config.quality = quality.value() as f32;
    if optimize {
        config.method = WEBP_METHOD_OPTIMIZE;
    }

    let encoded = encoder
        .encode_advanced(&config)
        .map_err(|e| BackendError::Encode(format!("WEBP: {e:?}")))?;
    Ok(encoded.to_vec())
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path) -> Result<SourceImage, BackendError> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let codec = reader.format().and_then(Codec::from_image_format);
        let pixels = reader
            .decode()
            .map_err(|e| BackendError::Decode(format!("{}: {e}", path.display())))?;
        Ok(SourceImage { pixels, codec })
    }

    fn resize(&self, image: &DynamicImage, size: Dimensions) -> DynamicImage {
        image.resize_exact(size.width, size.height, FilterType::Lanczos3)
    }

    fn encode(&self, params: &EncodeParams<'_>) -> Result<(), BackendError> {
        let bytes = encode_to_vec(params.image, params.codec, params.save)?;
        std::fs::write(params.output, bytes)?;
        Ok(())
    }

    fn can_encode(&self, codec: Codec) -> bool {
        // WebP is written through libwebp, not the `image` crate.
        codec == Codec::WebP || codec.image_format().writing_enabled()
    }
}
