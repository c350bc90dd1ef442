//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the operations the item processor needs:
//! decode, resize, encode, and a capability query for codecs.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests swap in a recording mock so pipeline logic can be exercised
//! without real pixel work.

use super::formats::Codec;
use super::params::EncodeParams;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn of(image: &DynamicImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }
}

/// A decoded source image and the codec it was stored in, when known.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub pixels: DynamicImage,
    pub codec: Option<Codec>,
}

/// Trait for image processing backends.
///
/// Implementations must be `Send + Sync` so a batch can run on a background
/// thread while the caller keeps its own handle.
pub trait ImageBackend: Send + Sync {
    /// Read and decode an image file, sniffing its format from content.
    fn decode(&self, path: &Path) -> Result<SourceImage, BackendError>;

    /// Resample to exactly `size` with a high-quality filter.
    fn resize(&self, image: &DynamicImage, size: Dimensions) -> DynamicImage;

    /// Encode and write to `params.output`.
    ///
    /// Encoder failures are [`BackendError::Encode`]; filesystem failures
    /// while writing are [`BackendError::Io`].
    fn encode(&self, params: &EncodeParams<'_>) -> Result<(), BackendError>;

    /// Whether this backend can write `codec`.
    fn can_encode(&self, codec: Codec) -> bool;
}
