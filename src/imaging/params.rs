//! Parameter types for image operations.
//!
//! These structs describe *what* to write, not *how*. They are the interface
//! between the item processor (which decides codec, size, and path) and the
//! [`backend`](super::backend) (which does the pixel and byte work). Keeping
//! them separate lets tests run the whole pipeline against a mock backend.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality (1–100, default 85). Out-of-range values are rejected, not clamped.
//! - [`EncodeParams`] — Everything needed to encode one image: pixels, codec, save parameters, output path.

use super::formats::{Codec, SaveParams};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quality(u32);

impl Quality {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 100;

    /// Returns `None` when `value` is outside `1..=100`.
    pub fn new(value: u32) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

impl TryFrom<u32> for Quality {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("quality must be 1-100, got {value}"))
    }
}

impl From<Quality> for u32 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

/// Parameters for one encode-and-write operation.
#[derive(Debug, Clone, Copy)]
pub struct EncodeParams<'a> {
    pub image: &'a DynamicImage,
    pub codec: Codec,
    pub save: SaveParams,
    pub output: &'a Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_accepts_valid_range() {
        assert_eq!(Quality::new(1).map(Quality::value), Some(1));
        assert_eq!(Quality::new(50).map(Quality::value), Some(50));
        assert_eq!(Quality::new(100).map(Quality::value), Some(100));
    }

    #[test]
    fn quality_rejects_out_of_range() {
        assert_eq!(Quality::new(0), None);
        assert_eq!(Quality::new(101), None);
        assert_eq!(Quality::new(110), None);
    }

    #[test]
    fn quality_default_is_85() {
        assert_eq!(Quality::default().value(), 85);
    }

    #[test]
    fn quality_serde_rejects_out_of_range() {
        assert!(serde_json::from_str::<Quality>("110").is_err());
        assert_eq!(serde_json::from_str::<Quality>("70").unwrap().value(), 70);
    }
}
