//! Format resolution: which codec to write, with which save parameters, and
//! which color layout the pixels must be in before encoding.
//!
//! | Codec | Extension | Save parameters | Alpha |
//! |---|---|---|---|
//! | JPEG | `.jpg` | quality + optimize | no |
//! | PNG | `.png` | optimize (best compression) | yes |
//! | WebP | `.webp` | quality + optimize | yes |
//! | BMP | `.bmp` | none | no |
//! | GIF | `.gif` | none | yes |
//! | TIFF | `.tiff` | none | yes |
//!
//! GIF and TIFF are only ever chosen by keeping the source format.

use super::params::Quality;
use image::{ColorType, DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Concrete codec used for writing an output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    Jpeg,
    Png,
    WebP,
    Bmp,
    Gif,
    Tiff,
}

impl Codec {
    /// Codec used when the source format cannot be determined or kept.
    pub const FALLBACK: Codec = Codec::Jpeg;

    /// Map a sniffed source format onto a writable codec.
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::WebP => Some(Self::WebP),
            ImageFormat::Bmp => Some(Self::Bmp),
            ImageFormat::Gif => Some(Self::Gif),
            ImageFormat::Tiff => Some(Self::Tiff),
            _ => None,
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::WebP => ImageFormat::WebP,
            Self::Bmp => ImageFormat::Bmp,
            Self::Gif => ImageFormat::Gif,
            Self::Tiff => ImageFormat::Tiff,
        }
    }

    /// Output file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Bmp => "bmp",
            Self::Gif => "gif",
            Self::Tiff => "tiff",
        }
    }

    /// Whether the codec takes a lossy quality setting.
    pub fn is_lossy(self) -> bool {
        matches!(self, Self::Jpeg | Self::WebP)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::WebP => "WEBP",
            Self::Bmp => "BMP",
            Self::Gif => "GIF",
            Self::Tiff => "TIFF",
        };
        f.write_str(name)
    }
}

/// Output format requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    /// Keep whatever format the source file is in.
    #[default]
    Original,
    Jpeg,
    Png,
    WebP,
    Bmp,
}

impl TargetFormat {
    /// Parse a user-supplied format name. Case-insensitive; accepts `jpg`,
    /// `same`, and `keep` as aliases.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "original" | "same" | "keep" => Some(Self::Original),
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    /// The fixed codec this target names, or `None` for [`TargetFormat::Original`].
    pub fn codec(self) -> Option<Codec> {
        match self {
            Self::Original => None,
            Self::Jpeg => Some(Codec::Jpeg),
            Self::Png => Some(Codec::Png),
            Self::WebP => Some(Codec::WebP),
            Self::Bmp => Some(Codec::Bmp),
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.codec() {
            Some(codec) => write!(f, "{codec}"),
            None => f.write_str("original"),
        }
    }
}

/// Codec-specific save parameters.
///
/// `quality` is only ever set for lossy codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaveParams {
    pub quality: Option<Quality>,
    /// Spend extra effort for a smaller file.
    pub optimize: bool,
}

/// The codec and parameters an item will be written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedFormat {
    pub codec: Codec,
    pub save: SaveParams,
}

/// Resolve the output codec and its save parameters.
///
/// `source` is the sniffed format of the input file, if any. When the target
/// is [`TargetFormat::Original`] and the source is missing or not writable,
/// [`Codec::FALLBACK`] is used.
pub fn resolve_format(
    source: Option<Codec>,
    target: TargetFormat,
    quality: Quality,
) -> ResolvedFormat {
    let codec = target
        .codec()
        .or(source)
        .unwrap_or(Codec::FALLBACK);
    ResolvedFormat {
        codec,
        save: save_params(codec, quality),
    }
}

fn save_params(codec: Codec, quality: Quality) -> SaveParams {
    SaveParams {
        quality: codec.is_lossy().then_some(quality),
        optimize: codec.is_lossy() || codec == Codec::Png,
    }
}

/// Convert pixels into a layout `codec` can encode.
///
/// Dropping alpha for JPEG/BMP is silent: transparency is lost, which is
/// expected. Palette images never reach this point as such because the
/// decoders expand them to RGB/RGBA.
pub fn normalize_color(image: DynamicImage, codec: Codec) -> DynamicImage {
    let color = image.color();
    match codec {
        Codec::Jpeg | Codec::Bmp => match color {
            ColorType::Rgb8 | ColorType::L8 => image,
            _ => DynamicImage::ImageRgb8(image.to_rgb8()),
        },
        Codec::WebP => match color {
            ColorType::Rgb8 | ColorType::Rgba8 => image,
            c if c.has_alpha() => DynamicImage::ImageRgba8(image.to_rgba8()),
            _ => DynamicImage::ImageRgb8(image.to_rgb8()),
        },
        Codec::Gif => match color {
            ColorType::Rgba8 => image,
            _ => DynamicImage::ImageRgba8(image.to_rgba8()),
        },
        Codec::Png | Codec::Tiff => match color {
            ColorType::Rgb32F => DynamicImage::ImageRgb8(image.to_rgb8()),
            ColorType::Rgba32F => DynamicImage::ImageRgba8(image.to_rgba8()),
            ColorType::La8 if codec == Codec::Tiff => DynamicImage::ImageRgba8(image.to_rgba8()),
            ColorType::La16 if codec == Codec::Tiff => {
                DynamicImage::ImageRgba16(image.to_rgba16())
            }
            _ => image,
        },
    }
}
