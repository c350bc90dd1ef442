//! Image processing — pure Rust decoders and encoders.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (format sniffed from content) |
//! | **Resize** | Lanczos3, exact target size |
//! | **Encode** | `image` codecs; lossy WebP via `webp` |
//!
//! The module is split into:
//! - **Calculations**: Dimension resolution (fit-inside or stretch), pure and unit testable
//! - **Formats**: Codec choice, save parameters, and color-mode normalization
//! - **Parameters**: Data structures describing an encode
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
pub mod formats;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, SourceImage};
pub use calculations::{InvalidDimension, resolve_dimensions};
pub use formats::{
    Codec, ResolvedFormat, SaveParams, TargetFormat, normalize_color, resolve_format,
};
pub use params::{EncodeParams, Quality};
pub use rust_backend::{RustBackend, supported_input_extensions};
