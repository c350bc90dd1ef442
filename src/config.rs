//! Batch configuration.
//!
//! Settings come from three layers, each overriding the one before:
//!
//! 1. stock defaults (below)
//! 2. a `pixbatch.toml` file: `--config PATH`, or `./pixbatch.toml` if present
//! 3. command-line flags
//!
//! Layers are merged as TOML tables, then deserialized into [`Settings`] and
//! validated into a [`ProcessingConfig`] before any image is touched.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! format = "original"       # original | jpeg | png | webp | bmp
//! quality = 85              # 1-100, used by jpeg and webp only
//! directory = "."           # created if missing
//! suffix = "_processed"     # appended to each source file stem
//!
//! [resize]
//! width = 800
//! height = 600
//! keep_aspect_ratio = true  # fit inside width x height instead of stretching
//! ```
//!
//! Unknown keys are rejected to catch typos early. Out-of-range values are
//! rejected too; nothing is silently clamped.

use crate::imaging::{Quality, TargetFormat};
use crate::naming::DEFAULT_SUFFIX;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file picked up from the working directory.
pub const CONFIG_FILENAME: &str = "pixbatch.toml";

/// Largest accepted target edge in pixels. JPEG and GIF cannot go past it.
pub const MAX_EDGE: u32 = 65535;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("quality must be between 1 and 100, got {0}")]
    InvalidQuality(u32),
    #[error("target width and height must be between 1 and 65535, got {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },
    #[error("unsupported output format: {0:?} (expected original, jpeg, png, webp or bmp)")]
    UnsupportedFormat(String),
}

/// Raw settings as written in `pixbatch.toml`.
///
/// All fields have defaults. Values are not checked until [`Settings::resolve`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Output format, quality and location.
    pub output: OutputSettings,
    /// Target box and aspect policy.
    pub resize: ResizeSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    /// Target format name; `original` keeps each source's format.
    pub format: String,
    /// JPEG/WebP quality (1 = worst, 100 = best).
    pub quality: u32,
    /// Directory that receives all outputs.
    pub directory: PathBuf,
    /// Appended to the source stem to form the output name.
    pub suffix: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: "original".to_string(),
            quality: Quality::default().value(),
            directory: PathBuf::from("."),
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeSettings {
    pub width: u32,
    pub height: u32,
    /// Fit inside the box preserving proportions; `false` stretches to it.
    pub keep_aspect_ratio: bool,
}

impl Default for ResizeSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            keep_aspect_ratio: true,
        }
    }
}

/// Validated configuration for one batch run. Immutable for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingConfig {
    pub target_format: TargetFormat,
    pub quality: Quality,
    pub target_width: u32,
    pub target_height: u32,
    pub keep_aspect_ratio: bool,
    pub output_directory: PathBuf,
    pub suffix: String,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        // Stock settings always resolve.
        Settings::default()
            .resolve()
            .unwrap_or_else(|e| unreachable!("stock settings invalid: {e}"))
    }
}

impl ProcessingConfig {
    /// Re-check invariants that the public fields allow callers to break.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let edge_ok = |edge: u32| (1..=MAX_EDGE).contains(&edge);
        if !edge_ok(self.target_width) || !edge_ok(self.target_height) {
            return Err(ConfigError::InvalidDimension {
                width: self.target_width,
                height: self.target_height,
            });
        }
        Ok(())
    }
}

impl Settings {
    /// Validate every value and build the run configuration.
    pub fn resolve(&self) -> Result<ProcessingConfig, ConfigError> {
        let target_format = TargetFormat::parse(&self.output.format)
            .ok_or_else(|| ConfigError::UnsupportedFormat(self.output.format.clone()))?;
        let quality = Quality::new(self.output.quality)
            .ok_or(ConfigError::InvalidQuality(self.output.quality))?;

        let config = ProcessingConfig {
            target_format,
            quality,
            target_width: self.resize.width,
            target_height: self.resize.height,
            keep_aspect_ratio: self.resize.keep_aspect_ratio,
            output_directory: self.output.directory.clone(),
            suffix: self.output.suffix.clone(),
        };
        config.validate()?;
        Ok(config)
    }
}

// =============================================================================
// Config loading and merging
// =============================================================================

/// Returns the stock default settings as a `toml::Value::Table`.
///
/// This is the base layer that file and flag overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Settings::default()).expect("default settings must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Pick the config file layer.
///
/// An explicit path must exist. Without one, `dir/pixbatch.toml` is used
/// when present and skipped otherwise.
pub fn find_config_layer(
    explicit: Option<&Path>,
    dir: &Path,
) -> Result<Option<toml::Value>, ConfigError> {
    if let Some(path) = explicit {
        return load_raw_config(path).map(Some);
    }
    let implicit = dir.join(CONFIG_FILENAME);
    if !implicit.exists() {
        return Ok(None);
    }
    load_raw_config(&implicit).map(Some)
}

/// Merge overlays onto the stock defaults and deserialize.
pub fn resolve_settings(
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<Settings, ConfigError> {
    let merged = overlays
        .into_iter()
        .fold(stock_defaults_value(), merge_toml);
    let settings: Settings = merged.try_into()?;
    Ok(settings)
}

/// Returns a fully-commented stock `pixbatch.toml`.
pub fn stock_config_toml() -> &'static str {
    r##"# pixbatch configuration
#
# Place this file as pixbatch.toml in the directory you run pixbatch from,
# or pass it with --config. Every key is optional; command-line flags
# override anything set here.

[output]
# Output format: "original" keeps each file's own format (GIF and TIFF
# included; unrecognised formats become JPEG). Otherwise one of
# "jpeg", "png", "webp", "bmp".
format = "original"

# Encoding quality for JPEG and WebP, 1-100. Ignored by other formats.
quality = 85

# Where processed files go. Created if it does not exist.
directory = "."

# Output files are named <stem><suffix>.<ext>. Re-running into the same
# directory overwrites earlier outputs.
suffix = "_processed"

[resize]
# Target box in pixels, each edge 1 to 65535.
width = 800
height = 600

# true: scale to fit inside width x height, keeping proportions.
# false: stretch to exactly width x height.
keep_aspect_ratio = true
"##
}
