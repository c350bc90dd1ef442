//! Output file naming.
//!
//! Every output is written as `<output_dir>/<source stem><suffix>.<ext>`:
//! - `photos/IMG_0042.PNG` + `_processed` + JPEG → `out/IMG_0042_processed.jpg`
//! - `scan.tiff` kept as TIFF → `out/scan_processed.tiff`
//!
//! The extension always comes from the output codec, never from the source
//! file name, so a mislabelled source still gets a correct extension.
//!
//! ## Re-runs
//!
//! Names are a pure function of `(source, output_dir, codec, suffix)`.
//! Running the same batch twice into the same directory overwrites the first
//! run's files. Callers who want to keep older outputs pick a different
//! directory or suffix.
//!
//! Two sources that share a stem and resolve to the same codec (e.g.
//! `a/cat.png` and `b/cat.png` into one directory) map to the same path; the
//! later item wins.

use crate::imaging::Codec;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Suffix appended to the source stem unless configured otherwise.
pub const DEFAULT_SUFFIX: &str = "_processed";

/// Stem used when the source path has no file name (e.g. `..`).
const FALLBACK_STEM: &str = "image";

#[derive(Error, Debug)]
pub enum NamingError {
    #[error("cannot create output directory {path}: {source}")]
    OutputDirectoryUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Compute the output path for `source`. Pure; touches no filesystem.
pub fn output_path(source: &Path, output_dir: &Path, codec: Codec, suffix: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy())
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_STEM.into());
    output_dir.join(format!("{stem}{suffix}.{}", codec.extension()))
}

/// Create `output_dir` (and parents) if missing. Idempotent.
pub fn ensure_output_dir(output_dir: &Path) -> Result<(), NamingError> {
    std::fs::create_dir_all(output_dir).map_err(|source| NamingError::OutputDirectoryUnwritable {
        path: output_dir.to_path_buf(),
        source,
    })
}

/// Ensure the directory exists, then compute the output path.
pub fn resolve_output_path(
    source: &Path,
    output_dir: &Path,
    codec: Codec,
    suffix: &str,
) -> Result<PathBuf, NamingError> {
    ensure_output_dir(output_dir)?;
    Ok(output_path(source, output_dir, codec, suffix))
}
