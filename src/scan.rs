//! Selection expansion: turns command-line inputs into an ordered task list.
//!
//! Inputs are taken in the order given:
//!
//! ```text
//! pixbatch run cover.png shoot/ missing.jpg
//!
//! cover.png            → task (as given)
//! shoot/               → shoot/a.jpg, shoot/b.PNG, ...  (sorted by name)
//! missing.jpg          → task (as given; fails later with a decode error)
//! ```
//!
//! ## Rules
//!
//! - Explicit files are never filtered or checked for existence; the
//!   processor reports a per-item failure instead.
//! - Directories list their direct children, or the whole tree with
//!   `recursive`. Hidden entries (leading `.`) are skipped, and so are hidden
//!   subdirectories.
//! - Only files with a known image extension are picked up from directories
//!   (case-insensitive).
//! - Files whose stem already ends with the output suffix are skipped so that
//!   running twice over the same folder does not process earlier outputs.
//! - Duplicates are kept: each input entry yields its own tasks.

use crate::imaging::supported_input_extensions;
use crate::types::ImageTask;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("cannot read directory {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// How directories in the selection are expanded.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Skip files whose stem ends with this suffix. Empty disables the check.
    pub skip_suffix: String,
}

/// Expand `inputs` into tasks, preserving input order.
pub fn collect_tasks<P: AsRef<Path>>(
    inputs: &[P],
    options: &ScanOptions,
) -> Result<Vec<ImageTask>, ScanError> {
    let mut tasks = Vec::new();
    for input in inputs {
        let input = input.as_ref();
        if input.is_dir() {
            tasks.extend(expand_directory(input, options)?);
        } else {
            tasks.push(ImageTask::new(input));
        }
    }
    Ok(tasks)
}

fn expand_directory(dir: &Path, options: &ScanOptions) -> Result<Vec<ImageTask>, ScanError> {
    let max_depth = if options.recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    let mut tasks = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| ScanError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if entry.file_type().is_file() && is_image(path) && !is_prior_output(path, options) {
            tasks.push(ImageTask::new(path));
        }
    }
    Ok(tasks)
}

/// The root itself is never hidden; temp dirs and `.` start with a dot too.
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn is_image(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    supported_input_extensions().contains(&ext.as_str())
}

fn is_prior_output(path: &Path, options: &ScanOptions) -> bool {
    if options.skip_suffix.is_empty() {
        return false;
    }
    path.file_stem()
        .is_some_and(|s| s.to_string_lossy().ends_with(&options.skip_suffix))
}
