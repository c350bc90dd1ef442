//! CLI output formatting for batch runs.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Settings
//!     Format: original
//!     Quality: 85
//!     Size: 800x600 (fit inside)
//!     Output: out/ (suffix "_processed")
//!
//! Images (2)
//! 001 cat.png
//!     Source: shoot/cat.png
//! 002 dog.jpg
//!     Source: shoot/dog.jpg
//! ```
//!
//! ## Run
//!
//! ```text
//! Processing 3 images
//! [001/003] cat.png → out/cat_processed.png
//! [002/003] broken.jpg FAILED: decode error: ...
//! [003/003] dog.jpg → out/dog_processed.jpg
//!
//! Processed 2 of 3 images
//! Failed
//!     broken.jpg: decode error: ...
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::config::ProcessingConfig;
use crate::types::{BatchSummary, ImageTask, Outcome, ProgressEvent, label_for};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "image" } else { "images" }
}

// ============================================================================
// Check: resolved settings and planned tasks
// ============================================================================

pub fn format_plan(tasks: &[ImageTask], config: &ProcessingConfig) -> Vec<String> {
    let mode = if config.keep_aspect_ratio {
        "fit inside"
    } else {
        "stretch"
    };
    let mut lines = vec![
        "Settings".to_string(),
        format!("{}Format: {}", indent(1), config.target_format),
        format!("{}Quality: {}", indent(1), config.quality.value()),
        format!(
            "{}Size: {}x{} ({mode})",
            indent(1),
            config.target_width,
            config.target_height
        ),
        format!(
            "{}Output: {}/ (suffix \"{}\")",
            indent(1),
            config.output_directory.display(),
            config.suffix
        ),
        String::new(),
        format!("Images ({})", tasks.len()),
    ];

    for (i, task) in tasks.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), task.label()));
        lines.push(format!(
            "{}Source: {}",
            indent(1),
            task.source_path.display()
        ));
    }
    lines
}

pub fn print_plan(tasks: &[ImageTask], config: &ProcessingConfig) {
    for line in format_plan(tasks, config) {
        println!("{}", line);
    }
}

// ============================================================================
// Run: progress events
// ============================================================================

/// Format a single progress event as display lines.
pub fn format_progress_event(event: &ProgressEvent) -> Vec<String> {
    match event {
        ProgressEvent::Started { total } => {
            vec![format!("Processing {total} {}", plural(*total))]
        }
        ProgressEvent::ItemFinished {
            completed,
            total,
            label,
            result,
        } => {
            let position = format!("[{}/{}]", format_index(*completed), format_index(*total));
            let line = match &result.outcome {
                Outcome::Success { output_path } => {
                    format!("{position} {label} → {}", output_path.display())
                }
                Outcome::Failure { reason } => format!("{position} {label} FAILED: {reason}"),
            };
            vec![line]
        }
        // The summary view covers the end of the run.
        ProgressEvent::Finished { .. } => Vec::new(),
    }
}

// ============================================================================
// Run: final summary
// ============================================================================

pub fn format_summary(summary: &BatchSummary) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!(
            "Processed {} of {} {}",
            summary.succeeded,
            summary.total,
            plural(summary.total)
        ),
    ];
    if summary.cancelled {
        lines.push("Cancelled before all images were processed".to_string());
    }

    let failures: Vec<_> = summary.failures().collect();
    if !failures.is_empty() {
        lines.push("Failed".to_string());
        for result in failures {
            if let Some(reason) = result.error() {
                lines.push(format!(
                    "{}{}: {reason}",
                    indent(1),
                    label_for(&result.source_path)
                ));
            }
        }
    }
    lines
}

pub fn print_summary(summary: &BatchSummary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}
