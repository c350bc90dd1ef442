//! # pixbatch
//!
//! Batch image resizing and format conversion. Select a set of images, pick a
//! target size and output format, and every image is decoded, resized,
//! converted, and written to an output directory under a predictable name.
//! One bad image never stops the batch.
//!
//! # Pipeline
//!
//! ```text
//! inputs ─ scan ─▶ [ImageTask] ─ process ─▶ [ItemResult] + BatchSummary
//!                                  │
//!                                  ├─ decode        (imaging::backend)
//!                                  ├─ format        (imaging::formats)
//!                                  ├─ resize        (imaging::calculations)
//!                                  ├─ name          (naming)
//!                                  └─ encode/write  (imaging::rust_backend)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`process`] | Item processor, batch orchestrator, background [`process::BatchRunner`] |
//! | [`imaging`] | Dimension and format resolution, the [`imaging::ImageBackend`] seam, the `image`-crate backend |
//! | [`naming`] | Output path policy: `<dir>/<stem><suffix>.<ext>` |
//! | [`config`] | Layered `pixbatch.toml` loading and validation into [`config::ProcessingConfig`] |
//! | [`scan`] | Expands files and directories into an ordered task list |
//! | [`types`] | Tasks, per-item results, summaries, progress events |
//! | [`output`] | CLI output formatting for plans, progress and summaries |
//!
//! # Design Decisions
//!
//! ## Per-Item Failure Isolation
//!
//! [`process::process_item`] turns every failure (unreadable file, encoder
//! error, write error) into a value on the item's result. Only problems that
//! would make *every* item fail are reported as a batch error, and those are
//! all checked before the first image is opened.
//!
//! ## Progress as Events
//!
//! The engine does not print. It sends [`types::ProgressEvent`]s over an
//! `mpsc` channel and the caller decides what to show. The CLI drains them on
//! a printer thread; tests collect them into a `Vec`.
//!
//! ## One Batch at a Time
//!
//! [`process::BatchRunner`] owns a single-flight flag. A second start while a
//! batch is in flight is refused rather than queued, and the flag is released
//! by a drop guard when the worker thread ends, however it ends.
//!
//! ## Backend Trait
//!
//! Pixel work sits behind [`imaging::ImageBackend`]. Pipeline tests run
//! against a recording mock; integration tests in `tests/` use the real
//! encoders on small synthetic images.

pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
