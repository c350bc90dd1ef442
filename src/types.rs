//! Shared types passed between the engine and its caller.
//!
//! Everything here is immutable once created: tasks go in, results and
//! progress events come out. Results and summaries serialize to JSON for
//! `--summary-json`.

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One selected source image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageTask {
    pub source_path: PathBuf,
}

impl ImageTask {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
        }
    }

    /// Short label for progress display: the file name, or the full path if
    /// there is none.
    pub fn label(&self) -> String {
        label_for(&self.source_path)
    }
}

pub(crate) fn label_for(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Why a single item failed. Never aborts the batch.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum ItemError {
    #[error("decode error: {0}")]
    Decode(String),
    #[error("invalid dimensions: {0}")]
    InvalidDimension(String),
    #[error("encode error: {0}")]
    Encode(String),
    #[error("write error: {0}")]
    Write(String),
    /// The backend panicked while handling this item.
    #[error("internal error: {0}")]
    Panicked(String),
    #[error("cancelled before processing")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Success { output_path: PathBuf },
    Failure { reason: ItemError },
}

/// The outcome of processing one [`ImageTask`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemResult {
    pub source_path: PathBuf,
    pub outcome: Outcome,
}

impl ItemResult {
    pub fn success(source_path: impl Into<PathBuf>, output_path: PathBuf) -> Self {
        Self {
            source_path: source_path.into(),
            outcome: Outcome::Success { output_path },
        }
    }

    pub fn failure(source_path: impl Into<PathBuf>, reason: ItemError) -> Self {
        Self {
            source_path: source_path.into(),
            outcome: Outcome::Failure { reason },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    pub fn output_path(&self) -> Option<&Path> {
        match &self.outcome {
            Outcome::Success { output_path } => Some(output_path),
            Outcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ItemError> {
        match &self.outcome {
            Outcome::Success { .. } => None,
            Outcome::Failure { reason } => Some(reason),
        }
    }
}

/// Final tally of a batch, one [`ItemResult`] per task in selection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    /// True when the run stopped early; unstarted tasks carry
    /// [`ItemError::Cancelled`].
    pub cancelled: bool,
    pub results: Vec<ItemResult>,
}

impl BatchSummary {
    pub(crate) fn with_capacity(total: usize) -> Self {
        Self {
            total,
            succeeded: 0,
            cancelled: false,
            results: Vec::with_capacity(total),
        }
    }

    pub(crate) fn record(&mut self, result: ItemResult) {
        if result.is_success() {
            self.succeeded += 1;
        }
        self.results.push(result);
    }

    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemResult> {
        self.results.iter().filter(|r| !r.is_success())
    }

    pub fn is_complete_success(&self) -> bool {
        self.succeeded == self.total
    }
}

/// Progress signal emitted by the batch orchestrator.
///
/// A run emits `Started`, then one `ItemFinished` per processed item with a
/// strictly increasing `completed`, then exactly one `Finished`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started {
        total: usize,
    },
    ItemFinished {
        completed: usize,
        total: usize,
        label: String,
        result: ItemResult,
    },
    Finished {
        total: usize,
        succeeded: usize,
        cancelled: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_is_file_name() {
        assert_eq!(ImageTask::new("/a/b/cat.png").label(), "cat.png");
        assert_eq!(ImageTask::new("/").label(), "/");
    }

    #[test]
    fn summary_tallies_successes() {
        let mut summary = BatchSummary::with_capacity(3);
        summary.record(ItemResult::success("a.png", "out/a.png".into()));
        summary.record(ItemResult::failure("b.png", ItemError::Decode("bad".into())));
        summary.record(ItemResult::success("c.png", "out/c.png".into()));

        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.failures().count(), 1);
        assert!(!summary.is_complete_success());
    }

    #[test]
    fn result_accessors() {
        let ok = ItemResult::success("a.png", "out/a.png".into());
        assert_eq!(ok.output_path(), Some(Path::new("out/a.png")));
        assert_eq!(ok.error(), None);

        let bad = ItemResult::failure("b.png", ItemError::Cancelled);
        assert_eq!(bad.output_path(), None);
        assert_eq!(bad.error(), Some(&ItemError::Cancelled));
    }

    #[test]
    fn result_serializes_with_status_tag() {
        let json = serde_json::to_value(ItemResult::failure(
            "b.png",
            ItemError::Write("disk full".into()),
        ))
        .unwrap();
        assert_eq!(json["outcome"]["status"], "failure");
        assert_eq!(json["outcome"]["reason"]["kind"], "write");
        assert_eq!(json["outcome"]["reason"]["message"], "disk full");
    }

    #[test]
    fn item_error_messages() {
        assert_eq!(
            ItemError::Decode("x.png: bad header".into()).to_string(),
            "decode error: x.png: bad header"
        );
        assert_eq!(ItemError::Cancelled.to_string(), "cancelled before processing");
    }
}
