//! Batch processing engine.
//!
//! Takes a selection of [`ImageTask`]s and a validated [`ProcessingConfig`],
//! and produces one [`ItemResult`] per task plus a [`BatchSummary`].
//!
//! ## Per item
//!
//! ```text
//! decode → normalize color → resize (Lanczos3, skipped if unchanged)
//!        → resolve output path → encode → write
//! ```
//!
//! Any failure along the way becomes `Failure(reason)` for that item only.
//! [`process_item`] never returns an error and never panics on bad input.
//! The batch loop also catches panics raised inside a backend and records
//! them as [`ItemError::Panicked`], so one bad item cannot take down the run.
//!
//! ## Per batch
//!
//! Configuration problems are caught before the first item is touched and
//! abort the run with a [`BatchError`]: empty selection, invalid config, a
//! codec the backend cannot write, or an output directory that cannot be
//! created. After that, items are processed strictly in selection order, one
//! at a time, and the run always completes with a summary.
//!
//! ## Progress
//!
//! Progress is reported as [`ProgressEvent`]s over an mpsc channel: one
//! `Started`, one `ItemFinished` per processed item, and exactly one
//! `Finished`. The caller owns all rendering; a dropped receiver is ignored.
//!
//! ## Background runs
//!
//! [`BatchRunner`] runs a batch on a dedicated thread and allows only one
//! batch in flight at a time. Cancellation is cooperative: the flag is
//! checked before each item, and items not yet started are recorded as
//! [`ItemError::Cancelled`].

use crate::config::{ConfigError, ProcessingConfig};
use crate::imaging::{
    BackendError, Codec, Dimensions, EncodeParams, ImageBackend, RustBackend, normalize_color,
    resolve_dimensions, resolve_format,
};
use crate::naming::{self, NamingError};
use crate::types::{BatchSummary, ImageTask, ItemError, ItemResult, Outcome, ProgressEvent};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("this build cannot encode {0}")]
    UnsupportedFormat(Codec),
    #[error("output directory {path} is not writable: {source}")]
    OutputDirectoryUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no images selected")]
    EmptyBatch,
    #[error("a batch is already running")]
    BatchAlreadyRunning,
    #[error("failed to start batch thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("batch thread panicked")]
    WorkerPanicked,
}

impl From<NamingError> for BatchError {
    fn from(err: NamingError) -> Self {
        match err {
            NamingError::OutputDirectoryUnwritable { path, source } => {
                BatchError::OutputDirectoryUnwritable { path, source }
            }
        }
    }
}

// =============================================================================
// Item processor
// =============================================================================

/// Process one image end to end. Failures are captured in the result.
pub fn process_item(
    backend: &impl ImageBackend,
    task: &ImageTask,
    config: &ProcessingConfig,
) -> ItemResult {
    match try_process_item(backend, &task.source_path, config) {
        Ok(output_path) => ItemResult::success(&task.source_path, output_path),
        Err(reason) => ItemResult::failure(&task.source_path, reason),
    }
}

fn try_process_item(
    backend: &impl ImageBackend,
    source_path: &Path,
    config: &ProcessingConfig,
) -> Result<PathBuf, ItemError> {
    let source = backend
        .decode(source_path)
        .map_err(|e| ItemError::Decode(describe(source_path, e)))?;

    // A source format we cannot write back falls through to the default codec.
    let source_codec = source.codec.filter(|c| backend.can_encode(*c));
    let format = resolve_format(source_codec, config.target_format, config.quality);

    let pixels = normalize_color(source.pixels, format.codec);
    let current = Dimensions::of(&pixels);
    let target = resolve_dimensions(
        (current.width, current.height),
        (config.target_width, config.target_height),
        config.keep_aspect_ratio,
    )
    .map_err(|e| ItemError::InvalidDimension(e.to_string()))?;

    let pixels = if target == current {
        pixels
    } else {
        backend.resize(&pixels, target)
    };

    let output = naming::resolve_output_path(
        source_path,
        &config.output_directory,
        format.codec,
        &config.suffix,
    )
    .map_err(|e| ItemError::Write(e.to_string()))?;

    debug!(
        source = %source_path.display(),
        codec = %format.codec,
        width = target.width,
        height = target.height,
        output = %output.display(),
        "encoding"
    );

    backend
        .encode(&EncodeParams {
            image: &pixels,
            codec: format.codec,
            save: format.save,
            output: &output,
        })
        .map_err(|e| match e {
            BackendError::Io(err) => ItemError::Write(format!("{}: {err}", output.display())),
            BackendError::Encode(msg) | BackendError::Decode(msg) => ItemError::Encode(msg),
        })?;

    Ok(output)
}

fn describe(path: &Path, err: BackendError) -> String {
    match err {
        BackendError::Io(e) => format!("{}: {e}", path.display()),
        BackendError::Decode(msg) | BackendError::Encode(msg) => msg,
    }
}

// =============================================================================
// Batch orchestrator
// =============================================================================

/// Cooperative cancellation flag shared between a caller and a running batch.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Run a batch on the calling thread with the production backend.
pub fn run_batch(
    tasks: &[ImageTask],
    config: &ProcessingConfig,
    progress: Option<Sender<ProgressEvent>>,
    cancel: &CancelFlag,
) -> Result<BatchSummary, BatchError> {
    run_batch_with_backend(&RustBackend::new(), tasks, config, progress, cancel)
}

/// Run a batch using a specific backend (allows testing with mock).
pub fn run_batch_with_backend(
    backend: &impl ImageBackend,
    tasks: &[ImageTask],
    config: &ProcessingConfig,
    progress: Option<Sender<ProgressEvent>>,
    cancel: &CancelFlag,
) -> Result<BatchSummary, BatchError> {
    preflight(backend, tasks, config)?;
    Ok(execute(backend, tasks, config, progress.as_ref(), cancel))
}

/// Checks that abort a run before any item is processed.
fn preflight(
    backend: &impl ImageBackend,
    tasks: &[ImageTask],
    config: &ProcessingConfig,
) -> Result<(), BatchError> {
    if tasks.is_empty() {
        return Err(BatchError::EmptyBatch);
    }
    config.validate()?;
    if let Some(codec) = config.target_format.codec() {
        if !backend.can_encode(codec) {
            return Err(BatchError::UnsupportedFormat(codec));
        }
    }
    naming::ensure_output_dir(&config.output_directory)?;
    Ok(())
}

fn execute(
    backend: &impl ImageBackend,
    tasks: &[ImageTask],
    config: &ProcessingConfig,
    progress: Option<&Sender<ProgressEvent>>,
    cancel: &CancelFlag,
) -> BatchSummary {
    let total = tasks.len();
    info!(
        total,
        format = %config.target_format,
        output = %config.output_directory.display(),
        "batch started"
    );
    emit(progress, ProgressEvent::Started { total });

    let mut summary = BatchSummary::with_capacity(total);
    for task in tasks {
        if cancel.is_cancelled() {
            summary.cancelled = true;
            summary.record(ItemResult::failure(&task.source_path, ItemError::Cancelled));
            continue;
        }

        let result = process_isolated(backend, task, config);
        match &result.outcome {
            Outcome::Success { output_path } => {
                debug!(source = %task.source_path.display(), output = %output_path.display(), "item done");
            }
            Outcome::Failure { reason } => {
                warn!(source = %task.source_path.display(), %reason, "item failed");
            }
        }

        summary.record(result.clone());
        emit(
            progress,
            ProgressEvent::ItemFinished {
                completed: summary.results.len(),
                total,
                label: task.label(),
                result,
            },
        );
    }

    info!(
        total,
        succeeded = summary.succeeded,
        cancelled = summary.cancelled,
        "batch finished"
    );
    emit(
        progress,
        ProgressEvent::Finished {
            total,
            succeeded: summary.succeeded,
            cancelled: summary.cancelled,
        },
    );
    summary
}

/// [`process_item`] with any backend panic turned into a failure for this item.
fn process_isolated(
    backend: &impl ImageBackend,
    task: &ImageTask,
    config: &ProcessingConfig,
) -> ItemResult {
    panic::catch_unwind(AssertUnwindSafe(|| process_item(backend, task, config))).unwrap_or_else(
        |payload| {
            let message = panic_message(&*payload);
            error!(source = %task.source_path.display(), %message, "backend panicked");
            ItemResult::failure(&task.source_path, ItemError::Panicked(message))
        },
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn emit(progress: Option<&Sender<ProgressEvent>>, event: ProgressEvent) {
    if let Some(tx) = progress {
        // Receiver gone means nobody is watching; keep processing.
        tx.send(event).ok();
    }
}

// =============================================================================
// Background runner
// =============================================================================

/// Runs batches on a background thread, one at a time.
pub struct BatchRunner<B = RustBackend> {
    backend: Arc<B>,
    running: Arc<AtomicBool>,
}

impl BatchRunner<RustBackend> {
    pub fn new() -> Self {
        Self::with_backend(RustBackend::new())
    }
}

impl Default for BatchRunner<RustBackend> {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the single-flight flag when the run ends, including by panic.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<B: ImageBackend + 'static> BatchRunner<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Validate and start a batch in the background.
    ///
    /// Precondition failures are returned here, synchronously, and no thread
    /// is started. A second call while a batch is in flight fails with
    /// [`BatchError::BatchAlreadyRunning`].
    pub fn start(
        &self,
        tasks: Vec<ImageTask>,
        config: ProcessingConfig,
        progress: Option<Sender<ProgressEvent>>,
    ) -> Result<BatchHandle, BatchError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(BatchError::BatchAlreadyRunning);
        }
        let guard = RunningGuard(Arc::clone(&self.running));

        preflight(self.backend.as_ref(), &tasks, &config)?;

        let cancel = CancelFlag::new();
        let worker_cancel = cancel.clone();
        let backend = Arc::clone(&self.backend);
        let worker = std::thread::Builder::new()
            .name("pixbatch-batch".to_string())
            .spawn(move || {
                let _guard = guard;
                execute(
                    backend.as_ref(),
                    &tasks,
                    &config,
                    progress.as_ref(),
                    &worker_cancel,
                )
            })
            .map_err(BatchError::Spawn)?;

        Ok(BatchHandle { worker, cancel })
    }
}

/// Handle to a batch running in the background.
pub struct BatchHandle {
    worker: JoinHandle<BatchSummary>,
    cancel: CancelFlag,
}

impl BatchHandle {
    /// Ask the batch to stop before its next item.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Wait for the batch to finish and take its summary.
    pub fn join(self) -> Result<BatchSummary, BatchError> {
        self.worker.join().map_err(|_| BatchError::WorkerPanicked)
    }
}
