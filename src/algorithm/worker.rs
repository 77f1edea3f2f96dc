//! Background blend worker with a record stream, shared preview and cancellation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TrySendError};
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};

use image::RgbaImage;

use crate::algorithm::compositor::reconstruct;
use crate::algorithm::executor::{BlendOutcome, BlendRun, IterationRecord, SolverConfig};
use crate::algorithm::problem::BlendProblem;
use crate::io::configuration::RECORD_QUEUE_CAPACITY;
use crate::io::error::{BlendError, Result};

/// Cooperative cancellation flag, polled once per iteration
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, uncancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Latest preview patch, replaced atomically by the worker
///
/// Readers always see a complete snapshot; the worker swaps in a new `Arc`
/// instead of writing pixels in place.
#[derive(Debug, Clone)]
pub struct SharedPreview(Arc<RwLock<Arc<RgbaImage>>>);

impl SharedPreview {
    /// Shared slot holding `initial`
    pub fn new(initial: Arc<RgbaImage>) -> Self {
        Self(Arc::new(RwLock::new(initial)))
    }

    /// Replace the snapshot
    pub fn publish(&self, preview: Arc<RgbaImage>) {
        let mut slot = self.0.write().unwrap_or_else(|e| e.into_inner());
        *slot = preview;
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<RgbaImage> {
        let slot = self.0.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&slot)
    }
}

/// A blend running on its own thread
///
/// Records stream through [`BlendWorker::records`] in iteration order. The
/// queue holds at most [`RECORD_QUEUE_CAPACITY`] records; while it is full,
/// new records are skipped, so a slow consumer sees a subsequence. The shared
/// preview and the joined outcome always reflect the latest iterate. Dropping
/// the receiver side does not stop the solve; use [`BlendWorker::cancel`].
pub struct BlendWorker {
    handle: JoinHandle<Result<BlendOutcome>>,
    records: Receiver<IterationRecord>,
    cancel: CancelToken,
    preview: SharedPreview,
}

impl BlendWorker {
    /// Start solving `problem` in the background
    ///
    /// # Errors
    ///
    /// Returns a configuration error before any thread is started if `config`
    /// is invalid, or a file system error if the thread cannot be spawned
    pub fn spawn(problem: BlendProblem, config: SolverConfig) -> Result<Self> {
        config.validate()?;

        let cancel = CancelToken::new();
        let preview = SharedPreview::new(Arc::new(reconstruct(
            problem.initial(),
            problem.area(),
            problem.bounds(),
        )));
        let (sender, records) = mpsc::sync_channel(RECORD_QUEUE_CAPACITY);

        let token = cancel.clone();
        let shared = preview.clone();
        let handle = thread::Builder::new()
            .name("blend-worker".to_string())
            .spawn(move || -> Result<BlendOutcome> {
                let mut run = BlendRun::new(&problem, config)?.with_cancel(token);
                let mut skipped = 0_usize;
                for record in run.by_ref() {
                    let record = record?;
                    shared.publish(Arc::clone(&record.preview));
                    match sender.try_send(record) {
                        Ok(()) | Err(TrySendError::Disconnected(_)) => {}
                        Err(TrySendError::Full(_)) => skipped += 1,
                    }
                }
                if skipped > 0 {
                    log::debug!("record queue full, skipped {skipped} records");
                }
                Ok(run.finish())
            })
            .map_err(|source| BlendError::FileSystem {
                path: "blend-worker".into(),
                operation: "spawn worker thread",
                source,
            })?;

        Ok(Self {
            handle,
            records,
            cancel,
            preview,
        })
    }

    /// Stream of iteration records
    pub const fn records(&self) -> &Receiver<IterationRecord> {
        &self.records
    }

    /// Token that cancels this worker
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Request cancellation; the worker stops before its next sweep
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Handle to the shared preview
    pub fn preview(&self) -> SharedPreview {
        self.preview.clone()
    }

    /// Whether the worker thread has exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the worker and collect its outcome
    ///
    /// # Errors
    ///
    /// Returns the run's own error (divergence), or
    /// [`BlendError::WorkerPanicked`] if the thread panicked
    pub fn join(self) -> Result<BlendOutcome> {
        self.handle
            .join()
            .unwrap_or_else(|_payload| Err(BlendError::WorkerPanicked))
    }
}
