//! Batch processing of a game's media set.
//!
//! Takes a [`MediaJob`] (the user's chosen source files) and fills the
//! `meta/` folder of a game directory with normalized images and copied
//! audio.
//!
//! ## Output Structure
//!
//! ```text
//! <output>/meta/
//! ├── icon.jpg               # 512x512
//! ├── background.jpg         # 1920x1080
//! ├── effect.mp3             # copied verbatim
//! ├── theme.mp3
//! └── screens/
//!     ├── screen0.jpg        # 1920x1080, in job order
//!     └── screen1.jpg
//! ```
//!
//! ## Parallel Processing
//!
//! Items run in parallel on the global [rayon](https://docs.rs/rayon) pool.
//! Every item is independent: one failing never touches another's output.
//! Completion is reported over an optional `mpsc` channel as a percentage
//! that only ever grows, regardless of the order workers finish in.
//!
//! ## Failure Policy
//!
//! Problems with the job itself (nothing to do, a required slot missing)
//! abort before anything is written and surface as [`ProcessError`].
//! Failures of single items, a missing source file included, are recorded in
//! the [`BatchReport`] and leave the other items alone. With `fail_fast` set,
//! a missing source aborts the batch up front and the first item failure
//! cancels everything not yet started.

use crate::config::MetaConfig;
use crate::imaging::encode::copy_atomic;
use crate::imaging::{ImageBackend, RustBackend, Strategy};
use crate::naming::{self, META_DIR, SCREENS_DIR};
use crate::types::{AssetSlot, AudioKind, CopyItem, WorkItem};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("No media to process.")]
    NoMedia,
    #[error("Missing required {0} image")]
    MissingRequired(&'static str),
    #[error("Source file not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The source files making up one game's media set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaJob {
    pub icon: Option<PathBuf>,
    pub background: Option<PathBuf>,
    /// Screenshots in output order: the first becomes `screen0.jpg`.
    pub screens: Vec<PathBuf>,
    pub effect: Option<PathBuf>,
    pub theme: Option<PathBuf>,
}

impl MediaJob {
    /// Append a screenshot unless the same path is already listed.
    ///
    /// Returns whether it was added.
    pub fn add_screen(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.screens.contains(&path) {
            return false;
        }
        self.screens.push(path);
        true
    }

    /// Number of items this job would produce.
    pub fn task_count(&self) -> usize {
        [&self.icon, &self.background, &self.effect, &self.theme]
            .iter()
            .filter(|p| p.is_some())
            .count()
            + self.screens.len()
    }
}

/// A single unit of batch work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Normalize(WorkItem),
    Copy(CopyItem),
}

impl Task {
    pub fn slot(&self) -> AssetSlot {
        match self {
            Task::Normalize(item) => item.slot,
            Task::Copy(item) => AssetSlot::Audio(item.kind),
        }
    }

    pub fn source(&self) -> &Path {
        match self {
            Task::Normalize(item) => &item.source,
            Task::Copy(item) => &item.source,
        }
    }

    pub fn dest(&self) -> &Path {
        match self {
            Task::Normalize(item) => &item.dest,
            Task::Copy(item) => &item.dest,
        }
    }
}

/// Turn a job into the ordered task list for `meta_dir`.
///
/// Order: icon, background, screenshots, effect, theme. Duplicate screenshot
/// paths are kept once, at their first position.
pub fn plan(job: &MediaJob, meta_dir: &Path, config: &MetaConfig) -> Result<Vec<Task>, ProcessError> {
    if job.task_count() == 0 {
        return Err(ProcessError::NoMedia);
    }
    let icon = job
        .icon
        .as_ref()
        .ok_or(ProcessError::MissingRequired("icon"))?;
    let background = job
        .background
        .as_ref()
        .ok_or(ProcessError::MissingRequired("background"))?;

    let mut screens: Vec<&PathBuf> = Vec::with_capacity(job.screens.len());
    for screen in &job.screens {
        if !screens.contains(&screen) {
            screens.push(screen);
        }
    }

    let image = |slot: AssetSlot, source: &Path| -> Option<Task> {
        let class = slot.class()?;
        Some(Task::Normalize(WorkItem {
            slot,
            source: source.to_path_buf(),
            target: config.targets.target_for(class),
            dest: naming::destination(meta_dir, slot),
        }))
    };
    let audio = |kind: AudioKind, source: &Path| {
        Task::Copy(CopyItem {
            kind,
            source: source.to_path_buf(),
            dest: naming::destination(meta_dir, AssetSlot::Audio(kind)),
        })
    };

    let mut tasks = Vec::new();
    tasks.extend(image(AssetSlot::Icon, icon));
    tasks.extend(image(AssetSlot::Background, background));
    for (i, screen) in screens.into_iter().enumerate() {
        tasks.extend(image(AssetSlot::Screenshot(i), screen));
    }
    if let Some(effect) = &job.effect {
        tasks.push(audio(AudioKind::Effect, effect));
    }
    if let Some(theme) = &job.theme {
        tasks.push(audio(AudioKind::Theme, theme));
    }

    Ok(tasks)
}

/// First task whose source file does not exist.
fn missing_source(tasks: &[Task]) -> Option<&Path> {
    tasks
        .iter()
        .map(Task::source)
        .find(|source| !source.is_file())
}

/// Batch-wide cancellation flag, shared by clones.
///
/// Cancelling stops items that have not started yet. An item already running
/// always finishes.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How one item ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemStatus {
    /// Image written using the given strategy.
    Normalized { strategy: Strategy },
    /// Audio copied.
    Copied,
    /// Audio source already is the destination file.
    Unchanged,
    Failed { reason: String },
    /// Never started because the batch was cancelled.
    Cancelled,
}

impl ItemStatus {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ItemStatus::Normalized { .. } | ItemStatus::Copied | ItemStatus::Unchanged
        )
    }
}

/// Progress events emitted during processing.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    /// Work on a slot began.
    Started { slot: AssetSlot },
    /// A slot finished; `percent` is the share of the batch done so far.
    Finished {
        slot: AssetSlot,
        status: ItemStatus,
        percent: u8,
    },
    /// Every item has been accounted for.
    Completed { cancelled: bool },
}

/// Result of one item.
#[derive(Debug, Clone, Serialize)]
pub struct ItemReport {
    pub slot: AssetSlot,
    pub source: PathBuf,
    pub dest: PathBuf,
    #[serde(flatten)]
    pub status: ItemStatus,
}

/// Outcome of a whole batch, items in job order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub meta_dir: PathBuf,
    pub items: Vec<ItemReport>,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.status.is_success()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &ItemReport> {
        self.items
            .iter()
            .filter(|i| matches!(i.status, ItemStatus::Failed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.status == ItemStatus::Cancelled)
            .count()
    }

    /// True when every item succeeded.
    pub fn is_success(&self) -> bool {
        self.items.iter().all(|i| i.status.is_success())
    }
}

/// Completion counter and event sink behind one lock, so percentages are
/// sent in the order they are computed.
struct Progress {
    done: usize,
    total: usize,
    events: Option<Sender<ProcessEvent>>,
}

impl Progress {
    fn emit(&self, event: ProcessEvent) {
        if let Some(tx) = &self.events {
            // A dropped receiver only means nobody is listening.
            let _ = tx.send(event);
        }
    }
}

struct Reporter(Mutex<Progress>);

impl Reporter {
    fn new(total: usize, events: Option<Sender<ProcessEvent>>) -> Self {
        Self(Mutex::new(Progress {
            done: 0,
            total,
            events,
        }))
    }

    fn with<R>(&self, f: impl FnOnce(&mut Progress) -> R) -> R {
        let mut guard = self.0.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    fn started(&self, slot: AssetSlot) {
        self.with(|p| p.emit(ProcessEvent::Started { slot }));
    }

    fn finished(&self, slot: AssetSlot, status: &ItemStatus) {
        self.with(|p| {
            p.done += 1;
            let percent = percent_done(p.done, p.total);
            p.emit(ProcessEvent::Finished {
                slot,
                status: status.clone(),
                percent,
            });
        });
    }

    fn completed(self, cancelled: bool) {
        self.with(|p| p.emit(ProcessEvent::Completed { cancelled }));
    }
}

/// `floor(done / total * 100)`, 100 for an empty batch.
pub fn percent_done(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (done.min(total) * 100 / total) as u8
}

/// Process a job into `<output_dir>/meta` with the built-in backend.
pub fn process(
    job: &MediaJob,
    output_dir: &Path,
    config: &MetaConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BatchReport, ProcessError> {
    let backend = RustBackend::new();
    process_with_backend(&backend, job, output_dir, config, &CancelToken::new(), events)
}

/// Process a job using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    job: &MediaJob,
    output_dir: &Path,
    config: &MetaConfig,
    cancel: &CancelToken,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BatchReport, ProcessError> {
    let meta_dir = output_dir.join(META_DIR);
    let tasks = plan(job, &meta_dir, config)?;
    let fail_fast = config.processing.fail_fast;
    if fail_fast {
        if let Some(source) = missing_source(&tasks) {
            return Err(ProcessError::SourceNotFound(source.to_path_buf()));
        }
    }
    std::fs::create_dir_all(meta_dir.join(SCREENS_DIR))?;

    let reporter = Reporter::new(tasks.len(), events);

    let items: Vec<ItemReport> = tasks
        .par_iter()
        .map(|task| {
            let slot = task.slot();
            let status = if cancel.is_cancelled() {
                ItemStatus::Cancelled
            } else {
                reporter.started(slot);
                let status = run_task(backend, task);
                if let ItemStatus::Failed { reason } = &status {
                    warn!(slot = %slot.label(), %reason, "item failed");
                    if fail_fast {
                        cancel.cancel();
                    }
                }
                reporter.finished(slot, &status);
                status
            };
            ItemReport {
                slot,
                source: task.source().to_path_buf(),
                dest: task.dest().to_path_buf(),
                status,
            }
        })
        .collect();

    let cancelled = items.iter().any(|i| i.status == ItemStatus::Cancelled);
    reporter.completed(cancelled);

    Ok(BatchReport {
        meta_dir,
        items,
        cancelled,
    })
}

fn run_task(backend: &impl ImageBackend, task: &Task) -> ItemStatus {
    match task {
        Task::Normalize(item) => match backend.normalize(&item.source, item.target, &item.dest) {
            Ok(strategy) => ItemStatus::Normalized { strategy },
            Err(e) => ItemStatus::Failed {
                reason: e.to_string(),
            },
        },
        Task::Copy(item) => match copy_audio(&item.source, &item.dest) {
            Ok(true) => ItemStatus::Copied,
            Ok(false) => ItemStatus::Unchanged,
            Err(e) => ItemStatus::Failed {
                reason: format!("failed to copy {}: {e}", item.source.display()),
            },
        },
    }
}

/// Copy an audio file into place, keeping its permissions and modification
/// time. Returns `false` if `source` and `dest` are already the same file.
pub fn copy_audio(source: &Path, dest: &Path) -> std::io::Result<bool> {
    if is_same_file(source, dest)? {
        debug!(path = %dest.display(), "audio already in place");
        return Ok(false);
    }
    copy_atomic(source, dest)?;
    Ok(true)
}

fn is_same_file(a: &Path, b: &Path) -> std::io::Result<bool> {
    if !b.exists() {
        return Ok(false);
    }
    Ok(a.canonicalize()? == b.canonicalize()?)
}
