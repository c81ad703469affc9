//! Change-notification watching.
//!
//! Both watch kinds are "arm once, fire once": the handle resolves with the
//! first detected change and nothing after it. To keep observing, re-arm by
//! calling the watch method again; changes that happen before re-arming are
//! lost. Each handle bundles the single-shot event future with an explicit
//! abort action ([`into_parts`](DirWatch::into_parts)); after an abort the
//! event future never resolves, so callers race it instead of awaiting it
//! unconditionally.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::oneshot;
use tracing::debug;

use crate::accessor::ScopedFs;
use crate::error::{Error, Result};
use crate::path::PathArg;

/// Options for [`ScopedFs::watch_dir`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DirWatchOptions {
    /// Watch the whole subtree instead of the immediate directory.
    pub recursive: bool,
}

/// Coarse category of the first observed directory change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirEventKind {
    Create,
    Modify,
    Remove,
    Other,
}

impl From<&notify::EventKind> for DirEventKind {
    fn from(kind: &notify::EventKind) -> Self {
        match kind {
            notify::EventKind::Create(_) => DirEventKind::Create,
            notify::EventKind::Modify(_) => DirEventKind::Modify,
            notify::EventKind::Remove(_) => DirEventKind::Remove,
            _ => DirEventKind::Other,
        }
    }
}

/// The first change observed by a directory watch.
#[derive(Debug, Clone)]
pub struct DirEvent {
    pub kind: DirEventKind,
    /// Path the OS reported for the change, when it reported one.
    pub path: Option<PathBuf>,
}

/// Abort action for a directory watch. Dropping it (or calling
/// [`abort`](Self::abort)) releases the underlying OS watch handle.
pub struct DirWatchGuard {
    _watcher: RecommendedWatcher,
}

impl DirWatchGuard {
    /// Release the OS watch handle. The matching event future stays pending
    /// forever; no further notifications are delivered.
    pub fn abort(self) {}
}

/// A single-shot directory watch.
///
/// Resolves exactly once with the first change event, or never if aborted
/// first. The OS watch handle lives in the guard half; an un-aborted watch
/// keeps it for the life of the process.
pub struct DirWatch {
    rx: oneshot::Receiver<DirEvent>,
    guard: DirWatchGuard,
}

impl DirWatch {
    fn register(path: &Path, options: &DirWatchOptions) -> Result<Self> {
        let (tx, rx) = oneshot::channel();
        let mut slot = Some(tx);
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let Ok(event) = res else { return };
            // first event wins; everything after the send is ignored
            if let Some(tx) = slot.take() {
                let _ = tx.send(DirEvent {
                    kind: DirEventKind::from(&event.kind),
                    path: event.paths.first().cloned(),
                });
            }
        })
        .map_err(|e| Error::Watch {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mode = if options.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher.watch(path, mode).map_err(|e| Error::Watch {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(path = %path.display(), recursive = options.recursive, "directory watch armed");

        Ok(Self {
            rx,
            guard: DirWatchGuard { _watcher: watcher },
        })
    }

    /// Split into the event future and the abort guard, to race one against
    /// the other. The guard must be kept alive while awaiting the future;
    /// dropping it aborts the watch and the future pends forever.
    pub fn into_parts(self) -> (impl Future<Output = DirEvent>, DirWatchGuard) {
        let rx = self.rx;
        let event = async move {
            match rx.await {
                Ok(event) => event,
                Err(_) => std::future::pending().await,
            }
        };
        (event, self.guard)
    }

    /// Wait for the first change event.
    pub async fn event(self) -> DirEvent {
        let (event, _guard) = self.into_parts();
        event.await
    }
}

/// Options for [`ScopedFs::watch_file`].
#[derive(Debug, Clone, Copy)]
pub struct FileWatchOptions {
    /// Polling interval between stat snapshots.
    pub interval: Duration,
}

impl Default for FileWatchOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5007),
        }
    }
}

/// Stat snapshot used for file-change polling. A missing or inaccessible
/// file snapshots as the zero value, so appearance and disappearance both
/// register as changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileStat {
    pub len: u64,
    pub modified: Option<SystemTime>,
}

async fn snapshot(path: &Path) -> FileStat {
    match tokio::fs::metadata(path).await {
        Ok(meta) => FileStat {
            len: meta.len(),
            modified: meta.modified().ok(),
        },
        Err(_) => FileStat::default(),
    }
}

/// Abort action for a file watch.
pub struct FileWatchAbort {
    stop: oneshot::Sender<()>,
    done: oneshot::Receiver<()>,
}

impl FileWatchAbort {
    /// Stop the poll task. Resolves once the task has acknowledged the
    /// unregistration (or has already finished).
    pub async fn abort(self) {
        let _ = self.stop.send(());
        let _ = self.done.await;
    }
}

/// A single-shot polling file watch.
///
/// Resolves exactly once with the `(current, previous)` stat pair of the
/// first detected change.
pub struct FileWatch {
    rx: oneshot::Receiver<(FileStat, FileStat)>,
    abort: FileWatchAbort,
}

impl FileWatch {
    async fn register(path: PathBuf, options: &FileWatchOptions) -> Self {
        let (event_tx, rx) = oneshot::channel();
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let (done_tx, done_rx) = oneshot::channel();
        let interval = options.interval;

        let mut previous = snapshot(&path).await;
        debug!(path = %path.display(), interval_ms = interval.as_millis() as u64, "file watch armed");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // consume the immediate first tick so comparisons start one
            // interval after arming
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        let current = snapshot(&path).await;
                        if current != previous {
                            let _ = event_tx.send((current, previous));
                            break;
                        }
                        previous = current;
                    }
                }
            }
            let _ = done_tx.send(());
        });

        Self {
            rx,
            abort: FileWatchAbort {
                stop: stop_tx,
                done: done_rx,
            },
        }
    }

    /// Split into the change future and the abort action.
    pub fn into_parts(self) -> (impl Future<Output = (FileStat, FileStat)>, FileWatchAbort) {
        let rx = self.rx;
        let change = async move {
            match rx.await {
                Ok(pair) => pair,
                Err(_) => std::future::pending().await,
            }
        };
        (change, self.abort)
    }

    /// Wait for the first `(current, previous)` stat change.
    pub async fn change(self) -> (FileStat, FileStat) {
        let (change, _abort) = self.into_parts();
        change.await
    }
}

impl ScopedFs {
    /// Arm a single-shot directory watch.
    ///
    /// Fails when the OS watch cannot be registered (for example when the
    /// directory does not exist).
    pub fn watch_dir(&self, path: impl PathArg, options: &DirWatchOptions) -> Result<DirWatch> {
        let resolved = self.resolve(path);
        DirWatch::register(&resolved, options)
    }

    /// Arm a single-shot polling file watch. Registration itself cannot
    /// fail; a missing file snapshots as the zero stat and its appearance
    /// counts as the first change.
    pub async fn watch_file(&self, path: impl PathArg, options: &FileWatchOptions) -> FileWatch {
        let resolved = self.resolve(path);
        FileWatch::register(resolved, options).await
    }
}
