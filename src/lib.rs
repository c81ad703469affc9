//! scopedfs - path-scoped filesystem access with async and blocking twins
//!
//! This library wraps the OS filesystem, change-notification and subprocess
//! primitives behind one ergonomic surface, [`ScopedFs`], optionally rooted
//! at a base path. Every relative path argument is resolved against the root
//! before the underlying OS call; paths can be given as a single string or
//! as a sequence of segments.
//!
//! # Core Concepts
//!
//! - **One-shot wrappers**: each operation performs exactly one OS call and
//!   translates the outcome into a typed result or [`Error`]. Existence
//!   checks and `stat_sync` instead collapse any OS error to `false`/`None`.
//! - **Sync twins**: every async operation has a blocking `_sync`
//!   counterpart with identical resolution logic.
//! - **Single-shot watches**: [`DirWatch`] and [`FileWatch`] resolve with
//!   the first detected change and pair the event future with an explicit
//!   abort action; re-arm to keep observing.
//!
//! # Example
//!
//! ```no_run
//! use scopedfs::{ListOptions, ScopedFs};
//!
//! # async fn demo() -> scopedfs::Result<()> {
//! let fs = ScopedFs::new("/srv/data");
//! fs.mkdir(["reports", "2026"]).await?;
//! fs.write_json("reports/index.json", &serde_json::json!({"count": 0})).await?;
//!
//! let entries = fs
//!     .list_dir("reports", &ListOptions::default().accept_extensions(["json"]).recursive_levels(2))
//!     .await?;
//! for entry in entries {
//!     println!("{}", entry.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod accessor;
pub mod error;
pub mod list;
pub mod path;
pub mod proc;
pub mod util;
pub mod watch;

pub use accessor::{ScopedFs, WriteOptions};
pub use error::{Error, Result};
pub use list::{DirEntry, EntryKind, ListOptions};
pub use path::PathArg;
pub use watch::{
    DirEvent, DirEventKind, DirWatch, DirWatchGuard, DirWatchOptions, FileStat, FileWatch,
    FileWatchAbort, FileWatchOptions,
};
