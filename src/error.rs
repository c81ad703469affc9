//! Error types for filesystem, watch and subprocess operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by [`ScopedFs`](crate::ScopedFs) operations.
///
/// OS failures are propagated verbatim as the `source`, with the resolved
/// path (or command) attached for context. Existence checks and `stat_sync`
/// never return these; any OS error there collapses to `false` / `None`.
#[derive(Debug, Error)]
pub enum Error {
    /// An OS filesystem call failed.
    #[error("io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Structured read found malformed JSON, or a value failed to serialize.
    #[error("json error at {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A subprocess could not be spawned or its output could not be collected.
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Registering an OS change watch failed.
    #[error("failed to watch {}: {source}", .path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.into(),
            source,
        }
    }

    /// The underlying `std::io::ErrorKind`, when this error wraps an OS call.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            Error::Io { source, .. } | Error::Spawn { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}
