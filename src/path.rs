//! Path argument handling.
//!
//! Every operation accepts either a single path (string or `Path`) or an
//! ordered sequence of segments; both forms resolve to the same joined path.

use std::path::{Path, PathBuf};

/// A path argument: a single path or a sequence of segments to join.
///
/// Implemented for `&str`, `String`, `&Path`, `PathBuf`, and for slices,
/// arrays and `Vec`s of string-like segments. Segment sequences are joined
/// left to right, so `["a", "b", "c"]` is equivalent to `"a/b/c"`.
pub trait PathArg {
    /// Convert into a relative (or absolute) path, before root resolution.
    fn into_path(self) -> PathBuf;
}

impl PathArg for &str {
    fn into_path(self) -> PathBuf {
        PathBuf::from(self)
    }
}

impl PathArg for String {
    fn into_path(self) -> PathBuf {
        PathBuf::from(self)
    }
}

impl PathArg for &String {
    fn into_path(self) -> PathBuf {
        PathBuf::from(self)
    }
}

impl PathArg for &Path {
    fn into_path(self) -> PathBuf {
        self.to_path_buf()
    }
}

impl PathArg for PathBuf {
    fn into_path(self) -> PathBuf {
        self
    }
}

impl PathArg for &PathBuf {
    fn into_path(self) -> PathBuf {
        self.clone()
    }
}

fn join_segments<S: AsRef<str>>(segments: &[S]) -> PathBuf {
    let mut path = PathBuf::new();
    for segment in segments {
        path.push(segment.as_ref());
    }
    path
}

impl<S: AsRef<str>> PathArg for &[S] {
    fn into_path(self) -> PathBuf {
        join_segments(self)
    }
}

impl<S: AsRef<str>, const N: usize> PathArg for [S; N] {
    fn into_path(self) -> PathBuf {
        join_segments(&self)
    }
}

impl<S: AsRef<str>, const N: usize> PathArg for &[S; N] {
    fn into_path(self) -> PathBuf {
        join_segments(self)
    }
}

impl<S: AsRef<str>> PathArg for Vec<S> {
    fn into_path(self) -> PathBuf {
        join_segments(&self)
    }
}
