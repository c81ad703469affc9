//! The path-scoped accessor and its one-shot operation wrappers.
//!
//! Every operation resolves its path argument against the optional root,
//! performs exactly one OS call and translates the outcome: success to a
//! typed value, failure to [`Error`] — except the existence checks and
//! `stat_sync`, where any OS error collapses to `false` / `None`.
//!
//! Each operation comes in an async form (via `tokio::fs`) and a blocking
//! `_sync` twin (via `std::fs`) with identical resolution logic.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{Error, Result};
use crate::path::PathArg;

/// Options for raw file writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Append to the file instead of truncating it. The file is created if
    /// it does not exist in either mode.
    pub append: bool,
}

impl WriteOptions {
    pub fn append() -> Self {
        Self { append: true }
    }
}

/// Filesystem accessor rooted at an optional base path.
///
/// All relative path arguments are joined onto the root; with no root they
/// are used as-is. The accessor is immutable and holds no other state, so
/// clones are cheap and every call is independent.
///
/// # Examples
///
/// ```no_run
/// use scopedfs::ScopedFs;
///
/// # async fn demo() -> scopedfs::Result<()> {
/// let fs = ScopedFs::new("/var/lib/myapp");
/// fs.mkdir(["cache", "v1"]).await?;
/// fs.write_file("cache/v1/state", b"ready").await?;
/// let state = fs.read_to_string(["cache", "v1", "state"]).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ScopedFs {
    root: Option<PathBuf>,
}

impl ScopedFs {
    /// Create an accessor rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Create an accessor with no root; paths are used as given.
    pub fn unrooted() -> Self {
        Self { root: None }
    }

    /// The configured root path, if any.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Resolve a path argument against the root.
    ///
    /// A single string and the equivalent segment sequence resolve to the
    /// same path.
    pub fn resolve(&self, path: impl PathArg) -> PathBuf {
        let path = path.into_path();
        match &self.root {
            Some(root) => root.join(path),
            None => path,
        }
    }

    // --- directories ---

    /// Create a directory and all missing parents.
    pub async fn mkdir(&self, path: impl PathArg) -> Result<()> {
        let resolved = self.resolve(path);
        debug!(path = %resolved.display(), "creating directory");
        tokio::fs::create_dir_all(&resolved)
            .await
            .map_err(|e| Error::io(resolved, e))
    }

    /// Blocking twin of [`mkdir`](Self::mkdir). Returns early when the path
    /// already exists.
    pub fn mkdir_sync(&self, path: impl PathArg) -> Result<()> {
        let resolved = self.resolve(path);
        if resolved.exists() {
            return Ok(());
        }
        std::fs::create_dir_all(&resolved).map_err(|e| Error::io(resolved, e))
    }

    /// Delete an empty directory. Returns `true` on success; any OS error
    /// (including "not empty") yields `false`, not an error.
    pub async fn remove_dir(&self, path: impl PathArg) -> bool {
        let resolved = self.resolve(path);
        match tokio::fs::remove_dir(&resolved).await {
            Ok(()) => true,
            Err(e) => {
                debug!(path = %resolved.display(), error = %e, "remove_dir failed");
                false
            }
        }
    }

    /// Blocking twin of [`remove_dir`](Self::remove_dir); unlike the async
    /// form this surfaces the OS error.
    pub fn remove_dir_sync(&self, path: impl PathArg) -> Result<()> {
        let resolved = self.resolve(path);
        std::fs::remove_dir(&resolved).map_err(|e| Error::io(resolved, e))
    }

    // --- raw reads and writes ---

    /// Write bytes to a file, truncating any existing content.
    pub async fn write_file(&self, path: impl PathArg, contents: impl AsRef<[u8]>) -> Result<()> {
        self.write_file_with(path, contents, &WriteOptions::default())
            .await
    }

    /// Write bytes with explicit options.
    pub async fn write_file_with(
        &self,
        path: impl PathArg,
        contents: impl AsRef<[u8]>,
        options: &WriteOptions,
    ) -> Result<()> {
        let resolved = self.resolve(path);
        debug!(path = %resolved.display(), append = options.append, "writing file");
        if options.append {
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&resolved)
                .await
                .map_err(|e| Error::io(&resolved, e))?;
            file.write_all(contents.as_ref())
                .await
                .map_err(|e| Error::io(&resolved, e))?;
            file.flush().await.map_err(|e| Error::io(resolved, e))
        } else {
            tokio::fs::write(&resolved, contents.as_ref())
                .await
                .map_err(|e| Error::io(resolved, e))
        }
    }

    /// Blocking twin of [`write_file`](Self::write_file).
    pub fn write_file_sync(&self, path: impl PathArg, contents: impl AsRef<[u8]>) -> Result<()> {
        self.write_file_with_sync(path, contents, &WriteOptions::default())
    }

    /// Blocking twin of [`write_file_with`](Self::write_file_with).
    pub fn write_file_with_sync(
        &self,
        path: impl PathArg,
        contents: impl AsRef<[u8]>,
        options: &WriteOptions,
    ) -> Result<()> {
        use std::io::Write;
        let resolved = self.resolve(path);
        if options.append {
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&resolved)
                .map_err(|e| Error::io(&resolved, e))?;
            file.write_all(contents.as_ref())
                .map_err(|e| Error::io(resolved, e))
        } else {
            std::fs::write(&resolved, contents.as_ref()).map_err(|e| Error::io(resolved, e))
        }
    }

    /// Read a whole file as raw bytes.
    pub async fn read_file(&self, path: impl PathArg) -> Result<Vec<u8>> {
        let resolved = self.resolve(path);
        tokio::fs::read(&resolved)
            .await
            .map_err(|e| Error::io(resolved, e))
    }

    /// Blocking twin of [`read_file`](Self::read_file).
    pub fn read_file_sync(&self, path: impl PathArg) -> Result<Vec<u8>> {
        let resolved = self.resolve(path);
        std::fs::read(&resolved).map_err(|e| Error::io(resolved, e))
    }

    /// Read a whole file decoded as UTF-8 text.
    pub async fn read_to_string(&self, path: impl PathArg) -> Result<String> {
        let resolved = self.resolve(path);
        tokio::fs::read_to_string(&resolved)
            .await
            .map_err(|e| Error::io(resolved, e))
    }

    /// Blocking twin of [`read_to_string`](Self::read_to_string).
    pub fn read_to_string_sync(&self, path: impl PathArg) -> Result<String> {
        let resolved = self.resolve(path);
        std::fs::read_to_string(&resolved).map_err(|e| Error::io(resolved, e))
    }

    // --- structured (JSON) reads and writes ---

    /// Serialize `value` as compact JSON and write it to a file.
    pub async fn write_json<T: Serialize + ?Sized>(
        &self,
        path: impl PathArg,
        value: &T,
    ) -> Result<()> {
        let resolved = self.resolve(path);
        let bytes = serde_json::to_vec(value).map_err(|e| Error::json(&resolved, e))?;
        debug!(path = %resolved.display(), len = bytes.len(), "writing json");
        tokio::fs::write(&resolved, bytes)
            .await
            .map_err(|e| Error::io(resolved, e))
    }

    /// Blocking twin of [`write_json`](Self::write_json).
    pub fn write_json_sync<T: Serialize + ?Sized>(
        &self,
        path: impl PathArg,
        value: &T,
    ) -> Result<()> {
        let resolved = self.resolve(path);
        let bytes = serde_json::to_vec(value).map_err(|e| Error::json(&resolved, e))?;
        std::fs::write(&resolved, bytes).map_err(|e| Error::io(resolved, e))
    }

    /// Read a file and parse it as JSON. Malformed content surfaces as
    /// [`Error::Json`], distinct from the I/O failure of the read itself.
    pub async fn read_json<T: DeserializeOwned>(&self, path: impl PathArg) -> Result<T> {
        let resolved = self.resolve(path);
        let bytes = tokio::fs::read(&resolved)
            .await
            .map_err(|e| Error::io(&resolved, e))?;
        serde_json::from_slice(&bytes).map_err(|e| Error::json(resolved, e))
    }

    /// Blocking twin of [`read_json`](Self::read_json).
    pub fn read_json_sync<T: DeserializeOwned>(&self, path: impl PathArg) -> Result<T> {
        let resolved = self.resolve(path);
        let bytes = std::fs::read(&resolved).map_err(|e| Error::io(&resolved, e))?;
        serde_json::from_slice(&bytes).map_err(|e| Error::json(resolved, e))
    }

    // --- existence and metadata ---

    /// Whether `path` exists and is a regular file. Never errors; any OS
    /// failure (missing, inaccessible) yields `false`.
    pub async fn file_exists(&self, path: impl PathArg) -> bool {
        let resolved = self.resolve(path);
        tokio::fs::metadata(&resolved)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    /// Blocking twin of [`file_exists`](Self::file_exists).
    pub fn file_exists_sync(&self, path: impl PathArg) -> bool {
        let resolved = self.resolve(path);
        std::fs::metadata(&resolved)
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    /// Whether `path` exists and is a directory. Same soft-false policy as
    /// [`file_exists`](Self::file_exists).
    pub async fn dir_exists(&self, path: impl PathArg) -> bool {
        let resolved = self.resolve(path);
        tokio::fs::metadata(&resolved)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    /// Blocking twin of [`dir_exists`](Self::dir_exists).
    pub fn dir_exists_sync(&self, path: impl PathArg) -> bool {
        let resolved = self.resolve(path);
        std::fs::metadata(&resolved)
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    /// Metadata for `path`, or `None` on any OS error.
    pub fn stat_sync(&self, path: impl PathArg) -> Option<std::fs::Metadata> {
        let resolved = self.resolve(path);
        std::fs::metadata(resolved).ok()
    }

    // --- files ---

    /// Delete a file.
    pub async fn remove_file(&self, path: impl PathArg) -> Result<()> {
        let resolved = self.resolve(path);
        debug!(path = %resolved.display(), "removing file");
        tokio::fs::remove_file(&resolved)
            .await
            .map_err(|e| Error::io(resolved, e))
    }

    /// Blocking twin of [`remove_file`](Self::remove_file).
    pub fn remove_file_sync(&self, path: impl PathArg) -> Result<()> {
        let resolved = self.resolve(path);
        std::fs::remove_file(&resolved).map_err(|e| Error::io(resolved, e))
    }

    /// Create `path` as an empty file if absent; existing content is left
    /// untouched. Delegates to an append-mode write of nothing.
    pub async fn touch(&self, path: impl PathArg) -> Result<()> {
        self.write_file_with(path, b"", &WriteOptions::append()).await
    }

    /// Touch with explicit options; `append: false` truncates instead.
    pub async fn touch_with(&self, path: impl PathArg, options: &WriteOptions) -> Result<()> {
        self.write_file_with(path, b"", options).await
    }

    /// Blocking twin of [`touch`](Self::touch).
    pub fn touch_sync(&self, path: impl PathArg) -> Result<()> {
        self.write_file_with_sync(path, b"", &WriteOptions::append())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, ScopedFs) {
        let dir = TempDir::new().expect("failed to create temp dir");
        let accessor = ScopedFs::new(dir.path());
        (dir, accessor)
    }

    #[test]
    fn test_resolve_string_and_segments_agree() {
        let accessor = ScopedFs::new("/base");
        assert_eq!(accessor.resolve("a/b/c"), accessor.resolve(["a", "b", "c"]));
    }

    #[test]
    fn test_resolve_unrooted_passthrough() {
        let accessor = ScopedFs::unrooted();
        assert_eq!(accessor.resolve("x/y"), PathBuf::from("x/y"));
    }

    #[tokio::test]
    async fn test_mkdir_is_idempotent() {
        let (dir, accessor) = setup();
        accessor.mkdir("a/b").await.unwrap();
        accessor.mkdir("a/b").await.unwrap();
        assert!(dir.path().join("a/b").is_dir());
    }

    #[test]
    fn test_mkdir_sync_short_circuits_on_existing() {
        let (dir, accessor) = setup();
        fs::create_dir(dir.path().join("here")).unwrap();
        accessor.mkdir_sync("here").unwrap();
        accessor.mkdir_sync(["nested", "deep"]).unwrap();
        assert!(dir.path().join("nested/deep").is_dir());
    }

    #[tokio::test]
    async fn test_write_then_read_roundtrip() {
        let (_dir, accessor) = setup();
        accessor.write_file("note.txt", "hello").await.unwrap();
        assert_eq!(accessor.read_to_string("note.txt").await.unwrap(), "hello");
        assert_eq!(accessor.read_file("note.txt").await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_append_write_preserves_content() {
        let (_dir, accessor) = setup();
        accessor.write_file("log", "one\n").await.unwrap();
        accessor
            .write_file_with("log", "two\n", &WriteOptions::append())
            .await
            .unwrap();
        assert_eq!(accessor.read_to_string("log").await.unwrap(), "one\ntwo\n");
    }

    #[tokio::test]
    async fn test_json_roundtrip() {
        let (_dir, accessor) = setup();
        let value = serde_json::json!({
            "name": "scoped",
            "count": 3,
            "tags": ["a", "b"],
            "nested": { "ok": true, "none": null }
        });
        accessor.write_json("data.json", &value).await.unwrap();
        let read_back: serde_json::Value = accessor.read_json("data.json").await.unwrap();
        assert_eq!(read_back, value);
    }

    #[test]
    fn test_json_written_compact() {
        let (dir, accessor) = setup();
        accessor
            .write_json_sync("c.json", &serde_json::json!({"a": 1}))
            .unwrap();
        let raw = fs::read_to_string(dir.path().join("c.json")).unwrap();
        assert_eq!(raw, r#"{"a":1}"#);
    }

    #[tokio::test]
    async fn test_read_json_malformed_is_json_error() {
        let (_dir, accessor) = setup();
        accessor.write_file("bad.json", "{nope").await.unwrap();
        let result: crate::Result<serde_json::Value> = accessor.read_json("bad.json").await;
        assert!(matches!(result, Err(Error::Json { .. })));
    }

    #[tokio::test]
    async fn test_read_json_missing_is_io_error() {
        let (_dir, accessor) = setup();
        let result: crate::Result<serde_json::Value> = accessor.read_json("absent.json").await;
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[tokio::test]
    async fn test_existence_checks_soft_false() {
        let (_dir, accessor) = setup();
        assert!(!accessor.file_exists("missing").await);
        assert!(!accessor.dir_exists("missing").await);
        assert!(!accessor.file_exists_sync("missing"));
        assert!(!accessor.dir_exists_sync("missing"));
    }

    #[tokio::test]
    async fn test_existence_checks_distinguish_kinds() {
        let (dir, accessor) = setup();
        fs::write(dir.path().join("f"), "").unwrap();
        fs::create_dir(dir.path().join("d")).unwrap();
        assert!(accessor.file_exists("f").await);
        assert!(!accessor.dir_exists("f").await);
        assert!(accessor.dir_exists("d").await);
        assert!(!accessor.file_exists("d").await);
    }

    #[test]
    fn test_stat_sync_none_on_missing() {
        let (dir, accessor) = setup();
        assert!(accessor.stat_sync("missing").is_none());
        fs::write(dir.path().join("real"), "xy").unwrap();
        let meta = accessor.stat_sync("real").unwrap();
        assert_eq!(meta.len(), 2);
    }

    #[tokio::test]
    async fn test_touch_creates_and_preserves() {
        let (dir, accessor) = setup();
        accessor.touch("fresh").await.unwrap();
        assert_eq!(fs::read(dir.path().join("fresh")).unwrap(), b"");

        fs::write(dir.path().join("existing"), "keep me").unwrap();
        accessor.touch("existing").await.unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("existing")).unwrap(), "keep me");
    }

    #[tokio::test]
    async fn test_remove_dir_nonempty_soft_fails() {
        let (dir, accessor) = setup();
        fs::create_dir(dir.path().join("full")).unwrap();
        fs::write(dir.path().join("full/file"), "").unwrap();

        assert!(!accessor.remove_dir("full").await);
        assert!(accessor.remove_dir_sync("full").is_err());
        assert!(dir.path().join("full").exists());
    }

    #[tokio::test]
    async fn test_remove_dir_empty_succeeds() {
        let (dir, accessor) = setup();
        fs::create_dir(dir.path().join("empty")).unwrap();
        assert!(accessor.remove_dir("empty").await);
        assert!(!dir.path().join("empty").exists());
    }

    #[tokio::test]
    async fn test_remove_file() {
        let (dir, accessor) = setup();
        fs::write(dir.path().join("gone"), "").unwrap();
        accessor.remove_file("gone").await.unwrap();
        assert!(!dir.path().join("gone").exists());
        assert!(matches!(
            accessor.remove_file("gone").await,
            Err(Error::Io { .. })
        ));
    }
}
