//! Directory listing with extension filtering and bounded recursion.
//!
//! Listing returns entries in the order the OS yields them. The extension
//! filter is applied per level (directories are exempt so recursion can
//! descend into them); when recursion is active each directory entry is
//! replaced in place by its children, with the child names rewritten to
//! include the parent directory name. The `only_files` / `only_dirs` filters
//! run last, over the fully flattened list.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tracing::debug;

use crate::accessor::ScopedFs;
use crate::error::{Error, Result};
use crate::path::PathArg;

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Anything that is neither a regular file nor a directory (symlinks,
    /// sockets, devices).
    Other,
}

/// A single listing result: entry name and kind.
///
/// For recursive listings the name carries the relative sub-path from the
/// listing root, e.g. `sub/c.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Options controlling [`ScopedFs::list_dir`].
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// When set, files whose extension is not in the list are excluded.
    /// Directories always pass this filter. Extensions may be given with or
    /// without a leading dot.
    pub accept_extensions: Option<Vec<String>>,
    /// Remaining directory levels to descend into. 0 means no recursion.
    pub recursive_levels: u32,
    /// Exclude directory entries from the final result.
    pub only_files: bool,
    /// Exclude file entries from the final result.
    pub only_dirs: bool,
}

impl ListOptions {
    pub fn accept_extensions<S: Into<String>>(
        mut self,
        extensions: impl IntoIterator<Item = S>,
    ) -> Self {
        self.accept_extensions = Some(extensions.into_iter().map(Into::into).collect());
        self
    }

    pub fn recursive_levels(mut self, levels: u32) -> Self {
        self.recursive_levels = levels;
        self
    }

    pub fn only_files(mut self) -> Self {
        self.only_files = true;
        self
    }

    pub fn only_dirs(mut self) -> Self {
        self.only_dirs = true;
        self
    }
}

fn kind_of(file_type: std::fs::FileType) -> EntryKind {
    if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    }
}

fn extension_accepted(name: &str, accepted: &[String]) -> bool {
    match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some(ext) => accepted.iter().any(|a| a.trim_start_matches('.') == ext),
        None => false,
    }
}

/// Keep an entry at listing time: directories always pass the extension
/// filter so they stay descendable; everything else must match.
fn passes_extension_filter(entry: &DirEntry, accepted: Option<&[String]>) -> bool {
    match accepted {
        Some(list) if entry.kind != EntryKind::Directory => extension_accepted(&entry.name, list),
        _ => true,
    }
}

fn prefix_name(parent: &str, child: &str) -> String {
    Path::new(parent).join(child).to_string_lossy().into_owned()
}

fn apply_kind_filter(entries: Vec<DirEntry>, options: &ListOptions) -> Vec<DirEntry> {
    entries
        .into_iter()
        .filter(|entry| {
            if options.only_files && entry.kind == EntryKind::Directory {
                return false;
            }
            if options.only_dirs && entry.kind == EntryKind::File {
                return false;
            }
            true
        })
        .collect()
}

/// One OS listing call, entries in OS order.
async fn read_level(dir: &Path) -> Result<Vec<DirEntry>> {
    let mut reader = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| Error::io(dir, e))?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await.map_err(|e| Error::io(dir, e))? {
        let file_type = entry.file_type().await.map_err(|e| Error::io(dir, e))?;
        entries.push(DirEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            kind: kind_of(file_type),
        });
    }
    Ok(entries)
}

fn read_level_sync(dir: &Path) -> Result<Vec<DirEntry>> {
    let reader = std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    let mut entries = Vec::new();
    for entry in reader {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| Error::io(dir, e))?;
        entries.push(DirEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            kind: kind_of(file_type),
        });
    }
    Ok(entries)
}

/// Recursive expansion: directories are replaced by their (rewritten)
/// children while `levels > 0`. Descends one directory at a time.
fn expand<'a>(
    dir: PathBuf,
    accepted: Option<&'a [String]>,
    levels: u32,
) -> Pin<Box<dyn Future<Output = Result<Vec<DirEntry>>> + Send + 'a>> {
    Box::pin(async move {
        let mut out = Vec::new();
        for entry in read_level(&dir).await? {
            if !passes_extension_filter(&entry, accepted) {
                continue;
            }
            if entry.kind == EntryKind::Directory && levels > 0 {
                let children = expand(dir.join(&entry.name), accepted, levels - 1).await?;
                for child in children {
                    out.push(DirEntry {
                        name: prefix_name(&entry.name, &child.name),
                        kind: child.kind,
                    });
                }
            } else {
                out.push(entry);
            }
        }
        Ok(out)
    })
}

fn expand_sync(dir: &Path, accepted: Option<&[String]>, levels: u32) -> Result<Vec<DirEntry>> {
    let mut out = Vec::new();
    for entry in read_level_sync(dir)? {
        if !passes_extension_filter(&entry, accepted) {
            continue;
        }
        if entry.kind == EntryKind::Directory && levels > 0 {
            let children = expand_sync(&dir.join(&entry.name), accepted, levels - 1)?;
            for child in children {
                out.push(DirEntry {
                    name: prefix_name(&entry.name, &child.name),
                    kind: child.kind,
                });
            }
        } else {
            out.push(entry);
        }
    }
    Ok(out)
}

impl ScopedFs {
    /// List the entries under `path`, optionally filtered and expanded.
    ///
    /// Any OS error while listing the root or a descendant aborts the whole
    /// call; there are no partial results.
    pub async fn list_dir(&self, path: impl PathArg, options: &ListOptions) -> Result<Vec<DirEntry>> {
        let resolved = self.resolve(path);
        debug!(path = %resolved.display(), levels = options.recursive_levels, "listing directory");
        let entries = expand(
            resolved,
            options.accept_extensions.as_deref(),
            options.recursive_levels,
        )
        .await?;
        Ok(apply_kind_filter(entries, options))
    }

    /// Blocking twin of [`list_dir`](Self::list_dir).
    pub fn list_dir_sync(&self, path: impl PathArg, options: &ListOptions) -> Result<Vec<DirEntry>> {
        let resolved = self.resolve(path);
        let entries = expand_sync(
            &resolved,
            options.accept_extensions.as_deref(),
            options.recursive_levels,
        )?;
        Ok(apply_kind_filter(entries, options))
    }
}
