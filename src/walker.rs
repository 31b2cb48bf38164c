//! Fault-tolerant recursive file enumeration.
//!
//! Walks every file below a root without filtering. Subtrees that cannot be
//! listed (permission denied, I/O errors) are logged and skipped so that one
//! unreadable directory never hides its siblings. Only a missing root is
//! reported to the caller.

use chrono::{DateTime, Utc};
use ignore::{Walk, WalkBuilder};
use std::path::{Path, PathBuf};

use crate::error::{IndexerError, Result};

/// A regular file found by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub last_modified: DateTime<Utc>,
}

/// Lazy depth-first file iterator.
///
/// Files of a directory come before its subdirectories; siblings are visited
/// in file-name order.
pub struct SafeWalk {
    inner: Walk,
    skipped: u64,
}

/// Start enumerating the files below `root`.
///
/// # Errors
/// Returns `IndexerError::DirectoryNotFound` if `root` is not an existing
/// directory. Errors below the root are never returned.
pub fn enumerate_files(root: &Path, follow_symlinks: bool) -> Result<SafeWalk> {
    if !root.is_dir() {
        return Err(IndexerError::DirectoryNotFound { path: root.to_string_lossy().to_string() });
    }

    let inner = WalkBuilder::new(root)
        .standard_filters(false) // No hidden/gitignore filtering at this layer
        .follow_links(follow_symlinks)
        .sort_by_file_path(move |a, b| {
            let is_dir = |p: &Path| {
                let metadata = if follow_symlinks { p.metadata() } else { p.symlink_metadata() };
                metadata.is_ok_and(|m| m.is_dir())
            };
            is_dir(a).cmp(&is_dir(b)).then_with(|| a.cmp(b))
        })
        .build();

    Ok(SafeWalk { inner, skipped: 0 })
}

impl SafeWalk {
    /// Number of entries or subtrees skipped because of errors so far.
    #[must_use]
    pub const fn skipped(&self) -> u64 {
        self.skipped
    }
}

impl Iterator for SafeWalk {
    type Item = FileEntry;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable path");
                    self.skipped += 1;
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let modified = entry.metadata().map_err(IndexerError::from).and_then(|metadata| {
                metadata.modified().map_err(|source| IndexerError::Io { source })
            });

            match modified {
                Ok(time) => {
                    return Some(FileEntry {
                        path: entry.into_path(),
                        last_modified: DateTime::<Utc>::from(time),
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        path = %entry.path().display(),
                        error = %e,
                        "Failed to read file metadata"
                    );
                    self.skipped += 1;
                }
            }
        }
    }
}
