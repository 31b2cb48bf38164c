use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{IndexerError, Result};
use crate::extract::{content_kind, extract};
use crate::index::{IndexStore, SearchHit};
use crate::persist::IndexPersistence;
use crate::walker::enumerate_files;

/// Configuration for the indexer.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// Maximum file size to index (in bytes)
    pub max_file_size: u64,
    /// Follow symlinks (disabled by default)
    pub follow_symlinks: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            max_file_size: 1024 * 1024, // 1MB
            follow_symlinks: false,
        }
    }
}

/// Statistics from a directory operation.
#[derive(Debug, Default, Clone)]
pub struct DirectoryStats {
    /// Files (re)indexed
    pub files_indexed: u64,
    /// Supported files already up to date
    pub files_unchanged: u64,
    /// Files or subtrees that could not be read
    pub files_skipped: u64,
    /// Documents dropped from the index
    pub files_removed: u64,
    pub duration: Duration,
}

impl DirectoryStats {
    fn merge(&mut self, other: &Self) {
        self.files_indexed += other.files_indexed;
        self.files_unchanged += other.files_unchanged;
        self.files_skipped += other.files_skipped;
        self.files_removed += other.files_removed;
    }
}

/// Indexing engine.
///
/// Owns the only [`IndexStore`] of the process. Every mutating operation
/// takes `&mut self` and persists the full store before returning, so an
/// interrupted call loses only its own effect.
pub struct Engine<P: IndexPersistence> {
    index: IndexStore,
    persistence: P,
    config: IndexerConfig,
}

impl<P: IndexPersistence> Engine<P> {
    /// Load the persisted index, or start empty if none exists.
    ///
    /// # Errors
    /// Returns `IndexerError` if persisted state exists but is unreadable,
    /// corrupted or written by an incompatible version.
    pub fn open(persistence: P, config: IndexerConfig) -> Result<Self> {
        let index = persistence.load()?.unwrap_or_default();
        Ok(Self { index, persistence, config })
    }

    /// Index every supported file below `path` and start watching it.
    ///
    /// Files whose stored timestamp is not older than the file on disk are
    /// left untouched. Indexed documents below `path` whose files are gone
    /// are pruned.
    ///
    /// # Errors
    /// Returns `IndexerError` if:
    /// - `path` is not an existing directory (`DirectoryNotFound`)
    /// - The index cannot be saved
    ///
    /// Single-file read failures are logged and counted as skipped.
    pub fn add_directory(&mut self, path: &Path) -> Result<DirectoryStats> {
        let start = Instant::now();
        let root = Self::resolve_directory(path)?;
        tracing::info!(path = %root.display(), "Adding directory to index");

        let mut stats = DirectoryStats::default();
        self.index_tree(&root, &mut stats)?;

        self.index.add_watched_directory(&root.to_string_lossy());
        self.persistence.save(&self.index)?;

        stats.duration = start.elapsed();
        Ok(stats)
    }

    /// Drop every supported file below `path` from the index and stop
    /// watching it.
    ///
    /// # Errors
    /// Returns `IndexerError` if `path` is not an existing directory or the
    /// index cannot be saved.
    pub fn remove_directory(&mut self, path: &Path) -> Result<DirectoryStats> {
        let start = Instant::now();
        let root = Self::resolve_directory(path)?;
        tracing::info!(path = %root.display(), "Removing directory from index");

        let mut stats = DirectoryStats::default();
        let mut walk = enumerate_files(&root, self.config.follow_symlinks)?;
        for entry in walk.by_ref() {
            if content_kind(&entry.path).is_none() {
                continue;
            }
            // Non-UTF-8 paths are never indexed.
            let Some(key) = entry.path.to_str() else {
                continue;
            };
            if self.index.remove_document(key) {
                tracing::debug!(path = key, "Removed from index");
                stats.files_removed += 1;
            }
        }
        stats.files_skipped += walk.skipped();
        stats.files_removed += self.prune_missing(&root);

        self.index.remove_watched_directory(&root.to_string_lossy());
        self.persistence.save(&self.index)?;

        stats.duration = start.elapsed();
        Ok(stats)
    }

    /// Re-index every watched directory.
    ///
    /// Watched directories that no longer exist are logged and kept.
    ///
    /// # Errors
    /// Returns `IndexerError` if the index cannot be saved.
    pub fn refresh(&mut self) -> Result<DirectoryStats> {
        let start = Instant::now();
        let mut stats = DirectoryStats::default();

        let directories: Vec<PathBuf> =
            self.index.watched_directories().map(PathBuf::from).collect();
        for directory in directories {
            if !directory.is_dir() {
                tracing::warn!(path = %directory.display(), "Watched directory is missing");
                continue;
            }
            let mut directory_stats = DirectoryStats::default();
            self.index_tree(&directory, &mut directory_stats)?;
            stats.merge(&directory_stats);
        }

        self.persistence.save(&self.index)?;
        stats.duration = start.elapsed();
        Ok(stats)
    }

    /// Rank indexed documents against `text`.
    #[must_use]
    pub fn query(&self, text: &str) -> Vec<SearchHit> {
        tracing::info!(query = text, "Query");
        self.index.search(text)
    }

    /// Watched directories in path order.
    #[must_use]
    pub fn directories(&self) -> Vec<String> {
        self.index.watched_directories().map(str::to_string).collect()
    }

    /// Get the index.
    pub const fn index(&self) -> &IndexStore {
        &self.index
    }

    /// Get the persistence backend.
    pub const fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Walk `root` and bring the index up to date with it, without saving.
    fn index_tree(&mut self, root: &Path, stats: &mut DirectoryStats) -> Result<()> {
        let mut walk = enumerate_files(root, self.config.follow_symlinks)?;

        for entry in walk.by_ref() {
            let path = &entry.path;
            if content_kind(path).is_none() {
                tracing::debug!(path = %path.display(), "Unsupported extension, skipping");
                continue;
            }

            let Some(key) = path.to_str() else {
                tracing::warn!(path = %path.display(), "Path is not valid UTF-8, skipping");
                stats.files_skipped += 1;
                continue;
            };
            if !self.index.requires_reindexing(key, entry.last_modified) {
                tracing::debug!(path = %key, "File does not require indexing");
                stats.files_unchanged += 1;
                continue;
            }

            match extract(path, self.config.max_file_size) {
                Ok(content) => {
                    tracing::info!(
                        path = %key,
                        last_modified = %entry.last_modified,
                        "Indexing file"
                    );
                    self.index.add_document(key, entry.last_modified, &content);
                    stats.files_indexed += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        path = %key,
                        error = %e,
                        "Failed to read file content"
                    );
                    stats.files_skipped += 1;
                }
            }
        }

        stats.files_skipped += walk.skipped();
        stats.files_removed += self.prune_missing(root);

        tracing::info!(
            path = %root.display(),
            indexed = stats.files_indexed,
            unchanged = stats.files_unchanged,
            skipped = stats.files_skipped,
            removed = stats.files_removed,
            "Directory indexed"
        );
        Ok(())
    }

    /// Remove indexed documents below `root` whose files no longer exist.
    fn prune_missing(&mut self, root: &Path) -> u64 {
        let mut pruned = 0;
        for path in self.index.documents_under(root) {
            if !Path::new(&path).exists() && self.index.remove_document(&path) {
                tracing::debug!(path = %path, "Pruned missing file");
                pruned += 1;
            }
        }
        if pruned > 0 {
            tracing::info!(pruned, "Pruned missing files");
        }
        pruned
    }

    /// Canonicalize a caller-supplied directory.
    ///
    /// Index keys are UTF-8 strings, so a root that is not valid UTF-8 is
    /// rejected with `IndexerError::ConfigInvalid`.
    fn resolve_directory(path: &Path) -> Result<PathBuf> {
        match path.canonicalize() {
            Ok(resolved) if resolved.is_dir() && resolved.to_str().is_none() => {
                tracing::warn!(path = %resolved.display(), "Directory path is not valid UTF-8");
                Err(IndexerError::ConfigInvalid {
                    field: "path".to_string(),
                    value: resolved.to_string_lossy().to_string(),
                    reason: "path is not valid UTF-8".to_string(),
                })
            }
            Ok(resolved) if resolved.is_dir() => Ok(resolved),
            _ => {
                tracing::warn!(path = %path.display(), "Directory does not exist");
                Err(IndexerError::DirectoryNotFound { path: path.to_string_lossy().to_string() })
            }
        }
    }
}
