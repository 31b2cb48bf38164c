//! Index persistence.
//!
//! The engine only talks to [`IndexPersistence`]; [`JsonFileStore`] writes the
//! whole store as a versioned JSON document, replacing the previous file
//! atomically.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{IndexerError, Result};
use crate::index::IndexStore;
use crate::{INDEX_FORMAT_VERSION, INDEX_TMP_SUFFIX};
#[cfg(windows)]
use std::os::windows::ffi::OsStrExt;

/// Load/save hooks for the index store.
pub trait IndexPersistence {
    /// Load the persisted store, `None` when nothing has been saved yet.
    ///
    /// # Errors
    /// Returns an error if persisted state exists but cannot be read.
    fn load(&self) -> Result<Option<IndexStore>>;

    /// Persist the full store.
    ///
    /// # Errors
    /// Returns an error if the store cannot be written.
    fn save(&self, index: &IndexStore) -> Result<()>;
}

/// On-disk envelope.
#[derive(Serialize)]
struct PersistedIndexRef<'a> {
    version: u32,
    index: &'a IndexStore,
}

#[derive(Deserialize)]
struct PersistedIndex {
    version: u32,
    index: IndexStore,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

/// JSON file persistence.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the index file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(INDEX_TMP_SUFFIX);
        self.path.with_file_name(name)
    }

    fn display_path(&self) -> Cow<'_, str> {
        self.path.to_string_lossy()
    }
}

impl IndexPersistence for JsonFileStore {
    fn load(&self) -> Result<Option<IndexStore>> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No index file, starting empty");
                return Ok(None);
            }
            Err(e) => return Err(IndexerError::Io { source: e }),
        };

        let corrupted =
            |source| IndexerError::IndexCorrupted { path: self.display_path().to_string(), source };

        let probe: VersionProbe = serde_json::from_str(&json).map_err(corrupted)?;
        if probe.version != INDEX_FORMAT_VERSION {
            return Err(IndexerError::IncompatibleIndex {
                version: probe.version,
                expected: INDEX_FORMAT_VERSION,
            });
        }

        let persisted: PersistedIndex = serde_json::from_str(&json).map_err(corrupted)?;
        tracing::info!(
            path = %self.path.display(),
            documents = persisted.index.document_count(),
            "Loaded index"
        );
        Ok(Some(persisted.index))
    }

    fn save(&self, index: &IndexStore) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.tmp_path();
        let envelope = PersistedIndexRef { version: INDEX_FORMAT_VERSION, index };

        let write_tmp = || -> Result<()> {
            let mut writer = io::BufWriter::new(fs::File::create(&tmp_path)?);
            serde_json::to_writer(&mut writer, &envelope)?;
            writer.flush()?;
            // Data must reach disk before the rename makes it visible.
            writer.get_ref().sync_all()?;
            Ok(())
        };

        if let Err(e) = write_tmp() {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        atomic_replace(&tmp_path, &self.path)?;
        sync_parent_dir(&self.path)?;

        tracing::info!(
            path = %self.path.display(),
            documents = index.document_count(),
            "Index saved"
        );
        Ok(())
    }
}

#[cfg(windows)]
fn atomic_replace(from: &Path, to: &Path) -> Result<()> {
    use windows_sys::Win32::Storage::FileSystem::{
        MOVEFILE_REPLACE_EXISTING, MOVEFILE_WRITE_THROUGH, MoveFileExW,
    };

    let from_wide: Vec<u16> = from.as_os_str().encode_wide().chain(Some(0)).collect();
    let to_wide: Vec<u16> = to.as_os_str().encode_wide().chain(Some(0)).collect();

    let result = unsafe {
        MoveFileExW(
            from_wide.as_ptr(),
            to_wide.as_ptr(),
            MOVEFILE_REPLACE_EXISTING | MOVEFILE_WRITE_THROUGH,
        )
    };

    if result == 0 {
        return Err(IndexerError::Io { source: io::Error::last_os_error() });
    }

    Ok(())
}

#[cfg(not(windows))]
fn atomic_replace(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to).map_err(|e| IndexerError::Io { source: e })
}

/// Make a completed rename durable on filesystems that need a directory fsync.
fn sync_parent_dir(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        match path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => fs::File::open(parent)?.sync_all(),
            None => fs::File::open(".")?.sync_all(),
        }
    }

    // MOVEFILE_WRITE_THROUGH already flushed the rename.
    #[cfg(not(unix))]
    {
        let _ = path;
        Ok(())
    }
}
