use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use crate::{
    INDEX_DIR_NAME, INDEX_FILE_NAME,
    engine::IndexerConfig,
    error::{IndexerError, Result},
};

/// Upper bound for `--max-file-size`.
const MAX_FILE_SIZE_LIMIT: u64 = 256 * 1024 * 1024;

/// Output format for search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Plain,
    Json,
}

/// CLI arguments for the indexer.
#[derive(Parser, Debug)]
#[command(
    name = "locseng",
    version = env!("CARGO_PKG_VERSION"),
    about = "Local full-text search over text, Markdown and HTML files",
    long_about = concat!("Local full-text search over text, Markdown and HTML files

Watches directories, keeps an incremental tf-idf index of every .txt, .md and
.html file below them and ranks files against free-text queries.

Version: ", env!("CARGO_PKG_VERSION"), "

SUBCOMMANDS:
  add        Index a directory and start watching it
  remove     Drop a directory from the index
  list       Print watched directories
  refresh    Re-index every watched directory
  query      Rank indexed files (default when a query is provided)

EXIT CODES:
  0   Success
  1   Internal error
  2   Corrupted or incompatible index
  3   I/O error (missing directory, unreadable index)
  4   Invalid configuration")
)]
pub struct Cli {
    /// Search query (triggers query mode if provided)
    #[arg(index = 1)]
    pub query: Vec<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Suppress status messages (for CI/scripting)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Index file location
    #[arg(long, global = true, env = crate::INDEX_PATH_ENV)]
    pub index_path: Option<PathBuf>,

    /// Follow symlinks while indexing (disabled by default for safety)
    #[arg(long, global = true)]
    pub follow_symlinks: bool,

    /// Skip files larger than this many bytes
    #[arg(long, global = true, default_value = "1048576", value_parser = validate_max_file_size)]
    pub max_file_size: u64,
}

/// Subcommands for locseng.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Index a directory and start watching it.
    Add {
        /// Directory to index
        path: PathBuf,
    },
    /// Remove a directory's files from the index and stop watching it.
    Remove {
        /// Directory to remove
        path: PathBuf,
    },
    /// Print watched directories.
    List,
    /// Re-index every watched directory.
    Refresh,
    /// Rank indexed files against a query (the default when a query is provided).
    Query {
        /// Search query
        #[arg(index = 1)]
        query: Vec<String>,
        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// Maximum number of results to print
        #[arg(long, short = 'n', default_value_t = 20)]
        limit: usize,
    },
}

/// Validates `max_file_size`: between 1 byte and 256MB.
fn validate_max_file_size(s: &str) -> std::result::Result<u64, String> {
    let val: u64 = s.parse().map_err(|_| "invalid integer".to_string())?;

    if val == 0 {
        return Err("must be > 0".to_string());
    }

    if val > MAX_FILE_SIZE_LIMIT {
        return Err(format!("must be <= {MAX_FILE_SIZE_LIMIT} (256MB)"));
    }

    Ok(val)
}

impl Cli {
    /// Get the resolved index file path.
    ///
    /// Resolution order:
    /// 1. `--index-path` / `LOCSENG_INDEX_PATH` (with `~` expansion)
    /// 2. `<platform data dir>/locseng/index.json`
    /// 3. `./index.json` when no data directory is known
    ///
    /// # Errors
    /// Returns `IndexerError::ConfigInvalid` if `~` expansion fails because
    /// the home directory cannot be determined.
    pub fn index_path(&self) -> Result<PathBuf> {
        match &self.index_path {
            Some(path) => Self::expand_tilde(path),
            None => Ok(dirs::data_local_dir().map_or_else(
                || PathBuf::from(INDEX_FILE_NAME),
                |dir| dir.join(INDEX_DIR_NAME).join(INDEX_FILE_NAME),
            )),
        }
    }

    /// Expand tilde (`~`) to home directory in path.
    fn expand_tilde(path: &Path) -> Result<PathBuf> {
        if let Some(stripped) = path.to_str().and_then(|s| s.strip_prefix('~')) {
            let home = dirs::home_dir().ok_or_else(|| IndexerError::ConfigInvalid {
                field: "index_path".to_string(),
                value: path.to_string_lossy().to_string(),
                reason: "Could not determine home directory".to_string(),
            })?;
            if stripped.is_empty() {
                return Ok(home);
            }
            if stripped.starts_with('/') || stripped.starts_with('\\') {
                return Ok(home.join(&stripped[1..]));
            }
        }
        Ok(path.to_path_buf())
    }

    /// Indexer configuration from global flags.
    #[must_use]
    pub const fn indexer_config(&self) -> IndexerConfig {
        IndexerConfig { max_file_size: self.max_file_size, follow_symlinks: self.follow_symlinks }
    }

    /// Get the top-level search query as a single string.
    #[must_use]
    pub fn query_string(&self) -> Option<String> {
        if self.query.iter().all(|part| part.trim().is_empty()) {
            None
        } else {
            Some(self.query.join(" "))
        }
    }
}
