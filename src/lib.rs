//! locseng - local incremental full-text indexer with tf-idf ranking
//!
//! This library watches directories of text, Markdown and HTML files, keeps
//! per-document term statistics up to date and ranks documents against
//! free-text queries.
//!
//! # Example
//!
//! ```rust
//! use locseng::{Engine, IndexerConfig, JsonFileStore};
//! use std::time::{SystemTime, UNIX_EPOCH};
//!
//! let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
//! let root = std::env::temp_dir().join(format!("locseng-doctest-{unique}"));
//! std::fs::create_dir_all(root.join("docs"))?;
//! std::fs::write(root.join("docs/rust.txt"), "rust is fast, rust is safe")?;
//! std::fs::write(root.join("docs/garden.md"), "# Garden\n\nTomatoes need sun.")?;
//!
//! let store = JsonFileStore::new(root.join("index.json"));
//! let mut engine = Engine::open(store, IndexerConfig::default())?;
//! engine.add_directory(&root.join("docs"))?;
//!
//! let hits = engine.query("rust");
//! assert_eq!(hits.len(), 1);
//! assert!(hits[0].path.ends_with("rust.txt"));
//!
//! let _ = std::fs::remove_dir_all(&root);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Default index filename.
pub const INDEX_FILE_NAME: &str = "index.json";

/// Application directory created under the platform data directory.
pub const INDEX_DIR_NAME: &str = "locseng";

/// Temporary file suffix while the index is being saved.
pub const INDEX_TMP_SUFFIX: &str = ".tmp";

/// Version of the persisted index envelope.
pub const INDEX_FORMAT_VERSION: u32 = 1;

/// Environment variable overriding the index location.
pub const INDEX_PATH_ENV: &str = "LOCSENG_INDEX_PATH";

pub mod cli;
pub mod engine;
pub mod error;
pub mod extract;
pub mod index;
pub mod persist;
pub mod search;
pub mod tfidf;
pub mod tokenizer;
pub mod walker;

pub use cli::OutputFormat;
pub use engine::{DirectoryStats, Engine, IndexerConfig};
pub use error::{ExitCode, IndexerError, Result};
pub use extract::{ContentKind, SUPPORTED_EXTENSIONS, content_kind, extract};
pub use index::{Document, IndexStore, SearchHit};
pub use persist::{IndexPersistence, JsonFileStore};
pub use search::{ResultPrinter, SearchConfig};
pub use tfidf::tf_idf;
pub use tokenizer::{Tokenizer, tokenize};
pub use walker::{FileEntry, SafeWalk, enumerate_files};
