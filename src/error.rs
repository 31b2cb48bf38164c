use thiserror::Error;

/// Centralized error types for the indexer.
///
/// All errors are explicit enum variants (no Box<dyn Error>) so callers can
/// branch on caller-input errors versus fatal persistence errors.
#[derive(Error, Debug)]
pub enum IndexerError {
    /// File system I/O operation failed
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Directory passed to add/remove does not exist
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: String },

    /// File extension has no content extractor
    #[error("unsupported extension '{extension}' for file: {path}")]
    UnsupportedExtension { path: String, extension: String },

    /// File exceeds maximum allowed size
    #[error("file too large: {size} bytes (max: {max})")]
    FileTooLarge { size: u64, max: u64 },

    /// File contains invalid UTF-8 encoding
    #[error("invalid UTF-8 in file: {path}")]
    InvalidUtf8 { path: String },

    /// Invalid CLI configuration value
    #[error("invalid {field}: {value} ({reason})")]
    ConfigInvalid { field: String, value: String, reason: String },

    /// Persisted index exists but cannot be parsed
    #[error("index file '{path}' is corrupted: {source}")]
    IndexCorrupted {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Persisted index was written by an incompatible format version
    #[error("index format version {version} is not supported (expected {expected})")]
    IncompatibleIndex { version: u32, expected: u32 },

    /// JSON serialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl From<ignore::Error> for IndexerError {
    fn from(source: ignore::Error) -> Self {
        let message = source.to_string();
        let source = source.into_io_error().unwrap_or_else(|| std::io::Error::other(message));
        Self::Io { source }
    }
}

/// Result type alias for indexer operations.
pub type Result<T> = std::result::Result<T, IndexerError>;

/// Exit codes for the CLI application.
///
/// Based on BSD sysexits.h conventions for meaningful exit statuses.
/// Use `ExitCode::into()` to convert to `std::process::ExitCode`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Successful execution
    Ok = 0,
    /// General software error (internal error, unexpected state)
    Software = 1,
    /// Invalid input data (corrupted or incompatible index)
    DataErr = 2,
    /// I/O error (directory not found, unreadable index file)
    IoErr = 3,
    /// No input provided (missing required arguments)
    NoInput = 4,
    /// Permission denied (access control failure)
    NoPerm = 5,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}

impl From<&IndexerError> for ExitCode {
    fn from(error: &IndexerError) -> Self {
        match error {
            IndexerError::Io { source } if source.kind() == std::io::ErrorKind::PermissionDenied => {
                Self::NoPerm
            }
            IndexerError::Io { .. } | IndexerError::DirectoryNotFound { .. } => Self::IoErr,
            IndexerError::IndexCorrupted { .. }
            | IndexerError::IncompatibleIndex { .. }
            | IndexerError::UnsupportedExtension { .. } => Self::DataErr,
            IndexerError::ConfigInvalid { .. } => Self::NoInput,
            _ => Self::Software,
        }
    }
}
