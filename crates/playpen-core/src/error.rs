//! Error types for the playground pipeline.

use crate::types::SourceKind;

/// Error reported by a platform capability (rendering surface, host view).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct PlatformError(pub String);

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Error from a key-value store backend.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store exists but is not accessible (disabled, blocked, missing).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The write was rejected, typically because the origin quota is full.
    #[error("storage write rejected: {0}")]
    WriteRejected(String),
}

/// Error saving or loading persisted project state.
#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Stored value is not a valid project record.
    #[error("malformed project data: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Error producing an export.
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    /// Nothing to export for this pane.
    #[error("the {} file is empty", .0.as_str().to_uppercase())]
    Empty(SourceKind),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
