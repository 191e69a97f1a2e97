// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Every failure the validator, builder and store can raise.
//
// All variants are fatal for the split being processed:
// nothing is retried and nothing is silently repaired.
// Other splits are unaffected because each split is
// validated and built independently.
//
// The application and CLI layers wrap these in anyhow
// with extra context; the lower layers stay typed so tests
// can match on the exact failure.
//
// Reference: thiserror crate documentation
//            Rust Book §9 (Recoverable Errors with Result)

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used by the domain, data, ml and infra layers.
pub type Result<T> = std::result::Result<T, BatchError>;

#[derive(Debug, Error)]
pub enum BatchError {
    /// Missing or unreadable source name, storage location or setting.
    #[error("configuration error: {0}")]
    Config(String),

    /// Length or dimensionality mismatch between x and y,
    /// or between the data and the declared network geometry.
    #[error("data inconsistency: {0}")]
    DataInconsistency(String),

    /// Unrecognised split identifier or other bad argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Load or delete of a batch set that was never built.
    #[error("not found: '{}'", .0.display())]
    NotFound(PathBuf),

    /// A stored archive exists but its structure is malformed.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BatchError {
    /// Shorthand used all over the builder and validator.
    pub fn inconsistent(msg: impl Into<String>) -> Self {
        Self::DataInconsistency(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
