//! Domain error types
//!
//! [`DomainError`] covers validation failures when constructing domain
//! values. [`SyncError`] is the taxonomy surfaced by collection and
//! reconciliation runs.

use thiserror::Error;

/// Errors that can occur when constructing domain values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid relative path format or content
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Invalid remote project identifier
    #[error("Invalid project ID: {0}")]
    InvalidProjectId(String),

    /// Invalid remote document identifier
    #[error("Invalid document ID: {0}")]
    InvalidDocumentId(String),
}

/// Errors raised by a sync run
///
/// `ConfigParse`, `RemoteCreate` and `RemoteList` abort a run. `FileRead`,
/// `RemoteDelete` and `PartialUpload` describe per-item failures that are
/// accumulated in a [`SyncReport`](super::SyncReport); `FileRead` is also
/// returned directly when the project root itself cannot be walked.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The ignore configuration could not be parsed
    #[error("Malformed ignore configuration: {0}")]
    ConfigParse(String),

    /// A local file or directory could not be read
    #[error("Failed to read {path}: {reason}")]
    FileRead {
        /// Path relative to the project root (or the root itself)
        path: String,
        /// Underlying I/O error message
        reason: String,
    },

    /// The remote collection could not be created
    #[error("Failed to create remote project: {0}")]
    RemoteCreate(String),

    /// A remote document could not be deleted
    #[error("Failed to delete remote document {id}: {reason}")]
    RemoteDelete {
        /// Remote document identifier
        id: String,
        /// Underlying error message
        reason: String,
    },

    /// The remote collection's contents could not be listed
    #[error("Failed to list remote documents: {0}")]
    RemoteList(String),

    /// One or more uploads failed; successful uploads remain committed
    #[error("{} upload(s) failed: {}", failed.len(), failed.join(", "))]
    PartialUpload {
        /// Relative paths whose upload failed
        failed: Vec<String>,
    },
}

/// Whether repeating a failed remote call can help, and whether it is safe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transience {
    /// The service did not act on the request (connection refused, 503)
    Retryable,
    /// The service may have applied the request (timeout, 500, 502, 504)
    Ambiguous,
    /// Repeating the call cannot succeed
    Permanent,
}

impl Transience {
    /// Whether a call that failed this way may be sent again
    ///
    /// `idempotent` calls (list, delete) are repeated after ambiguous
    /// failures; calls that create something (create, upload) are not.
    pub fn allows_retry(self, idempotent: bool) -> bool {
        match self {
            Transience::Retryable => true,
            Transience::Ambiguous => idempotent,
            Transience::Permanent => false,
        }
    }
}

/// A failed remote call, classified by the adapter that made it
///
/// Adapters return this through the `anyhow::Error` of the port so the
/// engine can decide on retries without knowing the transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RemoteCallError {
    pub transience: Transience,
    pub message: String,
}

impl RemoteCallError {
    pub fn new(transience: Transience, message: impl Into<String>) -> Self {
        Self {
            transience,
            message: message.into(),
        }
    }

    /// Classification of `err`; errors that carry none are permanent
    pub fn transience_of(err: &anyhow::Error) -> Transience {
        err.chain()
            .find_map(|e| e.downcast_ref::<RemoteCallError>())
            .map_or(Transience::Permanent, |e| e.transience)
    }
}
