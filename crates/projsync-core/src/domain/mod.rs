//! Domain entities
//!
//! This module contains the core domain types for projsync:
//! - Newtypes for validated identifiers and relative paths
//! - Local files and remote documents
//! - The per-run sync report
//! - Domain-specific error types

pub mod errors;
pub mod file;
pub mod newtypes;
pub mod remote;
pub mod report;

// Re-export commonly used types
pub use errors::{DomainError, RemoteCallError, SyncError, Transience};
pub use file::LocalFile;
pub use newtypes::*;
pub use remote::{RemoteDocument, RemoteProjectHandle};
pub use report::{FailureKind, SyncFailure, SyncPhase, SyncReport};
