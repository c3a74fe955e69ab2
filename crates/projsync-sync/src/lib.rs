//! projsync Sync - Local collection and remote synchronization
//!
//! Provides:
//! - Ignore-aware traversal of a project directory
//! - Full-replace and incremental upload of the collected files
//! - Retry with exponential backoff for remote failures the adapter marks
//!   as retryable
//!
//! ## Modules
//!
//! - [`collector`] - Walks the project tree and reads admitted files
//! - [`engine`] - Drives a remote collection through create/update runs
//! - [`retry`] - Transient error detection and backoff

pub mod collector;
pub mod engine;
pub mod retry;

pub use collector::{Collection, FileTreeCollector};
pub use engine::{SyncEngine, SyncOptions};
pub use retry::{CallKind, RetryPolicy};
