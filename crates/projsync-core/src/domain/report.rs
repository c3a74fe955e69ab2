//! Sync run summary
//!
//! A [`SyncReport`] records what a single run did: the phases it went
//! through, every successful upload and deletion, and every per-item
//! failure with enough detail (relative path or remote id) to retry by hand.

use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use super::errors::SyncError;
use super::newtypes::{DocumentId, RelativePath};

/// Phases of a single sync run
///
/// `Idle → Collecting → (Listing → Deleting)? → Uploading → Done`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Idle,
    Collecting,
    Listing,
    Deleting,
    Uploading,
    Done,
}

impl Display for SyncPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncPhase::Idle => "idle",
            SyncPhase::Collecting => "collecting",
            SyncPhase::Listing => "listing",
            SyncPhase::Deleting => "deleting",
            SyncPhase::Uploading => "uploading",
            SyncPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Category of a per-item failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A local file could not be read during collection
    FileRead,
    /// A remote document could not be deleted
    RemoteDelete,
    /// A local file could not be uploaded
    Upload,
}

/// A single recoverable failure recorded during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncFailure {
    pub kind: FailureKind,
    /// Relative path for reads and uploads, remote id for deletions
    pub target: String,
    pub reason: String,
}

impl SyncFailure {
    pub fn file_read(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::FileRead,
            target: path.into(),
            reason: reason.into(),
        }
    }

    pub fn remote_delete(id: &DocumentId, reason: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::RemoteDelete,
            target: id.to_string(),
            reason: reason.into(),
        }
    }

    pub fn upload(path: &RelativePath, reason: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Upload,
            target: path.to_string(),
            reason: reason.into(),
        }
    }
}

impl Display for SyncFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind {
            FailureKind::FileRead => write!(f, "read {}: {}", self.target, self.reason),
            FailureKind::RemoteDelete => write!(f, "delete {}: {}", self.target, self.reason),
            FailureKind::Upload => write!(f, "upload {}: {}", self.target, self.reason),
        }
    }
}

impl From<&SyncFailure> for SyncError {
    fn from(failure: &SyncFailure) -> Self {
        match failure.kind {
            FailureKind::FileRead => SyncError::FileRead {
                path: failure.target.clone(),
                reason: failure.reason.clone(),
            },
            FailureKind::RemoteDelete => SyncError::RemoteDelete {
                id: failure.target.clone(),
                reason: failure.reason.clone(),
            },
            FailureKind::Upload => SyncError::PartialUpload {
                failed: vec![failure.target.clone()],
            },
        }
    }
}

/// Summary of a completed sync run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    /// Phases entered, in order
    pub phases: Vec<SyncPhase>,
    /// Relative paths uploaded successfully
    pub uploaded: Vec<RelativePath>,
    /// Remote documents deleted successfully
    pub deleted: Vec<DocumentId>,
    /// Recoverable failures, in the order they were resolved
    pub failures: Vec<SyncFailure>,
    /// Wall-clock duration of the remote phases in milliseconds
    pub duration_ms: u64,
}

impl SyncReport {
    /// A fresh report in the `Idle` phase
    pub fn new() -> Self {
        Self {
            phases: vec![SyncPhase::Idle],
            ..Self::default()
        }
    }

    /// Records entry into a phase
    pub fn enter(&mut self, phase: SyncPhase) {
        self.phases.push(phase);
    }

    /// The phase the run is currently in
    pub fn phase(&self) -> SyncPhase {
        self.phases.last().copied().unwrap_or(SyncPhase::Idle)
    }

    /// Folds the collector's read warnings into this report
    ///
    /// Inserts the `Collecting` phase right after `Idle` so the phase trace
    /// reflects the whole run.
    pub fn with_collection_warnings(mut self, warnings: Vec<SyncFailure>) -> Self {
        let at = usize::from(self.phases.first() == Some(&SyncPhase::Idle));
        self.phases.insert(at, SyncPhase::Collecting);
        let mut failures = warnings;
        failures.append(&mut self.failures);
        self.failures = failures;
        self
    }

    pub fn files_uploaded(&self) -> usize {
        self.uploaded.len()
    }

    pub fn files_deleted(&self) -> usize {
        self.deleted.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Failures of the given kind
    pub fn failures_of(&self, kind: FailureKind) -> impl Iterator<Item = &SyncFailure> {
        self.failures.iter().filter(move |f| f.kind == kind)
    }

    /// Aggregated upload failures, if any
    pub fn partial_upload_error(&self) -> Option<SyncError> {
        let failed: Vec<String> = self
            .failures_of(FailureKind::Upload)
            .map(|f| f.target.clone())
            .collect();
        if failed.is_empty() {
            None
        } else {
            Some(SyncError::PartialUpload { failed })
        }
    }

    /// Every failure mapped to the error taxonomy, uploads aggregated
    pub fn errors(&self) -> Vec<SyncError> {
        let mut errors: Vec<SyncError> = self
            .failures
            .iter()
            .filter(|f| f.kind != FailureKind::Upload)
            .map(SyncError::from)
            .collect();
        errors.extend(self.partial_upload_error());
        errors
    }
}
