//! Remote synchronization engine
//!
//! The [`SyncEngine`] pushes a collected file list into a remote document
//! collection through the [`IRemoteCollection`] port.
//!
//! ## Sync Flow
//!
//! - **create**: create the collection, then upload every file
//! - **update** (full replace): list, delete every listed document, wait for
//!   all deletions to resolve, then upload every file
//! - **incremental update**: same shape, but only documents for deleted or
//!   modified paths are removed and only added or modified files are uploaded
//!
//! Per-item failures are recorded in the [`SyncReport`]; only failures that
//! prevent the run from starting (create, list) are returned as errors.
//!
//! ## Retry Logic
//!
//! Every remote call goes through the configured [`RetryPolicy`]. Listing and
//! deleting are repeated after any retryable failure; creating and uploading
//! only when the service certainly did not act on the request, so a retry
//! never leaves a duplicate project or document behind.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use projsync_core::config::Config;
use projsync_core::domain::errors::SyncError;
use projsync_core::domain::file::LocalFile;
use projsync_core::domain::newtypes::{DocumentId, ProjectId, RelativePath};
use projsync_core::domain::remote::{RemoteDocument, RemoteProjectHandle};
use projsync_core::domain::report::{SyncFailure, SyncPhase, SyncReport};
use projsync_core::manifest::ChangeSet;
use projsync_core::ports::IRemoteCollection;

use crate::retry::{CallKind, RetryPolicy};

// ============================================================================
// SyncOptions
// ============================================================================

/// Tuning knobs for a [`SyncEngine`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Maximum uploads in flight at once
    pub upload_concurrency: usize,
    /// Maximum deletions in flight at once
    pub delete_concurrency: usize,
    /// Retry policy applied to every remote call
    pub retry: RetryPolicy,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            upload_concurrency: 4,
            delete_concurrency: 4,
            retry: RetryPolicy::default(),
        }
    }
}

impl SyncOptions {
    /// Derives engine options from the application configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            upload_concurrency: config.sync.upload_concurrency.max(1) as usize,
            delete_concurrency: config.sync.delete_concurrency.max(1) as usize,
            retry: RetryPolicy::from_config(&config.remote),
        }
    }
}

// ============================================================================
// SyncEngine
// ============================================================================

/// Pushes local files into a remote document collection
///
/// ## Dependencies
///
/// - `remote`: Remote collection operations (create, list, delete, upload)
/// - `options`: Concurrency limits and retry policy
pub struct SyncEngine {
    remote: Arc<dyn IRemoteCollection>,
    options: SyncOptions,
}

impl SyncEngine {
    /// Creates a new `SyncEngine`
    ///
    /// # Arguments
    /// * `remote` - Remote collection operations (IRemoteCollection)
    /// * `options` - Concurrency and retry settings
    pub fn new(remote: Arc<dyn IRemoteCollection>, options: SyncOptions) -> Self {
        Self { remote, options }
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Creates a new remote collection and uploads `files` into it
    ///
    /// Uploads that fail are recorded in the report; successful ones are
    /// kept even when others fail.
    ///
    /// # Errors
    /// Returns [`SyncError::RemoteCreate`] if the collection cannot be created.
    #[tracing::instrument(skip(self, description, files), fields(files = files.len()))]
    pub async fn create_project(
        &self,
        name: &str,
        description: &str,
        files: &[LocalFile],
    ) -> Result<(RemoteProjectHandle, SyncReport), SyncError> {
        let start = Instant::now();
        let mut report = SyncReport::new();

        let handle = self
            .options
            .retry
            .run("create_project", CallKind::Mutating, || {
                self.remote.create_project(name, description)
            })
            .await
            .map_err(|e| SyncError::RemoteCreate(format!("{e:#}")))?;
        info!(project_id = %handle.id, name = %handle.name, "Created remote project");

        self.upload_files(&handle.id, files.iter(), &mut report)
            .await;
        self.finish(&mut report, start);
        Ok((handle, report))
    }

    /// Replaces the whole content of an existing collection with `files`
    ///
    /// Every listed document is deleted first; uploads start only after
    /// every deletion has resolved, successfully or not.
    ///
    /// # Errors
    /// Returns [`SyncError::RemoteList`] if the current documents cannot be
    /// listed. Nothing is deleted or uploaded in that case.
    #[tracing::instrument(skip(self, handle, files), fields(project_id = %handle.id, files = files.len()))]
    pub async fn update_project(
        &self,
        handle: &RemoteProjectHandle,
        files: &[LocalFile],
    ) -> Result<SyncReport, SyncError> {
        let start = Instant::now();
        let mut report = SyncReport::new();

        let existing = self.list_documents(&handle.id, &mut report).await?;
        self.delete_documents(&handle.id, existing.iter().map(|d| &d.id), &mut report)
            .await;
        self.upload_files(&handle.id, files.iter(), &mut report)
            .await;

        self.finish(&mut report, start);
        Ok(report)
    }

    /// Applies only the differences described by `changes`
    ///
    /// Documents named after deleted or modified paths are removed, then
    /// added and modified files are uploaded. Same barrier and failure
    /// semantics as [`SyncEngine::update_project`].
    ///
    /// # Errors
    /// Returns [`SyncError::RemoteList`] if the current documents cannot be
    /// listed.
    #[tracing::instrument(
        skip(self, handle, files, changes),
        fields(project_id = %handle.id, changes = changes.total())
    )]
    pub async fn update_project_incremental(
        &self,
        handle: &RemoteProjectHandle,
        files: &[LocalFile],
        changes: &ChangeSet,
    ) -> Result<SyncReport, SyncError> {
        let start = Instant::now();
        let mut report = SyncReport::new();

        let stale: HashSet<&str> = changes
            .deleted
            .iter()
            .chain(&changes.modified)
            .map(RelativePath::as_str)
            .collect();
        let fresh: HashSet<&RelativePath> =
            changes.added.iter().chain(&changes.modified).collect();

        let existing = self.list_documents(&handle.id, &mut report).await?;
        let targets = existing
            .iter()
            .filter(|d| stale.contains(d.name.as_str()))
            .map(|d| &d.id);
        self.delete_documents(&handle.id, targets, &mut report)
            .await;

        let uploads = files.iter().filter(|f| fresh.contains(f.path()));
        self.upload_files(&handle.id, uploads, &mut report).await;

        self.finish(&mut report, start);
        Ok(report)
    }

    // ========================================================================
    // Phases
    // ========================================================================

    async fn list_documents(
        &self,
        project: &ProjectId,
        report: &mut SyncReport,
    ) -> Result<Vec<RemoteDocument>, SyncError> {
        self.enter(report, SyncPhase::Listing);
        let docs = self
            .options
            .retry
            .run("list_documents", CallKind::Idempotent, || {
                self.remote.list_documents(project)
            })
            .await
            .map_err(|e| SyncError::RemoteList(format!("{e:#}")))?;
        debug!(count = docs.len(), "Listed remote documents");
        Ok(docs)
    }

    /// Deletes `ids` with bounded concurrency and returns once every
    /// deletion has resolved
    async fn delete_documents<'d>(
        &self,
        project: &ProjectId,
        ids: impl Iterator<Item = &'d DocumentId>,
        report: &mut SyncReport,
    ) {
        self.enter(report, SyncPhase::Deleting);

        let results: Vec<(&DocumentId, anyhow::Result<()>)> = stream::iter(ids)
            .map(|id| async move {
                let result = self
                    .options
                    .retry
                    .run("delete_document", CallKind::Idempotent, || {
                        self.remote.delete_document(project, id)
                    })
                    .await;
                (id, result)
            })
            .buffer_unordered(self.options.delete_concurrency)
            .collect()
            .await;

        for (id, result) in results {
            match result {
                Ok(()) => {
                    debug!(document_id = %id, "Deleted remote document");
                    report.deleted.push(id.clone());
                }
                Err(e) => {
                    warn!(document_id = %id, error = %e, "Failed to delete remote document");
                    report
                        .failures
                        .push(SyncFailure::remote_delete(id, format!("{e:#}")));
                }
            }
        }
    }

    /// Uploads `files` with bounded concurrency
    async fn upload_files<'f>(
        &self,
        project: &ProjectId,
        files: impl Iterator<Item = &'f LocalFile>,
        report: &mut SyncReport,
    ) {
        self.enter(report, SyncPhase::Uploading);

        let results: Vec<(&RelativePath, anyhow::Result<RemoteDocument>)> = stream::iter(files)
            .map(|file| async move {
                let text = file.text();
                let content: &str = &text;
                let name = file.path().as_str();
                let result = self
                    .options
                    .retry
                    .run("upload_document", CallKind::Mutating, || {
                        self.remote.upload_document(project, name, content)
                    })
                    .await;
                (file.path(), result)
            })
            .buffer_unordered(self.options.upload_concurrency)
            .collect()
            .await;

        for (path, result) in results {
            match result {
                Ok(doc) => {
                    debug!(path = %path, document_id = %doc.id, "Uploaded file");
                    report.uploaded.push(path.clone());
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "Failed to upload file");
                    report
                        .failures
                        .push(SyncFailure::upload(path, format!("{e:#}")));
                }
            }
        }
        report.uploaded.sort();
    }

    fn enter(&self, report: &mut SyncReport, phase: SyncPhase) {
        debug!(phase = %phase, "Entering phase");
        report.enter(phase);
    }

    fn finish(&self, report: &mut SyncReport, start: Instant) {
        self.enter(report, SyncPhase::Done);
        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            uploaded = report.files_uploaded(),
            deleted = report.files_deleted(),
            failures = report.failures.len(),
            duration_ms = report.duration_ms,
            "Sync run complete"
        );
    }
}
