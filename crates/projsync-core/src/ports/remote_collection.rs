//! Remote collection port (driven/secondary port)
//!
//! The interface the sync engine uses to reach the service that owns the
//! document collections. The primary implementation targets the Claude.ai
//! projects API, but nothing here is provider specific.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are
//!   adapter-specific; the engine classifies them into `SyncError`.
//! - Implementations should enforce a per-call timeout and surface it as an
//!   error instead of blocking forever.

use crate::domain::newtypes::{DocumentId, ProjectId};
use crate::domain::remote::{RemoteDocument, RemoteProjectHandle};

/// Port trait for remote collection operations
#[async_trait::async_trait]
pub trait IRemoteCollection: Send + Sync {
    /// Creates a new, empty collection
    ///
    /// # Arguments
    /// * `name` - Display name of the collection
    /// * `description` - Free-form description (may be empty)
    async fn create_project(
        &self,
        name: &str,
        description: &str,
    ) -> anyhow::Result<RemoteProjectHandle>;

    /// Lists every document currently in the collection
    async fn list_documents(&self, project: &ProjectId) -> anyhow::Result<Vec<RemoteDocument>>;

    /// Deletes a single document
    async fn delete_document(&self, project: &ProjectId, id: &DocumentId) -> anyhow::Result<()>;

    /// Uploads a document and returns it as stored by the service
    ///
    /// # Arguments
    /// * `project` - Target collection
    /// * `name` - Document name (the local relative path)
    /// * `content` - Document text
    async fn upload_document(
        &self,
        project: &ProjectId,
        name: &str,
        content: &str,
    ) -> anyhow::Result<RemoteDocument>;
}
