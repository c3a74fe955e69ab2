//! ClaudeProjectsProvider - IRemoteCollection implementation for the
//! Claude.ai projects API
//!
//! Wraps an [`ApiClient`] bound to one organization and converts between the
//! API's JSON shapes and the core domain types.

use anyhow::{Context, Result};
use tracing::debug;

use projsync_core::domain::errors::RemoteCallError;
use projsync_core::domain::newtypes::{DocumentId, ProjectId};
use projsync_core::domain::remote::{RemoteDocument, RemoteProjectHandle};
use projsync_core::ports::IRemoteCollection;

use crate::client::{ApiClient, DocumentDto, ProjectDto};
use crate::transience_of;

/// Tags a client error with its retry classification for the engine
fn classified(err: anyhow::Error) -> anyhow::Error {
    RemoteCallError::new(transience_of(&err), format!("{err:#}")).into()
}

fn document_from_dto(dto: DocumentDto) -> Result<RemoteDocument> {
    Ok(RemoteDocument {
        id: DocumentId::new(dto.uuid).context("API returned an invalid document id")?,
        name: dto.file_name,
        content: dto.content,
        created_at: dto.created_at,
    })
}

fn handle_from_dto(dto: ProjectDto) -> Result<RemoteProjectHandle> {
    let id = ProjectId::new(dto.uuid).context("API returned an invalid project id")?;
    Ok(RemoteProjectHandle::new(id, dto.name))
}

/// Remote collection backed by the projects of one organization
pub struct ClaudeProjectsProvider {
    client: ApiClient,
    organization_id: String,
}

impl ClaudeProjectsProvider {
    /// Wraps `client` for an already known organization
    pub fn new(client: ApiClient, organization_id: impl Into<String>) -> Self {
        Self {
            client,
            organization_id: organization_id.into(),
        }
    }

    /// Wraps `client`, looking up the organization first
    pub async fn connect(client: ApiClient) -> Result<Self> {
        let organization_id = client.get_organization_id().await?;
        Ok(Self::new(client, organization_id))
    }

    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }
}

#[async_trait::async_trait]
impl IRemoteCollection for ClaudeProjectsProvider {
    async fn create_project(&self, name: &str, description: &str) -> Result<RemoteProjectHandle> {
        debug!(name, "ClaudeProjectsProvider::create_project");
        let dto = self
            .client
            .create_project(&self.organization_id, name, description)
            .await
            .map_err(classified)?;
        handle_from_dto(dto)
    }

    async fn list_documents(&self, project: &ProjectId) -> Result<Vec<RemoteDocument>> {
        debug!(project_id = %project, "ClaudeProjectsProvider::list_documents");
        self.client
            .list_documents(&self.organization_id, project.as_str())
            .await
            .map_err(classified)?
            .into_iter()
            .map(document_from_dto)
            .collect()
    }

    async fn delete_document(&self, project: &ProjectId, id: &DocumentId) -> Result<()> {
        debug!(project_id = %project, document_id = %id, "ClaudeProjectsProvider::delete_document");
        self.client
            .delete_document(&self.organization_id, project.as_str(), id.as_str())
            .await
            .map_err(classified)
    }

    async fn upload_document(
        &self,
        project: &ProjectId,
        name: &str,
        content: &str,
    ) -> Result<RemoteDocument> {
        debug!(
            project_id = %project,
            name,
            size = content.len(),
            "ClaudeProjectsProvider::upload_document"
        );
        let dto = self
            .client
            .upload_document(&self.organization_id, project.as_str(), name, content)
            .await
            .map_err(classified)?;
        document_from_dto(dto)
    }
}

// ============================================================================
// Tests
// ============================================================================
