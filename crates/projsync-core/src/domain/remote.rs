//! Remote-side entities
//!
//! These are owned by the remote service. The engine reads them from a
//! listing and receives them back from creation calls; it never changes a
//! document's identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::{DocumentId, ProjectId};

/// A document stored in a remote collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDocument {
    /// Opaque identifier assigned by the service
    pub id: DocumentId,
    /// Document name; the local relative path at upload time
    pub name: String,
    /// Document content (may be empty when the service omits it)
    #[serde(default)]
    pub content: String,
    /// When the service created the document, if reported
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Handle to a remote collection returned on creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteProjectHandle {
    /// Identifier of the collection
    pub id: ProjectId,
    /// Display name of the collection
    pub name: String,
}

impl RemoteProjectHandle {
    /// Creates a new handle
    pub fn new(id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
