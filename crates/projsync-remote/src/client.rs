//! Claude.ai projects API client
//!
//! Provides a typed HTTP client for the organization, project, and document
//! endpoints. Every request carries the session cookie and is subject to the
//! configured timeout; HTTP 429 responses are retried with exponential
//! backoff.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use projsync_core::config::RemoteConfig;
//! use projsync_remote::client::ApiClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = ApiClient::new("session-key-here", &RemoteConfig::default())?;
//! let org = client.get_organization_id().await?;
//! println!("Using organization {org}");
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, COOKIE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use projsync_core::config::RemoteConfig;

use crate::RemoteError;

/// Base URL for the Claude.ai API
pub const DEFAULT_BASE_URL: &str = "https://claude.ai/api";

/// Maximum number of retries for 429 responses
const DEFAULT_MAX_RETRIES: u32 = 5;

/// First backoff delay after a 429 response
const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Organization capabilities that allow creating projects
const PROJECT_CAPABILITIES: [&str; 2] = ["chat", "claude_pro"];

// ============================================================================
// API response types
// ============================================================================

/// Entry of the `/organizations` response
#[derive(Debug, Clone, Deserialize)]
pub struct OrganizationDto {
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl OrganizationDto {
    fn can_hold_projects(&self) -> bool {
        self.capabilities
            .iter()
            .any(|c| PROJECT_CAPABILITIES.contains(&c.as_str()))
    }
}

/// A project as returned by the API
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectDto {
    pub uuid: String,
    pub name: String,
}

/// A project document as returned by the API
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentDto {
    pub uuid: String,
    pub file_name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct CreateProjectBody<'a> {
    name: &'a str,
    description: &'a str,
    is_private: bool,
}

#[derive(Debug, Serialize)]
struct CreateDocumentBody<'a> {
    file_name: &'a str,
    content: &'a str,
}

// ============================================================================
// ApiClient
// ============================================================================

/// HTTP client for the projects API
///
/// Wraps `reqwest::Client` with the session cookie, base URL construction,
/// and 429 backoff.
pub struct ApiClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for API requests, without a trailing slash
    base_url: String,
    /// Value of the `sessionKey` cookie
    session_key: String,
    /// Retries after a 429 before giving up
    max_retries: u32,
    /// Delay before the first 429 retry; doubles every attempt
    initial_backoff: Duration,
}

impl ApiClient {
    /// Creates a client configured from `config`
    ///
    /// # Arguments
    /// * `session_key` - Value of the browser session cookie
    /// * `config` - Base URL, timeout, and retry settings
    pub fn new(session_key: impl Into<String>, config: &RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session_key: session_key.into(),
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
        })
    }

    /// Creates a client with a custom base URL (useful for testing)
    ///
    /// # Arguments
    /// * `session_key` - Value of the session cookie
    /// * `base_url` - Custom base URL for API requests
    pub fn with_base_url(session_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session_key: session_key.into(),
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
        }
    }

    /// Overrides the 429 retry settings
    pub fn with_backoff(mut self, max_retries: u32, initial_backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.initial_backoff = initial_backoff;
        self
    }

    /// Returns the base URL for API requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates an authenticated request builder for the given method and path
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `path` - API path relative to the base URL (e.g. "/organizations")
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, &url)
            .header(COOKIE, format!("sessionKey={}", self.session_key))
            .header(ACCEPT, "application/json")
    }

    // ========================================================================
    // execute_with_retry - 429 response handling
    // ========================================================================

    /// Sends the request produced by `build`, retrying on HTTP 429.
    ///
    /// The delay starts at the configured initial backoff and doubles after
    /// every throttled attempt. Any other non-success status is returned as
    /// a [`RemoteError`] without retrying.
    pub async fn execute_with_retry<F>(&self, path: &str, build: F) -> Result<Response, RemoteError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt: u32 = 0;
        loop {
            let response = build().send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt >= self.max_retries {
                    warn!(path, attempts = attempt + 1, "429 retry limit exhausted");
                    return Err(RemoteError::TooManyRequests {
                        attempts: attempt + 1,
                    });
                }
                let delay = self
                    .initial_backoff
                    .saturating_mul(2u32.saturating_pow(attempt));
                info!(
                    path,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Received 429, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                debug!(path, status = status.as_u16(), "Request failed");
                return Err(RemoteError::from_status(status, body));
            }

            if attempt > 0 {
                info!(path, attempt, "Request succeeded after retry");
            }
            return Ok(response);
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute_with_retry(path, || self.request(Method::GET, path))
            .await
            .with_context(|| format!("GET {path} failed"))?
            .json()
            .await
            .with_context(|| format!("Failed to parse GET {path} response"))
    }

    // ========================================================================
    // Endpoints
    // ========================================================================

    /// Returns the organization to create projects in
    ///
    /// Picks the first organization whose capabilities include `chat` or
    /// `claude_pro`.
    pub async fn get_organization_id(&self) -> Result<String> {
        debug!("Fetching organizations");
        let orgs: Vec<OrganizationDto> = self.get_json("/organizations").await?;
        let org = orgs
            .into_iter()
            .find(OrganizationDto::can_hold_projects)
            .ok_or(RemoteError::NoOrganization)?;
        debug!(organization_id = %org.uuid, name = %org.name, "Selected organization");
        Ok(org.uuid)
    }

    /// Creates a private project
    pub async fn create_project(
        &self,
        organization_id: &str,
        name: &str,
        description: &str,
    ) -> Result<ProjectDto> {
        let path = format!("/organizations/{organization_id}/projects");
        let body = CreateProjectBody {
            name,
            description,
            is_private: true,
        };
        let project: ProjectDto = self
            .execute_with_retry(&path, || self.request(Method::POST, &path).json(&body))
            .await
            .with_context(|| format!("POST {path} failed"))?
            .json()
            .await
            .context("Failed to parse create project response")?;
        info!(project_id = %project.uuid, name = %project.name, "Project created");
        Ok(project)
    }

    /// Lists every document in a project
    pub async fn list_documents(
        &self,
        organization_id: &str,
        project_id: &str,
    ) -> Result<Vec<DocumentDto>> {
        let path = format!("/organizations/{organization_id}/projects/{project_id}/docs");
        let docs: Vec<DocumentDto> = self.get_json(&path).await?;
        debug!(project_id, count = docs.len(), "Listed documents");
        Ok(docs)
    }

    /// Deletes one document from a project
    pub async fn delete_document(
        &self,
        organization_id: &str,
        project_id: &str,
        document_id: &str,
    ) -> Result<()> {
        let path =
            format!("/organizations/{organization_id}/projects/{project_id}/docs/{document_id}");
        self.execute_with_retry(&path, || self.request(Method::DELETE, &path))
            .await
            .with_context(|| format!("DELETE {path} failed"))?;
        debug!(project_id, document_id, "Document deleted");
        Ok(())
    }

    /// Adds a text document to a project
    pub async fn upload_document(
        &self,
        organization_id: &str,
        project_id: &str,
        file_name: &str,
        content: &str,
    ) -> Result<DocumentDto> {
        let path = format!("/organizations/{organization_id}/projects/{project_id}/docs");
        let body = CreateDocumentBody { file_name, content };
        let doc: DocumentDto = self
            .execute_with_retry(&path, || self.request(Method::POST, &path).json(&body))
            .await
            .with_context(|| format!("POST {path} failed for {file_name}"))?
            .json()
            .await
            .with_context(|| format!("Failed to parse upload response for {file_name}"))?;
        debug!(project_id, file_name, document_id = %doc.uuid, "Document uploaded");
        Ok(doc)
    }
}
