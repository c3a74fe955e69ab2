//! projsync Remote - Claude.ai projects API client
//!
//! Provides:
//! - An HTTP client authenticated with a session cookie
//! - The [`IRemoteCollection`](projsync_core::ports::IRemoteCollection)
//!   implementation backed by that client
//! - Session key storage in the system keyring
//!
//! ## Modules
//!
//! - [`client`] - HTTP client with timeout and 429 backoff
//! - [`provider`] - Port implementation over a selected organization
//! - [`session`] - Session key storage and resolution

pub mod client;
pub mod provider;
pub mod session;

use projsync_core::domain::errors::Transience;
use thiserror::Error;

/// Errors that can occur when communicating with the projects API
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The session key is missing, invalid, or expired
    #[error("Unauthorized (401): {0}")]
    Unauthorized(String),

    /// The session is valid but may not perform the operation
    #[error("Forbidden (403): {0}")]
    Forbidden(String),

    /// The requested resource does not exist
    #[error("Not found (404): {0}")]
    NotFound(String),

    /// Rate limit still exceeded after every retry
    #[error("Too many requests (429): gave up after {attempts} attempts")]
    TooManyRequests {
        /// Number of requests sent, including the first
        attempts: u32,
    },

    /// A server-side error occurred (5xx)
    #[error("Server error ({status}): {body}")]
    ServerError { status: u16, body: String },

    /// Any other non-success status
    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// None of the account's organizations can hold projects
    #[error("No organization with chat capability found")]
    NoOrganization,

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    /// Maps a non-success status and its body to an error
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 => RemoteError::Unauthorized(body),
            403 => RemoteError::Forbidden(body),
            404 => RemoteError::NotFound(body),
            code if status.is_server_error() => RemoteError::ServerError { status: code, body },
            code => RemoteError::UnexpectedStatus { status: code, body },
        }
    }

    /// Whether the failed request may be sent again
    ///
    /// 429 is already retried by [`ApiClient`](client::ApiClient), so an
    /// exhausted `TooManyRequests` is final. A 503 means the service did not
    /// act; other 5xx responses and timeouts leave that open.
    pub fn transience(&self) -> Transience {
        match self {
            RemoteError::ServerError { status: 503, .. } => Transience::Retryable,
            RemoteError::ServerError { .. } => Transience::Ambiguous,
            RemoteError::NetworkError(e) => network_transience(e),
            RemoteError::Unauthorized(_)
            | RemoteError::Forbidden(_)
            | RemoteError::NotFound(_)
            | RemoteError::TooManyRequests { .. }
            | RemoteError::UnexpectedStatus { .. }
            | RemoteError::NoOrganization
            | RemoteError::InvalidResponse(_) => Transience::Permanent,
        }
    }
}

fn network_transience(err: &reqwest::Error) -> Transience {
    if err.is_connect() {
        Transience::Retryable
    } else if err.is_builder() || err.is_redirect() {
        Transience::Permanent
    } else {
        Transience::Ambiguous
    }
}

/// Classifies an error returned by the client from the first
/// [`RemoteError`] or `reqwest::Error` in its chain
pub fn transience_of(err: &anyhow::Error) -> Transience {
    for cause in err.chain() {
        if let Some(remote) = cause.downcast_ref::<RemoteError>() {
            return remote.transience();
        }
        if let Some(network) = cause.downcast_ref::<reqwest::Error>() {
            return network_transience(network);
        }
    }
    Transience::Permanent
}
