//! Domain newtypes with validation
//!
//! Strongly-typed wrappers for remote identifiers and project-relative paths.
//! Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::path::{Component, Path};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// Remote identifiers
// ============================================================================

/// Identifier of a remote collection ("project") on the service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectId(String);

impl ProjectId {
    /// Create a new ProjectId
    ///
    /// # Errors
    /// Returns error if the ID is empty or contains whitespace or `/`
    pub fn new(id: String) -> Result<Self, DomainError> {
        validate_remote_id(&id).map_err(DomainError::InvalidProjectId)?;
        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of a document inside a remote collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Create a new DocumentId
    ///
    /// # Errors
    /// Returns error if the ID is empty or contains whitespace or `/`
    pub fn new(id: String) -> Result<Self, DomainError> {
        validate_remote_id(&id).map_err(DomainError::InvalidDocumentId)?;
        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Remote IDs end up in URL paths, so they must be a single non-empty segment
fn validate_remote_id(id: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err("ID cannot be empty".to_string());
    }
    if id.chars().any(|c| c.is_whitespace() || c == '/') {
        return Err(format!("ID contains invalid characters: {id}"));
    }
    Ok(())
}

macro_rules! string_id_impls {
    ($ty:ident) => {
        impl Display for $ty {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $ty {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s.to_string())
            }
        }

        impl TryFrom<String> for $ty {
            type Error = DomainError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$ty> for String {
            fn from(id: $ty) -> Self {
                id.0
            }
        }
    };
}

string_id_impls!(ProjectId);
string_id_impls!(DocumentId);

// ============================================================================
// RelativePath
// ============================================================================

/// A POSIX-style path relative to the project root
///
/// Always uses forward slashes, never starts with `/`, and contains no empty,
/// `.` or `..` segments. This is also the document name used on the remote.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RelativePath(String);

impl RelativePath {
    /// Create a new RelativePath from a forward-slash separated string
    ///
    /// # Errors
    /// Returns error if the path is empty, absolute, or has invalid segments
    pub fn new(path: String) -> Result<Self, DomainError> {
        if path.is_empty() {
            return Err(DomainError::InvalidPath("Path cannot be empty".to_string()));
        }
        if path.starts_with('/') {
            return Err(DomainError::InvalidPath(format!(
                "Path must be relative: {path}"
            )));
        }
        if path.contains('\\') {
            return Err(DomainError::InvalidPath(format!(
                "Path must use forward slashes: {path}"
            )));
        }
        if path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(DomainError::InvalidPath(format!(
                "Path has an empty or relative segment: {path}"
            )));
        }
        Ok(Self(path))
    }

    /// Build a RelativePath from a filesystem path already relative to the root
    ///
    /// # Errors
    /// Returns error if the path has non-normal components or is not UTF-8
    pub fn from_path(path: &Path) -> Result<Self, DomainError> {
        let mut segments = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => {
                    let part = part.to_str().ok_or_else(|| {
                        DomainError::InvalidPath(format!(
                            "Path is not valid UTF-8: {}",
                            path.display()
                        ))
                    })?;
                    segments.push(part);
                }
                _ => {
                    return Err(DomainError::InvalidPath(format!(
                        "Path must be a plain relative path: {}",
                        path.display()
                    )))
                }
            }
        }
        Self::new(segments.join("/"))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The final segment (the file name)
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Every segment except the last (the containing directories)
    pub fn parent_segments(&self) -> impl Iterator<Item = &str> {
        let parent = self.0.rsplit_once('/').map(|(p, _)| p).unwrap_or("");
        parent.split('/').filter(|s| !s.is_empty())
    }
}

string_id_impls!(RelativePath);
