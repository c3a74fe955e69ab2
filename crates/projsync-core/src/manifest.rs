//! Local manifest of the last synchronized state.
//!
//! The manifest records a SHA-256 hash and size for every file that was
//! uploaded by the last successful `create` or `update`. `status` and
//! incremental updates compare it against a fresh collection.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::domain::file::LocalFile;
use crate::domain::newtypes::RelativePath;

/// File name of the manifest inside the project root.
pub const MANIFEST_FILE_NAME: &str = "projsync.manifest";

/// Recorded state of one synchronized file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileState {
    /// Lowercase hex SHA-256 of the file content
    pub hash: String,
    /// Size in bytes
    pub size: u64,
}

impl FileState {
    fn of(file: &LocalFile) -> Self {
        Self {
            hash: content_hash(file.content()),
            size: file.size(),
        }
    }
}

/// Hashes raw content into lowercase hex SHA-256
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Snapshot of the files last pushed to the remote collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    files: BTreeMap<RelativePath, FileState>,
    #[serde(default)]
    last_sync: Option<DateTime<Utc>>,
}

impl Manifest {
    /// Builds a manifest describing `files`
    pub fn from_files(files: &[LocalFile]) -> Self {
        let files = files
            .iter()
            .map(|f| (f.path().clone(), FileState::of(f)))
            .collect();
        Self {
            files,
            last_sync: None,
        }
    }

    /// Loads a manifest; a missing file yields an empty manifest
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No manifest found, starting empty");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse manifest {}", path.display()))
    }

    /// Stamps `last_sync` with the current time and writes the manifest
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.last_sync = Some(Utc::now());
        self.write(path)
    }

    /// Writes the manifest as is, without touching `last_sync`
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize manifest")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write manifest {}", path.display()))?;
        debug!(path = %path.display(), files = self.files.len(), "Saved manifest");
        Ok(())
    }

    /// Records the current state of `file`
    pub fn record(&mut self, file: &LocalFile) {
        self.files.insert(file.path().clone(), FileState::of(file));
    }

    /// Forgets `path`; returns whether it was recorded
    pub fn remove(&mut self, path: &RelativePath) -> bool {
        self.files.remove(path).is_some()
    }

    pub fn get(&self, path: &RelativePath) -> Option<&FileState> {
        self.files.get(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.last_sync
    }

    pub fn paths(&self) -> impl Iterator<Item = &RelativePath> {
        self.files.keys()
    }
}

/// Differences between a manifest and the current local tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    pub added: Vec<RelativePath>,
    pub modified: Vec<RelativePath>,
    pub deleted: Vec<RelativePath>,
}

impl ChangeSet {
    /// Compares the recorded `manifest` with freshly collected `files`.
    ///
    /// All three lists come out sorted by path.
    pub fn between(manifest: &Manifest, files: &[LocalFile]) -> Self {
        let mut changes = ChangeSet::default();
        let mut seen = std::collections::BTreeSet::new();

        for file in files {
            seen.insert(file.path());
            match manifest.get(file.path()) {
                None => changes.added.push(file.path().clone()),
                Some(state) if state.hash != content_hash(file.content()) => {
                    changes.modified.push(file.path().clone())
                }
                Some(_) => {}
            }
        }
        changes.deleted = manifest
            .paths()
            .filter(|p| !seen.contains(p))
            .cloned()
            .collect();

        changes.added.sort();
        changes.modified.sort();
        changes
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    pub fn total(&self) -> usize {
        self.added.len() + self.modified.len() + self.deleted.len()
    }
}
