//! Per-project configuration.
//!
//! A [`ProjectConfig`] is written by `init`, read by every `create` and
//! `update`, and updated with the remote project identity once `create`
//! succeeds. It is stored as JSON in the project root and handed to the core
//! explicitly by the caller.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::newtypes::ProjectId;
use crate::domain::remote::RemoteProjectHandle;
use crate::ignore::IGNORE_FILE_NAME;
use crate::manifest::MANIFEST_FILE_NAME;

/// File name of the project configuration inside the project root.
pub const CONFIG_FILE_NAME: &str = "projsync.config";

/// Project-level settings and remote identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Root of the local directory tree being synchronized
    ///
    /// Informational on disk: [`ProjectConfig::load`] replaces it with the
    /// directory the file was found in.
    #[serde(default)]
    pub root: PathBuf,
    /// Remote collection identifier; `None` until `create` succeeds
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    /// Remote collection display name
    #[serde(default)]
    pub project_name: Option<String>,
    /// Organization owning the remote collection
    #[serde(default)]
    pub organization_id: Option<String>,
    /// Ignore file, relative to `root` unless absolute
    #[serde(default = "default_ignore_file")]
    pub ignore_file: PathBuf,
    /// Manifest file, relative to `root` unless absolute
    #[serde(default = "default_manifest_file")]
    pub manifest_file: PathBuf,
}

fn default_ignore_file() -> PathBuf {
    PathBuf::from(IGNORE_FILE_NAME)
}

fn default_manifest_file() -> PathBuf {
    PathBuf::from(MANIFEST_FILE_NAME)
}

impl ProjectConfig {
    /// Creates a config for `root` with default file locations and no remote
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            project_id: None,
            project_name: None,
            organization_id: None,
            ignore_file: default_ignore_file(),
            manifest_file: default_manifest_file(),
        }
    }

    /// Location of the config file for a project rooted at `root`
    pub fn path_in(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE_NAME)
    }

    /// Loads the config stored under `root`, or `None` if there is none
    ///
    /// The loaded config is rooted at `root`, whatever root it was saved
    /// with, so a moved or copied project keeps working in place.
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = Self::path_in(root);
        if !path.exists() {
            debug!(path = %path.display(), "No project config found");
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config: ProjectConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        if config.root != root {
            debug!(
                saved = %config.root.display(),
                actual = %root.display(),
                "Project was moved; using its current location"
            );
            config.root = root.to_path_buf();
        }
        Ok(Some(config))
    }

    /// Writes the config to `<root>/projsync.config`
    pub fn save(&self) -> Result<()> {
        let path = Self::path_in(&self.root);
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize project config")?;
        std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(path = %path.display(), "Saved project config");
        Ok(())
    }

    /// Absolute location of the ignore file
    pub fn ignore_path(&self) -> PathBuf {
        self.resolve(&self.ignore_file)
    }

    /// Absolute location of the manifest file
    pub fn manifest_path(&self) -> PathBuf {
        self.resolve(&self.manifest_file)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Records the identity of a freshly created remote collection
    pub fn record_remote(&mut self, handle: &RemoteProjectHandle, organization_id: Option<String>) {
        self.project_id = Some(handle.id.clone());
        self.project_name = Some(handle.name.clone());
        if organization_id.is_some() {
            self.organization_id = organization_id;
        }
    }

    /// Handle to the remote collection, if one has been created
    pub fn remote_handle(&self) -> Option<RemoteProjectHandle> {
        self.project_id.as_ref().map(|id| {
            RemoteProjectHandle::new(
                id.clone(),
                self.project_name.clone().unwrap_or_else(|| id.to_string()),
            )
        })
    }
}
