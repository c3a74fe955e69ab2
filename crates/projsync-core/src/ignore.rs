//! Ignore rules for selecting the candidate file set.
//!
//! The ignore file holds three string arrays:
//!
//! ```text
//! ignore_folders=[".venv", ".idea", ".vscode", "__pycache__", ".git"]
//! ignore_file_extensions=["pdf", "jpg", "png", "pyc", "manifest"]
//! ignore_name_includes=["projsync", ".DS_Store"]
//! ```
//!
//! The format is parsed as TOML. Missing keys default to empty arrays and
//! unknown keys are ignored.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::domain::errors::SyncError;
use crate::domain::newtypes::RelativePath;

/// Default ignore file name inside a project root.
pub const IGNORE_FILE_NAME: &str = "projsync.ignore";

/// Content written by `init` when no ignore file exists yet.
pub const DEFAULT_IGNORE_TEXT: &str = concat!(
    "ignore_folders=[\".venv\", \".idea\", \".vscode\", \"__pycache__\", \".git\"]\n",
    "ignore_file_extensions=[\"pdf\", \"jpg\", \"png\", \"pyc\", \"manifest\"]\n",
    "ignore_name_includes=[\"projsync\", \".DS_Store\"]\n",
);

#[derive(Debug, Default, Deserialize)]
struct IgnoreFile {
    #[serde(default)]
    ignore_folders: Vec<String>,
    #[serde(default)]
    ignore_file_extensions: Vec<String>,
    #[serde(default)]
    ignore_name_includes: Vec<String>,
}

/// Immutable set of exclusion rules.
///
/// A path is excluded when any rule matches:
/// - a directory segment equals an excluded folder name,
/// - the file name ends with `.<ext>` for an excluded extension
///   (case-insensitive),
/// - the file name contains an excluded substring (case-sensitive).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreRuleSet {
    folders: BTreeSet<String>,
    extensions: BTreeSet<String>,
    name_includes: Vec<String>,
}

impl IgnoreRuleSet {
    /// Parse rules from the text of an ignore file.
    pub fn load(text: &str) -> Result<Self, SyncError> {
        let file: IgnoreFile =
            toml::from_str(text).map_err(|e| SyncError::ConfigParse(e.to_string()))?;
        Ok(Self::new(
            file.ignore_folders,
            file.ignore_file_extensions,
            file.ignore_name_includes,
        ))
    }

    /// Build rules from already-split lists.
    ///
    /// Extensions are normalised to lowercase without a leading dot; empty
    /// entries are dropped.
    pub fn new(
        folders: impl IntoIterator<Item = String>,
        extensions: impl IntoIterator<Item = String>,
        name_includes: impl IntoIterator<Item = String>,
    ) -> Self {
        let folders = folders.into_iter().filter(|f| !f.is_empty()).collect();
        let extensions = extensions
            .into_iter()
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        let name_includes = name_includes
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        Self {
            folders,
            extensions,
            name_includes,
        }
    }

    /// Load rules from `path`. A missing file yields the empty rule set.
    pub fn from_file(path: &Path) -> Result<Self, SyncError> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let rules = Self::load(&text)?;
                debug!(
                    path = %path.display(),
                    folders = rules.folders.len(),
                    extensions = rules.extensions.len(),
                    name_includes = rules.name_includes.len(),
                    "Loaded ignore rules"
                );
                Ok(rules)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No ignore file, using empty rules");
                Ok(Self::default())
            }
            Err(e) => Err(SyncError::ConfigParse(format!(
                "cannot read {}: {e}",
                path.display()
            ))),
        }
    }

    /// Write [`DEFAULT_IGNORE_TEXT`] to `path` unless a file already exists.
    ///
    /// Returns `true` when the file was created.
    pub fn write_default(path: &Path) -> std::io::Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        std::fs::write(path, DEFAULT_IGNORE_TEXT)?;
        Ok(true)
    }

    /// True if a directory with this name must be pruned with its subtree.
    pub fn excludes_folder(&self, name: &str) -> bool {
        self.folders.contains(name)
    }

    /// True if the file name ends with an excluded extension.
    pub fn excludes_extension(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.extensions.iter().any(|ext| {
            lower
                .strip_suffix(ext.as_str())
                .is_some_and(|stem| stem.ends_with('.'))
        })
    }

    /// True if the file name contains an excluded substring.
    pub fn excludes_name(&self, file_name: &str) -> bool {
        self.name_includes
            .iter()
            .any(|needle| file_name.contains(needle.as_str()))
    }

    /// Decide whether a project-relative path is excluded.
    pub fn should_exclude(&self, path: &RelativePath) -> bool {
        let file_name = path.file_name();
        path.parent_segments().any(|dir| self.excludes_folder(dir))
            || self.excludes_extension(file_name)
            || self.excludes_name(file_name)
    }

    pub fn folders(&self) -> impl Iterator<Item = &str> {
        self.folders.iter().map(String::as_str)
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }

    pub fn name_includes(&self) -> impl Iterator<Item = &str> {
        self.name_includes.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.extensions.is_empty() && self.name_includes.is_empty()
    }
}
