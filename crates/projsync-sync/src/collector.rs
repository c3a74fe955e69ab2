//! Ignore-aware directory traversal
//!
//! [`FileTreeCollector`] walks a project root, prunes excluded folders
//! without descending into them, and reads every admitted file into memory.
//! Problems with individual entries are reported as warnings so a single
//! unreadable file never aborts a run.

use std::path::Path;

use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use projsync_core::domain::errors::SyncError;
use projsync_core::domain::file::LocalFile;
use projsync_core::domain::newtypes::RelativePath;
use projsync_core::domain::report::SyncFailure;
use projsync_core::ignore::IgnoreRuleSet;

/// Result of a collection pass
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Admitted files, in traversal order
    pub files: Vec<LocalFile>,
    /// Entries that could not be read
    pub warnings: Vec<SyncFailure>,
}

impl Collection {
    /// Relative paths of the collected files
    pub fn paths(&self) -> impl Iterator<Item = &RelativePath> {
        self.files.iter().map(LocalFile::path)
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(LocalFile::size).sum()
    }
}

/// Walks a project directory and gathers the files to synchronize
pub struct FileTreeCollector;

impl FileTreeCollector {
    /// Collects every non-excluded file under `root`.
    ///
    /// Entries are visited in file-name order, so an unchanged tree always
    /// yields the same sequence. Symlinks are not followed: a link to a file
    /// is read through, a link to a directory is skipped.
    ///
    /// # Errors
    /// Returns [`SyncError::FileRead`] if `root` does not exist or is not a
    /// directory. Anything that fails below the root becomes a warning.
    #[tracing::instrument(skip(rules), fields(root = %root.display()))]
    pub fn collect(root: &Path, rules: &IgnoreRuleSet) -> Result<Collection, SyncError> {
        let meta = std::fs::metadata(root).map_err(|e| SyncError::FileRead {
            path: root.display().to_string(),
            reason: e.to_string(),
        })?;
        if !meta.is_dir() {
            return Err(SyncError::FileRead {
                path: root.display().to_string(),
                reason: "not a directory".to_string(),
            });
        }

        let mut collection = Collection::default();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_pruned(entry, rules));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .map(|p| display_relative(root, p))
                        .unwrap_or_else(|| root.display().to_string());
                    warn!(path = %path, error = %err, "Skipping unreadable entry");
                    collection
                        .warnings
                        .push(SyncFailure::file_read(path, err.to_string()));
                    continue;
                }
            };

            if entry.depth() == 0 || entry.file_type().is_dir() {
                continue;
            }

            let relative = match entry
                .path()
                .strip_prefix(root)
                .map_err(|e| e.to_string())
                .and_then(|p| RelativePath::from_path(p).map_err(|e| e.to_string()))
            {
                Ok(relative) => relative,
                Err(reason) => {
                    let path = display_relative(root, entry.path());
                    warn!(path = %path, reason = %reason, "Skipping entry with unusable path");
                    collection.warnings.push(SyncFailure::file_read(path, reason));
                    continue;
                }
            };

            if rules.should_exclude(&relative) {
                debug!(path = %relative, "Excluded by ignore rules");
                continue;
            }

            if entry.path_is_symlink() {
                match std::fs::metadata(entry.path()) {
                    Ok(target) if target.is_dir() => {
                        debug!(path = %relative, "Not following directory symlink");
                        continue;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(path = %relative, error = %e, "Broken symlink");
                        collection
                            .warnings
                            .push(SyncFailure::file_read(relative.as_str(), e.to_string()));
                        continue;
                    }
                }
            }

            match std::fs::read(entry.path()) {
                Ok(content) => collection.files.push(LocalFile::new(relative, content)),
                Err(e) => {
                    warn!(path = %relative, error = %e, "Failed to read file");
                    collection
                        .warnings
                        .push(SyncFailure::file_read(relative.as_str(), e.to_string()));
                }
            }
        }

        info!(
            files = collection.files.len(),
            bytes = collection.total_bytes(),
            warnings = collection.warnings.len(),
            "Collection complete"
        );
        Ok(collection)
    }
}

/// Whether `entry` is a directory the rules prune. The root is never pruned.
fn is_pruned(entry: &DirEntry, rules: &IgnoreRuleSet) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let pruned = entry
        .file_name()
        .to_str()
        .is_some_and(|name| rules.excludes_folder(name));
    if pruned {
        debug!(path = %entry.path().display(), "Pruning excluded folder");
    }
    pruned
}

fn display_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
