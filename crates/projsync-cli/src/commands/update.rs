//! Update command - Push the directory to the linked remote project
//!
//! Provides the `projsync update` CLI command which:
//! 1. Collects the project files using the ignore rules
//! 2. Replaces the remote content (default) or applies only the changes
//!    recorded against the manifest (`--incremental`)
//! 3. Writes the manifest for the uploaded state

use std::collections::HashSet;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use projsync_core::domain::file::LocalFile;
use projsync_core::domain::newtypes::RelativePath;
use projsync_core::domain::report::SyncReport;
use projsync_core::manifest::{ChangeSet, Manifest};

use super::{collect, confirm, is_structure_file, print_report, structure_file, CliContext};

/// Update command with clap options
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Only upload files changed since the last sync
    #[arg(short, long)]
    pub incremental: bool,

    /// Do not upload the generated PROJECT_STRUCTURE.txt
    #[arg(long)]
    pub no_structure: bool,

    /// Skip confirmation prompts
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl UpdateCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        ctx.require_valid_config()?;
        let project = ctx.load_project()?;
        let handle = project
            .remote_handle()
            .context("No remote project linked. Run 'projsync create --name <NAME>' first.")?;

        let collection = collect(&project)?;
        let manifest_path = project.manifest_path();
        let previous = Manifest::load(&manifest_path)?;
        let with_structure = ctx.config.sync.upload_structure && !self.no_structure;

        let mut files = collection.files.clone();
        let mut changes = ChangeSet::between(&previous, &files);

        if self.incremental && changes.is_empty() {
            formatter.success("No changes detected since last sync");
            return Ok(());
        }

        let tree_changed = !changes.added.is_empty() || !changes.deleted.is_empty();
        if with_structure && (!self.incremental || tree_changed) {
            if let Some(doc) = structure_file(&project, &files)? {
                changes.modified.push(doc.path().clone());
                files.push(doc);
            }
        }

        let prompt = if self.incremental {
            format!(
                "Apply {} added, {} modified, {} deleted to '{}'?",
                changes.added.len(),
                changes.modified.len(),
                changes.deleted.len(),
                handle.name
            )
        } else {
            format!(
                "Replace all documents in '{}' with {} local files?",
                handle.name,
                files.len()
            )
        };
        if !confirm(&prompt, self.yes)? {
            formatter.info("Aborted");
            return Ok(());
        }

        let provider = ctx.connect(&project).await?;
        let engine = ctx.engine(provider);

        let report = if self.incremental {
            engine
                .update_project_incremental(&handle, &files, &changes)
                .await?
        } else {
            engine.update_project(&handle, &files).await?
        };
        let report = report.with_collection_warnings(collection.warnings);

        let mut manifest = if self.incremental {
            incremental_manifest(previous, &files, &changes, &report)
        } else {
            uploaded_manifest(&files, &report)
        };
        manifest.save(&manifest_path)?;
        info!(entries = manifest.len(), "Manifest updated");

        print_report(ctx, &format!("Updated project '{}'", handle.name), &report)
    }
}

/// Manifest describing exactly the files a full replace uploaded
fn uploaded_manifest(files: &[LocalFile], report: &SyncReport) -> Manifest {
    let uploaded: HashSet<&RelativePath> = report.uploaded.iter().collect();
    let kept: Vec<LocalFile> = files
        .iter()
        .filter(|f| !is_structure_file(f.path()) && uploaded.contains(f.path()))
        .cloned()
        .collect();
    Manifest::from_files(&kept)
}

/// Applies an incremental run to the previous manifest
///
/// Paths whose upload failed are forgotten so the next run sends them again.
fn incremental_manifest(
    mut manifest: Manifest,
    files: &[LocalFile],
    changes: &ChangeSet,
    report: &SyncReport,
) -> Manifest {
    let uploaded: HashSet<&RelativePath> = report.uploaded.iter().collect();
    for path in &changes.deleted {
        manifest.remove(path);
    }
    for file in files {
        if is_structure_file(file.path()) {
            continue;
        }
        if uploaded.contains(file.path()) {
            manifest.record(file);
        } else if changes.modified.contains(file.path()) || changes.added.contains(file.path()) {
            manifest.remove(file.path());
        }
    }
    manifest
}
