//! Status command - Show local changes since the last sync
//!
//! Provides the `projsync status` CLI command which:
//! 1. Collects the project files using the ignore rules
//! 2. Compares them against the manifest written by the last sync
//! 3. Lists added, modified, and deleted paths

use anyhow::Result;
use clap::Args;
use tracing::info;

use projsync_core::domain::newtypes::RelativePath;
use projsync_core::manifest::{ChangeSet, Manifest};

use super::{collect, CliContext};
use crate::output::{format_size, OutputFormatter};

/// Status command with clap options
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// List every changed path instead of only the counts
    #[arg(short, long)]
    pub detailed: bool,
}

impl StatusCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let project = ctx.load_project()?;

        let collection = collect(&project)?;
        let manifest = Manifest::load(&project.manifest_path())?;
        let changes = ChangeSet::between(&manifest, &collection.files);
        info!(changes = changes.total(), "Computed local changes");

        if ctx.is_json() {
            let json = serde_json::json!({
                "root": project.root,
                "project_id": project.project_id,
                "project_name": project.project_name,
                "files": collection.files.len(),
                "total_bytes": collection.total_bytes(),
                "last_sync": manifest.last_sync().map(|t| t.to_rfc3339()),
                "changes": changes,
                "warnings": collection.warnings,
            });
            formatter.print_json(&json);
            return Ok(());
        }

        let title = match &project.project_name {
            Some(name) => format!("projsync status - {name}"),
            None => "projsync status - not linked to a remote project".to_string(),
        };
        formatter.success(&title);
        formatter.info("");

        match manifest.last_sync() {
            Some(time) => formatter.info(&format!(
                "Last sync: {}",
                time.format("%Y-%m-%d %H:%M:%S UTC")
            )),
            None => formatter.info("Last sync: Never"),
        }
        formatter.info(&format!(
            "Local files: {} ({})",
            collection.files.len(),
            format_size(collection.total_bytes())
        ));
        formatter.info("");

        if changes.is_empty() {
            formatter.info("No changes since last sync");
        } else {
            formatter.info("Change     Count");
            formatter.info("---------- -----");
            formatter.info(&format!("{:<10} {}", "Added", changes.added.len()));
            formatter.info(&format!("{:<10} {}", "Modified", changes.modified.len()));
            formatter.info(&format!("{:<10} {}", "Deleted", changes.deleted.len()));

            if self.detailed {
                formatter.info("");
                list_paths(&*formatter, "+", &changes.added);
                list_paths(&*formatter, "~", &changes.modified);
                list_paths(&*formatter, "-", &changes.deleted);
            }
        }

        if !collection.warnings.is_empty() {
            formatter.info("");
            formatter.warn(&format!(
                "{} file(s) could not be read:",
                collection.warnings.len()
            ));
            for warning in &collection.warnings {
                formatter.warn(&format!("  {}", warning));
            }
        }

        Ok(())
    }
}

fn list_paths(formatter: &dyn OutputFormatter, marker: &str, paths: &[RelativePath]) {
    for path in paths {
        formatter.info(&format!("  {marker} {path}"));
    }
}
