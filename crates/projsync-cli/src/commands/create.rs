//! Create command - Create a remote project from the directory
//!
//! Provides the `projsync create` CLI command which:
//! 1. Collects the project files using the ignore rules
//! 2. Creates the remote project and uploads every file
//! 3. Records the project identity and writes the manifest

use anyhow::Result;
use clap::Args;
use tracing::info;

use projsync_core::manifest::Manifest;

use super::{collect, confirm, is_structure_file, print_report, structure_file, CliContext};
use crate::output::format_size;

/// Create command with clap options
#[derive(Debug, Args)]
pub struct CreateCommand {
    /// Name of the new project
    #[arg(short = 'N', long)]
    pub name: String,

    /// Project description
    #[arg(short, long, default_value = "")]
    pub description: String,

    /// Do not upload the generated PROJECT_STRUCTURE.txt
    #[arg(long)]
    pub no_structure: bool,

    /// Skip confirmation prompts
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl CreateCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        ctx.require_valid_config()?;
        let mut project = ctx.load_project()?;

        if let Some(existing) = &project.project_id {
            let prompt = format!(
                "This directory is already linked to project {existing}. Create a new one?"
            );
            if !confirm(&prompt, self.yes)? {
                formatter.info("Aborted");
                return Ok(());
            }
        }

        let collection = collect(&project)?;
        let mut files = collection.files.clone();
        if ctx.config.sync.upload_structure && !self.no_structure {
            if let Some(doc) = structure_file(&project, &files)? {
                files.push(doc);
            }
        }

        formatter.info(&format!(
            "Files to upload: {} ({})",
            files.len(),
            format_size(collection.total_bytes())
        ));
        if !confirm(&format!("Create project '{}'?", self.name), self.yes)? {
            formatter.info("Aborted");
            return Ok(());
        }

        let provider = ctx.connect(&project).await?;
        let organization_id = provider.organization_id().to_string();
        let engine = ctx.engine(provider);

        let (handle, report) = engine
            .create_project(&self.name, &self.description, &files)
            .await?;
        let report = report.with_collection_warnings(collection.warnings);

        project.record_remote(&handle, Some(organization_id));
        project.save()?;
        info!(project_id = %handle.id, "Linked directory to remote project");

        let uploaded: Vec<_> = files
            .iter()
            .filter(|f| !is_structure_file(f.path()) && report.uploaded.contains(f.path()))
            .cloned()
            .collect();
        Manifest::from_files(&uploaded).save(&project.manifest_path())?;

        print_report(
            ctx,
            &format!("Created project '{}' ({})", handle.name, handle.id),
            &report,
        )
    }
}
