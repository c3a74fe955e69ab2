//! Init command - Prepare a directory for synchronization
//!
//! Provides the `projsync init` CLI command which:
//! 1. Writes the default ignore file (existing files are kept)
//! 2. Writes the project config and an empty manifest
//! 3. Stores the session key in the system keyring

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use projsync_core::ignore::IgnoreRuleSet;
use projsync_core::manifest::Manifest;
use projsync_core::project::ProjectConfig;
use projsync_remote::session::{KeyringSessionStorage, SESSION_KEY_ENV};

use super::CliContext;

/// Init command with clap options
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Session key copied from the browser's `sessionKey` cookie
    #[arg(long)]
    pub session_key: String,
}

impl InitCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        info!(root = %ctx.root.display(), "Initializing project");

        let session_key = self.session_key.trim();
        if session_key.is_empty() {
            anyhow::bail!("Session key must not be empty");
        }

        let project = match ProjectConfig::load(&ctx.root)? {
            Some(existing) => {
                formatter.info("Keeping existing project config");
                existing
            }
            None => {
                let project = ProjectConfig::new(&ctx.root);
                project.save()?;
                formatter.success("Created project config");
                project
            }
        };

        let ignore_path = project.ignore_path();
        let created = IgnoreRuleSet::write_default(&ignore_path)
            .with_context(|| format!("Failed to write {}", ignore_path.display()))?;
        if created {
            formatter.success(&format!("Created ignore file {}", ignore_path.display()));
        } else {
            formatter.info(&format!("Keeping existing ignore file {}", ignore_path.display()));
        }

        let manifest_path = project.manifest_path();
        if !manifest_path.exists() {
            Manifest::default().write(&manifest_path)?;
            formatter.success("Created manifest file");
        }

        match KeyringSessionStorage::store(&ctx.account(), session_key) {
            Ok(()) => formatter.success("Session key saved to keyring"),
            Err(e) => formatter.warn(&format!(
                "Could not store session key ({e:#}); set {SESSION_KEY_ENV} instead"
            )),
        }

        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({
                "root": project.root,
                "ignore_file": ignore_path,
                "manifest_file": manifest_path,
                "project_id": project.project_id,
            }));
        } else {
            formatter.success("Initialization complete. Run 'projsync create --name <NAME>' next.");
        }
        Ok(())
    }
}
