//! Info command - Describe the project and environment
//!
//! Provides the `projsync info` CLI command which shows the project
//! configuration, the linked remote project, the ignore rules, the manifest,
//! where the session key would come from, and whether the application
//! configuration is valid.

use anyhow::Result;
use clap::Args;
use tracing::{debug, info};

use projsync_core::ignore::IgnoreRuleSet;
use projsync_core::manifest::Manifest;
use projsync_core::project::ProjectConfig;
use projsync_remote::session::resolve_session_key;

use super::CliContext;

/// Info command
#[derive(Debug, Args)]
pub struct InfoCommand {}

impl InfoCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let project = ctx.load_project()?;
        info!(root = %project.root.display(), "Showing project info");

        let ignore_path = project.ignore_path();
        let rules = if ignore_path.exists() {
            Some(IgnoreRuleSet::from_file(&ignore_path)?)
        } else {
            None
        };
        let manifest = Manifest::load(&project.manifest_path())?;
        let session = match resolve_session_key(&ctx.account()) {
            Ok(Some((_, source))) => source.to_string(),
            Ok(None) => "not found".to_string(),
            Err(e) => {
                debug!(error = %e, "Session key lookup failed");
                "unavailable".to_string()
            }
        };
        let validation: Vec<String> = ctx
            .config
            .validate()
            .iter()
            .map(ToString::to_string)
            .collect();

        if ctx.is_json() {
            let json = serde_json::json!({
                "root": project.root,
                "project_config": ProjectConfig::path_in(&project.root),
                "project_id": project.project_id,
                "project_name": project.project_name,
                "organization_id": project.organization_id,
                "ignore_file": ignore_path,
                "ignore_rules": rules.as_ref().map(|r| serde_json::json!({
                    "folders": r.folders().collect::<Vec<_>>(),
                    "extensions": r.extensions().collect::<Vec<_>>(),
                    "name_includes": r.name_includes().collect::<Vec<_>>(),
                })),
                "manifest_entries": manifest.len(),
                "last_sync": manifest.last_sync().map(|t| t.to_rfc3339()),
                "session_key": session,
                "config_path": ctx.config_path,
                "config_errors": validation,
            });
            formatter.print_json(&json);
            return Ok(());
        }

        formatter.success(&format!("projsync - {}", project.root.display()));
        formatter.info("");
        formatter.info(&format!(
            "Project config:  {}",
            ProjectConfig::path_in(&project.root).display()
        ));
        match (&project.project_id, &project.project_name) {
            (Some(id), Some(name)) => formatter.info(&format!("Remote project:  {name} ({id})")),
            (Some(id), None) => formatter.info(&format!("Remote project:  {id}")),
            _ => formatter.info("Remote project:  none (run 'projsync create')"),
        }
        if let Some(org) = &project.organization_id {
            formatter.info(&format!("Organization:    {org}"));
        }

        match &rules {
            Some(rules) => formatter.info(&format!(
                "Ignore rules:    {} ({} folders, {} extensions, {} name patterns)",
                ignore_path.display(),
                rules.folders().count(),
                rules.extensions().count(),
                rules.name_includes().count()
            )),
            None => formatter.warn(&format!(
                "Ignore rules:    {} is missing, nothing is excluded",
                ignore_path.display()
            )),
        }

        formatter.info(&format!("Manifest:        {} entries", manifest.len()));
        match manifest.last_sync() {
            Some(time) => formatter.info(&format!(
                "Last sync:       {}",
                time.format("%Y-%m-%d %H:%M:%S UTC")
            )),
            None => formatter.info("Last sync:       Never"),
        }
        formatter.info(&format!("Session key:     {session}"));
        formatter.info(&format!("App config:      {}", ctx.config_path.display()));

        if !validation.is_empty() {
            formatter.info("");
            formatter.error(&format!("{} configuration error(s):", validation.len()));
            for error in &validation {
                formatter.error(&format!("  {error}"));
            }
        }

        Ok(())
    }
}
