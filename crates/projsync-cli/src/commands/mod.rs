//! CLI subcommands and the helpers they share
//!
//! Every command receives a [`CliContext`] holding the resolved project root,
//! the application configuration, and the output settings.

pub mod create;
pub mod info;
pub mod init;
pub mod status;
pub mod update;

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use projsync_core::config::Config;
use projsync_core::domain::file::LocalFile;
use projsync_core::domain::newtypes::RelativePath;
use projsync_core::domain::report::SyncReport;
use projsync_core::ignore::IgnoreRuleSet;
use projsync_core::project::ProjectConfig;
use projsync_core::structure::{render_structure, STRUCTURE_FILE_NAME};
use projsync_remote::client::ApiClient;
use projsync_remote::provider::ClaudeProjectsProvider;
use projsync_remote::session::resolve_session_key;
use projsync_sync::{Collection, FileTreeCollector, SyncEngine, SyncOptions};

use crate::output::{format_duration, get_formatter, OutputFormat, OutputFormatter};

/// Settings shared by every command
pub struct CliContext {
    pub format: OutputFormat,
    pub quiet: bool,
    pub config: Config,
    pub config_path: PathBuf,
    /// Canonical project root
    pub root: PathBuf,
}

impl CliContext {
    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.format, self.quiet)
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Fails when the app config has errors that would break remote calls
    pub fn require_valid_config(&self) -> Result<()> {
        let errors = self.config.validate();
        if errors.is_empty() {
            return Ok(());
        }
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!(
            "Invalid configuration in {}: {}",
            self.config_path.display(),
            messages.join("; ")
        )
    }

    /// Keyring username for this project
    pub fn account(&self) -> String {
        self.root.display().to_string()
    }

    /// Loads the project config, failing if `init` has not been run
    pub fn load_project(&self) -> Result<ProjectConfig> {
        ProjectConfig::load(&self.root)?.with_context(|| {
            format!(
                "{} is not initialized. Run 'projsync init --session-key <KEY>' first.",
                self.root.display()
            )
        })
    }

    /// Connects to the remote service for `project`
    ///
    /// Reuses the organization stored in the project config when present.
    pub async fn connect(&self, project: &ProjectConfig) -> Result<ClaudeProjectsProvider> {
        let (session_key, source) = resolve_session_key(&self.account())?.with_context(|| {
            "No session key found. Run 'projsync init --session-key <KEY>' or set PROJSYNC_SESSION_KEY."
        })?;
        debug!(source = %source, "Resolved session key");

        let client = ApiClient::new(session_key, &self.config.remote)?;
        match &project.organization_id {
            Some(org) => Ok(ClaudeProjectsProvider::new(client, org.clone())),
            None => ClaudeProjectsProvider::connect(client)
                .await
                .context("Failed to select an organization"),
        }
    }

    /// Builds a sync engine over `provider` using the app config
    pub fn engine(&self, provider: ClaudeProjectsProvider) -> SyncEngine {
        SyncEngine::new(Arc::new(provider), SyncOptions::from_config(&self.config))
    }
}

/// Loads the ignore rules of `project` and collects its files
pub fn collect(project: &ProjectConfig) -> Result<Collection> {
    let rules = IgnoreRuleSet::from_file(&project.ignore_path())?;
    let collection = FileTreeCollector::collect(&project.root, &rules)?;
    info!(
        files = collection.files.len(),
        warnings = collection.warnings.len(),
        "Collected project files"
    );
    Ok(collection)
}

/// The generated structure document for `files` under `project`
///
/// Returns `None` when a collected file already uses the document's name.
pub fn structure_file(project: &ProjectConfig, files: &[LocalFile]) -> Result<Option<LocalFile>> {
    let path = RelativePath::new(STRUCTURE_FILE_NAME.to_string())?;
    if files.iter().any(|f| f.path() == &path) {
        return Ok(None);
    }
    let root_name = project
        .root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());
    let text = render_structure(&root_name, files.iter().map(LocalFile::path));
    Ok(Some(LocalFile::new(path, text.into_bytes())))
}

/// Whether `path` names the generated structure document
pub fn is_structure_file(path: &RelativePath) -> bool {
    path.as_str() == STRUCTURE_FILE_NAME
}

/// Asks a yes/no question on stderr; `assume_yes` skips the prompt
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    let mut stderr = std::io::stderr();
    write!(stderr, "{prompt} [y/N] ")?;
    stderr.flush()?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Prints the outcome of a run and fails if anything went wrong
pub fn print_report(ctx: &CliContext, title: &str, report: &SyncReport) -> Result<()> {
    let formatter = ctx.formatter();

    if ctx.is_json() {
        let json = serde_json::to_value(report).context("Failed to serialize sync report")?;
        formatter.print_json(&json);
    } else {
        formatter.success(title);
        formatter.info(&format!("Uploaded:  {}", report.files_uploaded()));
        formatter.info(&format!("Deleted:   {}", report.files_deleted()));
        formatter.info(&format!("Duration:  {}", format_duration(report.duration_ms)));
        for failure in &report.failures {
            formatter.warn(&failure.to_string());
        }
    }

    if report.has_failures() {
        let summary: Vec<String> = report.errors().iter().map(ToString::to_string).collect();
        bail!(
            "{} failure(s) during sync: {}",
            report.failures.len(),
            summary.join("; ")
        );
    }
    Ok(())
}
