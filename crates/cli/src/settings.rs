//! Start-up resolution shared by every subcommand: repository, config file
//! merged with flags, session directory and output directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use commit_audit_core::correlate::MatchWindow;
use commit_audit_git_native::{GitCommitSource, GitSourceError};
use commit_audit_parsers::discover::{SessionDir, expand_path, resolve_session_dir};
use commit_audit_runtime_config::{AuditConfig, MatchingSettings, load_for_repo};

/// Where to look: repository, transcripts and config file.
#[derive(Debug, Clone, clap::Args)]
pub struct TargetArgs {
    /// Path to the git repository (default: current directory)
    #[arg(long, default_value = ".")]
    pub repo_path: PathBuf,

    /// Claude Code session directory (default: auto-detect under ~/.claude/projects)
    #[arg(long)]
    pub session_dir: Option<String>,

    /// Config file (default: commit-audit.toml in the repository root, if present)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Matching window overrides; unset flags keep the config file value.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct MatchingArgs {
    /// Minutes before a session's first message a commit may still match
    #[arg(long, allow_negative_numbers = true)]
    pub pre_buffer_minutes: Option<i64>,

    /// Minutes after a session's last message a commit may still match
    #[arg(long, allow_negative_numbers = true)]
    pub post_buffer_minutes: Option<i64>,

    /// Seconds after the commit a message may be and still be included
    #[arg(long, allow_negative_numbers = true)]
    pub cutoff_seconds: Option<i64>,
}

impl MatchingArgs {
    fn apply(&self, settings: &mut MatchingSettings) {
        if let Some(v) = self.pre_buffer_minutes {
            settings.pre_buffer_minutes = v;
        }
        if let Some(v) = self.post_buffer_minutes {
            settings.post_buffer_minutes = v;
        }
        if let Some(v) = self.cutoff_seconds {
            settings.cutoff_seconds = v;
        }
    }
}

/// Open the repository containing `repo_path`.
pub fn open_repo(repo_path: &Path) -> Result<GitCommitSource> {
    GitCommitSource::discover(repo_path).map_err(|e| match e {
        GitSourceError::NotARepo(path) => anyhow!(
            "not a git repository: {}\n  Run inside a repository or pass --repo-path <path>",
            path.display()
        ),
        other => anyhow::Error::new(other),
    })
}

/// Config file values with flag overrides applied, validated.
pub fn load_config(
    explicit: Option<&Path>,
    repo_root: &Path,
    overrides: &MatchingArgs,
) -> Result<AuditConfig> {
    let mut config = load_for_repo(explicit, repo_root)?;
    overrides.apply(&mut config.matching);
    config.matching.validate()?;
    Ok(config)
}

pub fn match_window(settings: &MatchingSettings) -> MatchWindow {
    MatchWindow::from_parts(
        settings.pre_buffer_minutes,
        settings.post_buffer_minutes,
        settings.cutoff_seconds,
    )
}

/// `--output-dir` as given, else the configured directory under the repository root.
pub fn output_dir(flag: Option<&str>, config: &AuditConfig, repo_root: &Path) -> PathBuf {
    match flag {
        Some(raw) => expand_path(raw),
        None => {
            let configured = expand_path(&config.output.dir_name);
            if configured.is_absolute() {
                configured
            } else {
                repo_root.join(configured)
            }
        }
    }
}

pub fn session_dir(override_dir: Option<&str>, config: &AuditConfig, repo_root: &Path) -> Result<SessionDir> {
    resolve_session_dir(override_dir, &config.sessions.projects_root, repo_root)
        .context("session directory unavailable")
}
