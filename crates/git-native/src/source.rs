use std::path::{Path, PathBuf};

use commit_audit_core::Commit;
use commit_audit_core::source::CommitSource;

use crate::error::{GitSourceError, Result};
use crate::log::{LOG_FORMAT, parse_log};
use crate::ops::{discover_repo_root, git_cmd, run_git};

/// Commit history of one repository, across all refs.
#[derive(Debug, Clone)]
pub struct GitCommitSource {
    repo_root: PathBuf,
    author: Option<String>,
}

impl GitCommitSource {
    /// Locate the repository containing `path`.
    pub fn discover(path: &Path) -> Result<Self> {
        Ok(Self {
            repo_root: discover_repo_root(path)?,
            author: None,
        })
    }

    /// Restrict history to commits whose author matches `pattern`, with the
    /// semantics of `git log --author`.
    pub fn with_author(mut self, pattern: Option<String>) -> Self {
        self.author = pattern.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }
}

impl CommitSource for GitCommitSource {
    type Error = GitSourceError;

    fn commits(&self) -> Result<Vec<Commit>> {
        let author_arg = self.author.as_ref().map(|a| format!("--author={a}"));
        let mut args = vec!["log", "--all", LOG_FORMAT];
        if let Some(arg) = author_arg.as_deref() {
            args.push(arg);
        }

        let raw = run_git(&self.repo_root, &args)?;
        let commits = parse_log(&raw);
        tracing::debug!(count = commits.len(), repo = %self.repo_root.display(), "read git history");
        Ok(commits)
    }

    fn change_summary(&self, hash: &str) -> Option<String> {
        git_cmd(
            &self.repo_root,
            &["diff-tree", "--root", "--stat", "--no-commit-id", "-r", hash],
        )
    }
}
