use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{GitSourceError, Result};

/// Find the repository containing `path` and return its working tree root.
///
/// Returns [`GitSourceError::NotARepo`] when `path` does not exist or no
/// repository is found walking upwards. Bare repositories resolve to their
/// git directory.
pub fn discover_repo_root(path: &Path) -> Result<PathBuf> {
    let absolute =
        std::fs::canonicalize(path).map_err(|_| GitSourceError::NotARepo(path.to_path_buf()))?;
    let repo = gix::discover(&absolute).map_err(|e| {
        tracing::debug!("repository discovery failed for {}: {}", absolute.display(), e);
        GitSourceError::NotARepo(absolute.clone())
    })?;

    let root = repo.workdir().unwrap_or_else(|| repo.git_dir());
    Ok(std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf()))
}

/// Run `git -C <repo_root> <args>` and return stdout.
///
/// A non-zero exit status is an error carrying git's stderr.
pub fn run_git(repo_root: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_root)
        .args(args)
        .output()?;

    if !output.status.success() {
        return Err(GitSourceError::Command {
            command: args.first().copied().unwrap_or_default().to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Like [`run_git`], but any failure or empty output is `None`.
pub fn git_cmd(repo_root: &Path, args: &[&str]) -> Option<String> {
    let stdout = match run_git(repo_root, args) {
        Ok(stdout) => stdout,
        Err(e) => {
            tracing::debug!("{}", e);
            return None;
        }
    };
    let trimmed = stdout.trim_end();
    if trimmed.trim().is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
