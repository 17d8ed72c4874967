//! Locating a repository's Claude Code transcript directory.
//!
//! Claude Code keeps one directory per project under `~/.claude/projects`,
//! named after the project path with separators replaced by `-`. The exact
//! encoding has changed between releases, so detection tries the known
//! encodings first and then falls back to fuzzy name matching. None of this
//! is guaranteed; `--session-dir` is the escape hatch.

use anyhow::{Result, bail};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Characters older releases replace with `-`.
static LEGACY_ENCODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[/\\\s~]").unwrap());

/// Newer releases replace every non-alphanumeric character.
static STRICT_ENCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9-]").unwrap());

/// How the session directory was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// Given explicitly on the command line
    Override,
    /// Directory name equals an encoding of the repository path
    Exact,
    /// Fuzzy name match
    Heuristic,
}

impl Detection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::Exact => "exact",
            Self::Heuristic => "heuristic",
        }
    }
}

/// A resolved transcript directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDir {
    pub path: PathBuf,
    pub detection: Detection,
}

/// Encode a project path the way Claude Code names its project directories.
pub fn encode_project_path(path: &Path) -> String {
    LEGACY_ENCODE_RE
        .replace_all(&path.to_string_lossy(), "-")
        .into_owned()
}

fn encode_project_path_strict(path: &Path) -> String {
    STRICT_ENCODE_RE
        .replace_all(&path.to_string_lossy(), "-")
        .into_owned()
}

/// Expand `~` and environment variables in a user-supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
    }
}

/// Find the transcript directory for `repo_root` under `projects_root`.
pub fn find_session_dir(projects_root: &Path, repo_root: &Path) -> Option<SessionDir> {
    if !projects_root.is_dir() {
        return None;
    }

    for encoded in [
        encode_project_path(repo_root),
        encode_project_path_strict(repo_root),
    ] {
        let candidate = projects_root.join(&encoded);
        if candidate.is_dir() {
            return Some(SessionDir {
                path: candidate,
                detection: Detection::Exact,
            });
        }
    }

    let mut entries: Vec<PathBuf> = std::fs::read_dir(projects_root)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    entries.sort();

    let repo_str = repo_root.to_string_lossy();
    let repo_name = repo_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let root_parts: Vec<&str> = repo_str
        .trim_matches('/')
        .split('/')
        .filter(|part| !part.is_empty())
        .collect();

    entries
        .into_iter()
        .find(|entry| {
            let Some(name) = entry.file_name().and_then(|n| n.to_str()) else {
                return false;
            };
            if name.replace('-', "/").ends_with(repo_str.as_ref()) {
                return true;
            }
            if repo_name.is_empty() || !name.contains(&repo_name) {
                return false;
            }
            let entry_parts: Vec<&str> = name.trim_matches('-').split('-').collect();
            root_parts.iter().all(|part| entry_parts.contains(part))
        })
        .map(|path| SessionDir {
            path,
            detection: Detection::Heuristic,
        })
}

/// Resolve the transcript directory once for the whole run.
///
/// An explicit override must exist. Without one, auto-detection failure is
/// fatal and the error tells the operator how to find the directory by hand.
pub fn resolve_session_dir(
    override_dir: Option<&str>,
    projects_root: &str,
    repo_root: &Path,
) -> Result<SessionDir> {
    if let Some(raw) = override_dir {
        let path = expand_path(raw);
        if !path.is_dir() {
            bail!(
                "specified session directory does not exist: {}",
                path.display()
            );
        }
        return Ok(SessionDir {
            path,
            detection: Detection::Override,
        });
    }

    let projects_root = expand_path(projects_root);
    if let Some(found) = find_session_dir(&projects_root, repo_root) {
        return Ok(found);
    }

    let repo_name = repo_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    bail!(
        "could not find Claude Code session directory for this project\n  \
         Looked in: {}\n  \
         Expected encoded path: {}\n  \
         Try: ls {} | grep {}\n  \
         Then re-run with --session-dir <path>",
        projects_root.display(),
        encode_project_path(repo_root),
        projects_root.display(),
        repo_name
    )
}
