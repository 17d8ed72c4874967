mod parse;

use anyhow::Result;
use commit_audit_core::source::SessionSource;
use commit_audit_core::{Message, Session};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Claude Code transcripts of one project: every top-level `*.jsonl` file in
/// the project's directory under `~/.claude/projects`.
#[derive(Debug, Clone)]
pub struct ClaudeProjectSource {
    dir: PathBuf,
}

impl ClaudeProjectSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Transcript files in name order, subagent transcripts excluded.
    pub fn transcript_files(&self) -> Vec<PathBuf> {
        let pattern = format!("{}/*.jsonl", glob::Pattern::escape(&self.dir.to_string_lossy()));
        let mut files: Vec<PathBuf> = glob::glob(&pattern)
            .map(|paths| paths.filter_map(|path| path.ok()).collect())
            .unwrap_or_default();
        files.retain(|path| path.is_file() && !is_claude_subagent_path(path));
        files.sort();
        files
    }
}

/// Sessions read in one pass over a transcript directory.
#[derive(Debug, Clone)]
pub struct Transcripts {
    pub sessions: Vec<Session>,
    /// Transcript files found, readable or not
    pub file_count: usize,
}

impl ClaudeProjectSource {
    /// Parse every transcript and group messages by session id.
    ///
    /// Sessions appear in the order their id is first seen while walking the
    /// files in name order. A file that cannot be read is skipped with a
    /// warning; sessions left without any message are dropped.
    pub fn load(&self) -> Result<Transcripts> {
        let files = self.transcript_files();
        let file_count = files.len();
        let mut order: Vec<String> = Vec::new();
        let mut grouped: HashMap<String, Vec<Message>> = HashMap::new();

        for path in files {
            let messages = match parse::parse_claude_code_jsonl(&path) {
                Ok(messages) => messages,
                Err(e) => {
                    tracing::warn!("Skipping transcript {}: {:#}", path.display(), e);
                    continue;
                }
            };
            tracing::debug!(file = %path.display(), messages = messages.len(), "parsed transcript");

            for message in messages {
                let bucket = grouped.entry(message.session_id.clone()).or_insert_with(|| {
                    order.push(message.session_id.clone());
                    Vec::new()
                });
                bucket.push(message);
            }
        }

        let sessions = order
            .into_iter()
            .filter_map(|id| {
                let messages = grouped.remove(&id)?;
                Session::new(id, messages)
            })
            .collect();
        Ok(Transcripts {
            sessions,
            file_count,
        })
    }
}

impl SessionSource for ClaudeProjectSource {
    type Error = anyhow::Error;

    fn sessions(&self) -> Result<Vec<Session>> {
        Ok(self.load()?.sessions)
    }
}

/// Subagent transcripts (`agent-*.jsonl`, `subagents/…`) duplicate work the
/// parent session already reports.
pub fn is_claude_subagent_path(path: &Path) -> bool {
    let path_text = path.to_string_lossy();
    if path_text.contains("/subagents/") || path_text.contains("\\subagents\\") {
        return true;
    }

    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let lower = name.to_ascii_lowercase();
    lower.starts_with("agent-")
        || lower.starts_with("agent_")
        || lower.starts_with("subagent-")
        || lower.starts_with("subagent_")
}
