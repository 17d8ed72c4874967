use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use commit_audit_core::{Message, Role};
use serde::Deserialize;
use std::io::BufRead;
use std::path::Path;

// ── Raw JSONL deserialization types ──────────────────────────────────────────

/// Top-level entry in the Claude Code JSONL file.
/// Each line is one of these; only conversation turns are kept.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum RawEntry {
    #[serde(rename = "user")]
    User(RawConversationEntry),
    #[serde(rename = "assistant")]
    Assistant(RawConversationEntry),
    // summary, system, progress, file-history-snapshot, ...
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawConversationEntry {
    #[serde(default)]
    pub(crate) session_id: Option<String>,
    #[serde(default)]
    pub(crate) timestamp: Option<String>,
    pub(crate) message: RawMessage,
    /// Subagent traffic interleaved into the parent transcript
    #[serde(default)]
    pub(crate) is_sidechain: bool,
    /// Injected context (command output, caveats) rather than a typed prompt
    #[serde(default)]
    pub(crate) is_meta: bool,
    #[serde(default)]
    pub(crate) is_compact_summary: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawMessage {
    #[serde(default)]
    pub(crate) role: String,
    #[serde(default)]
    pub(crate) content: Option<RawContent>,
}

/// User content is either a plain string or an array of content blocks;
/// assistant content is always blocks.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawContent {
    Text(String),
    Blocks(Vec<RawContentBlock>),
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawContentBlock {
    Typed(TypedBlock),
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum TypedBlock {
    #[serde(rename = "text")]
    Text {
        #[serde(default)]
        text: String,
    },
    // tool_use, tool_result, thinking, image, ...
    #[serde(other)]
    Other,
}

// ── Parsing logic ───────────────────────────────────────────────────────────

/// Parse one transcript file into human/assistant messages in file order.
///
/// Unreadable lines and records that fail to deserialize are skipped; only a
/// file that cannot be opened is an error.
pub(crate) fn parse_claude_code_jsonl(path: &Path) -> Result<Vec<Message>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open JSONL file: {}", path.display()))?;
    let reader = std::io::BufReader::new(file);
    let fallback_session_id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string();

    let mut messages = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line = match line_result {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!("Failed to read JSONL line {} of {}: {}", line_no + 1, path.display(), e);
                continue;
            }
        };
        if let Some(message) = parse_line(&line, &fallback_session_id) {
            messages.push(message);
        }
    }
    Ok(messages)
}

/// Turn one JSONL line into a [`Message`], or `None` when the line carries no
/// human/assistant text.
pub(crate) fn parse_line(line: &str, fallback_session_id: &str) -> Option<Message> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let entry: RawEntry = match serde_json::from_str(line) {
        Ok(e) => e,
        Err(e) => {
            tracing::debug!("Skipping unparseable JSONL line: {}", e);
            return None;
        }
    };

    let conv = match entry {
        RawEntry::User(conv) | RawEntry::Assistant(conv) => conv,
        RawEntry::Unknown => return None,
    };
    if conv.is_sidechain || conv.is_meta || conv.is_compact_summary {
        return None;
    }

    let role = match conv.message.role.as_str() {
        "user" => Role::Human,
        "assistant" => Role::Assistant,
        _ => return None,
    };

    let timestamp = match conv.timestamp.as_deref().map(parse_timestamp) {
        Some(Ok(ts)) => ts,
        Some(Err(e)) => {
            tracing::debug!("Skipping entry: {:#}", e);
            return None;
        }
        None => return None,
    };

    let text = conv
        .message
        .content
        .as_ref()
        .map(extract_text_content)
        .unwrap_or_default();
    if text.is_empty() {
        return None;
    }

    Some(Message {
        role,
        text,
        timestamp,
        session_id: conv
            .session_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| fallback_session_id.to_string()),
    })
}

/// Keep only prose: a trimmed string, or the trimmed `text` blocks joined by
/// a blank line. Tool calls, tool results and thinking blocks are dropped.
pub(crate) fn extract_text_content(content: &RawContent) -> String {
    match content {
        RawContent::Text(text) => text.trim().to_string(),
        RawContent::Blocks(blocks) => blocks
            .iter()
            .filter_map(|block| match block {
                RawContentBlock::Typed(TypedBlock::Text { text }) => {
                    let trimmed = text.trim();
                    (!trimmed.is_empty()).then_some(trimmed)
                }
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
        RawContent::Other(_) => String::new(),
    }
}

/// Claude Code timestamps are ISO 8601, e.g. "2026-02-06T04:46:17.839Z".
/// Timestamps without an offset are read as UTC.
pub(crate) fn parse_timestamp(ts: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f").map(|ndt| ndt.and_utc()))
        .or_else(|_| NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S%.f").map(|ndt| ndt.and_utc()))
        .with_context(|| format!("Failed to parse timestamp: {}", ts))
}
