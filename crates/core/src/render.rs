//! Markdown rendering for per-commit audit documents and the index.
//!
//! Rendering is pure string construction. The same inputs always produce the
//! same bytes; the only wall-clock value anywhere is the index generation
//! timestamp, which the caller passes in.

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};

use crate::correlate::{CommitMatches, SessionMatch};
use crate::trace::Commit;

pub const INDEX_FILE_NAME: &str = "index.md";

/// Characters of the session id shown in section headings.
const SESSION_ID_PREVIEW_LEN: usize = 8;

/// File name of a commit's document: `<short-hash>.md`.
pub fn document_file_name(commit: &Commit) -> String {
    format!("{}.md", commit.short_hash())
}

/// `YYYY-MM-DD HH:MM:SS <zone>`, zone rendered as the offset for fixed-offset times.
pub fn format_timestamp<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%Y-%m-%d %H:%M:%S %Z").to_string()
}

/// Escape a value for a double-quoted YAML scalar.
pub fn escape_yaml_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render the audit document for one commit.
///
/// `prev` and `next` are the chronologically adjacent *audited* commits.
/// `change_summary` is emitted verbatim inside a fenced block.
pub fn render_commit_document(
    commit: &Commit,
    sessions: &[SessionMatch<'_>],
    change_summary: Option<&str>,
    prev: Option<&Commit>,
    next: Option<&Commit>,
) -> String {
    let mut md = String::new();

    md.push_str("---\n");
    md.push_str(&format!("commit: \"{}\"\n", commit.hash));
    md.push_str(&format!("date: \"{}\"\n", commit.timestamp.to_rfc3339()));
    md.push_str(&format!("author: \"{}\"\n", escape_yaml_string(&commit.author())));
    md.push_str(&format!("subject: \"{}\"\n", escape_yaml_string(&commit.subject)));
    let session_ids: Vec<&str> = sessions.iter().map(|s| s.session_id).collect();
    md.push_str(&format!(
        "sessions: {}\n",
        serde_json::to_string(&session_ids).unwrap_or_else(|_| "[]".to_string())
    ));
    if let Some(prev) = prev {
        md.push_str(&format!("prev: \"{}\"\n", document_file_name(prev)));
    }
    if let Some(next) = next {
        md.push_str(&format!("next: \"{}\"\n", document_file_name(next)));
    }
    md.push_str("---\n\n");

    let nav = navigation_line(prev, next);
    md.push_str(&nav);
    md.push_str("\n\n");

    md.push_str(&format!("# Commit {}\n\n", commit.short_hash()));
    md.push_str(&format!("**Date:** {}  \n", format_timestamp(&commit.timestamp)));
    md.push_str(&format!("**Author:** {}\n\n", commit.author()));

    md.push_str("## Commit message\n\n");
    md.push_str(&commit.message);
    md.push_str("\n\n");

    if let Some(summary) = change_summary.filter(|s| !s.is_empty()) {
        md.push_str("## Changed files\n\n```\n");
        md.push_str(summary);
        md.push_str("\n```\n\n");
    }

    let numbered = sessions.len() > 1;
    for (idx, session) in sessions.iter().enumerate() {
        append_session(&mut md, session, numbered.then_some(idx + 1));
    }

    md.push_str("---\n\n");
    md.push_str(&nav);
    md.push('\n');
    md
}

fn append_session(md: &mut String, session: &SessionMatch<'_>, number: Option<usize>) {
    let preview: String = session
        .session_id
        .chars()
        .take(SESSION_ID_PREVIEW_LEN)
        .collect();
    match number {
        Some(n) => md.push_str(&format!("## Session {n} (`{preview}…`)\n\n")),
        None => md.push_str(&format!("## Session `{preview}…`\n\n")),
    }

    if let (Some(start), Some(end)) = (session.start(), session.end()) {
        md.push_str(&format!(
            "*{} → {}*\n\n",
            format_timestamp(&start),
            format_timestamp(&end)
        ));
    }

    for message in session.messages {
        md.push_str(&format!(
            "### {} ({})\n\n",
            message.role.label(),
            message.timestamp.format("%H:%M:%S")
        ));
        md.push_str(&message.text);
        md.push_str("\n\n");
    }
}

/// `[← Previous (x)](x.md) | [Index](index.md) | [Next (y) →](y.md)`, absent ends omitted.
pub fn navigation_line(prev: Option<&Commit>, next: Option<&Commit>) -> String {
    let mut parts = Vec::with_capacity(3);
    if let Some(prev) = prev {
        parts.push(format!(
            "[← Previous ({})]({})",
            prev.short_hash(),
            document_file_name(prev)
        ));
    }
    parts.push(format!("[Index]({INDEX_FILE_NAME})"));
    if let Some(next) = next {
        parts.push(format!(
            "[Next ({}) →]({})",
            next.short_hash(),
            document_file_name(next)
        ));
    }
    parts.join(" | ")
}

/// Everything the index needs besides the audited list.
#[derive(Debug, Clone)]
pub struct IndexContext<'a> {
    /// Commits read from the source, matched or not
    pub total_commits: usize,
    pub repo_root: &'a Path,
    pub generated_at: DateTime<Utc>,
}

/// Render `index.md` for the audited commits (oldest-first).
pub fn render_index(audited: &[CommitMatches<'_>], ctx: &IndexContext<'_>) -> String {
    let repo = ctx.repo_root.display().to_string();
    let mut md = String::new();

    md.push_str("---\n");
    md.push_str(&format!("repo: \"{}\"\n", escape_yaml_string(&repo)));
    md.push_str(&format!("total_commits: {}\n", ctx.total_commits));
    md.push_str(&format!("audited_commits: {}\n", audited.len()));
    md.push_str(&format!("generated: \"{}\"\n", ctx.generated_at.to_rfc3339()));
    md.push_str("---\n\n");

    md.push_str("# Claude Code Audit Log\n\n");
    md.push_str(&format!("Repository: `{repo}`  \n"));
    md.push_str(&format!("Total commits: {}  \n", ctx.total_commits));
    md.push_str(&format!(
        "Commits with Claude Code sessions: {}\n\n",
        audited.len()
    ));
    md.push_str("## Commits\n\n");

    for entry in audited {
        let commit = entry.commit;
        md.push_str(&format!(
            "- [{short}]({file}) — {date} — {subject} ({sessions}, {messages})\n",
            short = commit.short_hash(),
            file = document_file_name(commit),
            date = commit.timestamp.format("%Y-%m-%d %H:%M"),
            subject = commit.subject,
            sessions = plural(entry.sessions.len(), "session"),
            messages = plural(entry.message_count(), "message"),
        ));
    }

    md
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correlate::{MatchWindow, audit_order, correlate};
    use crate::testing::{commit, session, ts};
    use crate::trace::{Role, Session};

    fn fixture() -> (Vec<Commit>, Vec<Session>) {
        let mut c = commit(
            "1111111111aaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            "2026-03-01T12:00:00+02:00",
            "Add \"quoted\" parser",
        );
        c.message = "Add \"quoted\" parser\n\nBody line.".to_string();
        let commits = vec![c];
        let sessions = vec![session(
            "5f0c3a1e-0000-4000-8000-000000000000",
            &[
                (Role::Human, "2026-03-01T09:50:00Z", "Please add a parser."),
                (Role::Assistant, "2026-03-01T09:58:00Z", "Added it."),
            ],
        )];
        (commits, sessions)
    }

    #[test]
    fn document_layout_is_stable() {
        let (commits, sessions) = fixture();
        let matched = correlate(&commits, &sessions, &MatchWindow::default());
        let prev = commit("0000000000bbbbbbbbbbbbbbbbbbbbbbbbbbbbbb", "2026-03-01T08:00:00Z", "p");

        let doc = render_commit_document(
            matched[0].commit,
            &matched[0].sessions,
            Some(" src/parser.rs | 10 ++++++++++\n 1 file changed, 10 insertions(+)"),
            Some(&prev),
            None,
        );

        let expected = "\
---
commit: \"1111111111aaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\"
date: \"2026-03-01T12:00:00+02:00\"
author: \"Test <test@example.com>\"
subject: \"Add \\\"quoted\\\" parser\"
sessions: [\"5f0c3a1e-0000-4000-8000-000000000000\"]
prev: \"0000000000.md\"
---

[← Previous (0000000000)](0000000000.md) | [Index](index.md)

# Commit 1111111111

**Date:** 2026-03-01 12:00:00 +02:00\x20\x20
**Author:** Test <test@example.com>

## Commit message

Add \"quoted\" parser

Body line.

## Changed files

```
 src/parser.rs | 10 ++++++++++
 1 file changed, 10 insertions(+)
```

## Session `5f0c3a1e…`

*2026-03-01 09:50:00 UTC → 2026-03-01 09:58:00 UTC*

### 🧑 Human (09:50:00)

Please add a parser.

### 🤖 Assistant (09:58:00)

Added it.

---

[← Previous (0000000000)](0000000000.md) | [Index](index.md)
";
        assert_eq!(doc, expected);
    }

    #[test]
    fn rendering_is_deterministic() {
        let (commits, sessions) = fixture();
        let matched = correlate(&commits, &sessions, &MatchWindow::default());
        let first = render_commit_document(matched[0].commit, &matched[0].sessions, None, None, None);
        let second = render_commit_document(matched[0].commit, &matched[0].sessions, None, None, None);
        assert_eq!(first, second);
        assert!(!first.contains("## Changed files"));
    }

    #[test]
    fn multiple_sessions_are_numbered() {
        let commits = vec![commit("c1", "2026-03-01T10:00:00Z", "x")];
        let sessions = vec![
            session("aaaaaaaaaaaa", &[(Role::Human, "2026-03-01T09:59:00Z", "one")]),
            session("bbbbbbbbbbbb", &[(Role::Human, "2026-03-01T09:58:00Z", "two")]),
        ];
        let matched = correlate(&commits, &sessions, &MatchWindow::default());
        let doc = render_commit_document(matched[0].commit, &matched[0].sessions, None, None, None);

        assert!(doc.contains("## Session 1 (`aaaaaaaa…`)"));
        assert!(doc.contains("## Session 2 (`bbbbbbbb…`)"));
        assert!(doc.contains("sessions: [\"aaaaaaaaaaaa\",\"bbbbbbbbbbbb\"]"));
    }

    #[test]
    fn navigation_line_includes_both_neighbors() {
        let prev = commit("aaaaaaaaaa11", "2026-03-01T09:00:00Z", "p");
        let next = commit("bbbbbbbbbb22", "2026-03-01T11:00:00Z", "n");
        assert_eq!(
            navigation_line(Some(&prev), Some(&next)),
            "[← Previous (aaaaaaaaaa)](aaaaaaaaaa.md) | [Index](index.md) | [Next (bbbbbbbbbb) →](bbbbbbbbbb.md)"
        );
        assert_eq!(navigation_line(None, None), "[Index](index.md)");
    }

    #[test]
    fn index_lists_audited_commits_with_counts() {
        let commits = vec![
            commit("2222222222", "2026-03-01T11:00:00Z", "second"),
            commit("1111111111", "2026-03-01T10:00:00Z", "first"),
        ];
        let sessions = vec![session(
            "s1",
            &[
                (Role::Human, "2026-03-01T09:59:00Z", "a"),
                (Role::Assistant, "2026-03-01T10:30:00Z", "b"),
                (Role::Human, "2026-03-01T10:59:00Z", "c"),
            ],
        )];
        let audited = audit_order(correlate(&commits, &sessions, &MatchWindow::default()));

        let ctx = IndexContext {
            total_commits: 5,
            repo_root: Path::new("/work/repo"),
            generated_at: ts("2026-03-02T00:00:00Z"),
        };
        let index = render_index(&audited, &ctx);

        assert!(index.contains("repo: \"/work/repo\"\n"));
        assert!(index.contains("total_commits: 5\n"));
        assert!(index.contains("audited_commits: 2\n"));
        assert!(index.contains("generated: \"2026-03-02T00:00:00+00:00\"\n"));
        let first = index
            .find("- [1111111111](1111111111.md) — 2026-03-01 10:00 — first (1 session, 1 message)")
            .expect("first entry");
        let second = index
            .find("- [2222222222](2222222222.md) — 2026-03-01 11:00 — second (1 session, 3 messages)")
            .expect("second entry");
        assert!(first < second);
    }
}
