use crate::source::CommitSource;
use crate::{Commit, Message, Role, Session};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::convert::Infallible;

/// Parse an RFC 3339 timestamp into UTC.
pub fn ts(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .expect("valid RFC 3339 timestamp")
        .with_timezone(&Utc)
}

/// Commit authored by `Test <test@example.com>` at `at` (RFC 3339, offset kept).
pub fn commit(hash: &str, at: &str, subject: &str) -> Commit {
    Commit {
        hash: hash.to_string(),
        timestamp: DateTime::parse_from_rfc3339(at).expect("valid RFC 3339 timestamp"),
        author_name: "Test".to_string(),
        author_email: "test@example.com".to_string(),
        subject: subject.to_string(),
        message: subject.to_string(),
    }
}

pub fn message(session_id: &str, role: Role, at: &str, text: &str) -> Message {
    Message {
        role,
        text: text.to_string(),
        timestamp: ts(at),
        session_id: session_id.to_string(),
    }
}

/// Session from `(role, timestamp, text)` triples. Panics when empty.
pub fn session(session_id: &str, messages: &[(Role, &str, &str)]) -> Session {
    let messages = messages
        .iter()
        .map(|(role, at, text)| message(session_id, *role, at, text))
        .collect();
    Session::new(session_id, messages).expect("test session needs at least one message")
}

/// In-memory commit source with optional per-hash change summaries.
#[derive(Debug, Default)]
pub struct StaticCommits {
    pub commits: Vec<Commit>,
    pub summaries: HashMap<String, String>,
}

impl StaticCommits {
    pub fn new(commits: Vec<Commit>) -> Self {
        Self {
            commits,
            summaries: HashMap::new(),
        }
    }

    pub fn with_summary(mut self, hash: &str, summary: &str) -> Self {
        self.summaries.insert(hash.to_string(), summary.to_string());
        self
    }
}

impl CommitSource for StaticCommits {
    type Error = Infallible;

    fn commits(&self) -> Result<Vec<Commit>, Self::Error> {
        Ok(self.commits.clone())
    }

    fn change_summary(&self, hash: &str) -> Option<String> {
        self.summaries.get(hash).cloned()
    }
}
