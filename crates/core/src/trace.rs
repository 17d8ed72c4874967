use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Number of leading hash characters used for short commit ids and document names.
pub const SHORT_HASH_LEN: usize = 10;

/// A commit as delivered by the commit source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Full object id (40 hex characters for SHA-1 repositories)
    pub hash: String,
    /// Author date, keeping the offset the author committed with
    pub timestamp: DateTime<FixedOffset>,
    pub author_name: String,
    pub author_email: String,
    /// First line of the message
    pub subject: String,
    /// Full message, subject included, trimmed
    pub message: String,
}

impl Commit {
    pub fn short_hash(&self) -> &str {
        match self.hash.char_indices().nth(SHORT_HASH_LEN) {
            Some((end, _)) => &self.hash[..end],
            None => &self.hash,
        }
    }

    /// The commit time on the UTC axis every comparison is made on.
    pub fn time_utc(&self) -> DateTime<Utc> {
        self.timestamp.with_timezone(&Utc)
    }

    /// `Name <email>` as shown in documents.
    pub fn author(&self) -> String {
        format!("{} <{}>", self.author_name, self.author_email)
    }
}

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Human,
    Assistant,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Human => "🧑 Human",
            Self::Assistant => "🤖 Assistant",
        }
    }
}

/// One human or assistant turn extracted from a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    /// Plain text content, never empty
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
}

/// Inclusive `[start, end]` span covered by a session's messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A session transcript: an id and its messages in time order.
///
/// The time range is derived once when the session is built. There is no way
/// to mutate the message list afterwards; building a new `Session` is the only
/// way to change it, which keeps the cached range honest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    session_id: String,
    messages: Vec<Message>,
    range: TimeRange,
}

impl Session {
    /// Build a session, stably sorting messages by timestamp.
    ///
    /// Returns `None` for an empty message list: a session without messages
    /// has no time range and can never match a commit.
    pub fn new(session_id: impl Into<String>, mut messages: Vec<Message>) -> Option<Self> {
        messages.sort_by_key(|m| m.timestamp);
        let range = TimeRange {
            start: messages.first()?.timestamp,
            end: messages.last()?.timestamp,
        };
        Some(Self {
            session_id: session_id.into(),
            messages,
            range,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn time_range(&self) -> TimeRange {
        self.range
    }
}
