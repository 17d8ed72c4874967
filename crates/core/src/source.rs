//! Seams to the two external collaborators: commit history and session transcripts.

use crate::trace::{Commit, Session};

/// Yields commit records, newest first.
pub trait CommitSource {
    type Error: std::fmt::Display;

    /// Read every commit once, newest first.
    fn commits(&self) -> Result<Vec<Commit>, Self::Error>;

    /// Pre-formatted change summary for a commit, passed through verbatim.
    ///
    /// Retrieval failures degrade to `None`; they never abort a run.
    fn change_summary(&self, hash: &str) -> Option<String>;
}

/// Yields every session with at least one message, in enumeration order.
pub trait SessionSource {
    type Error: std::fmt::Display;

    fn sessions(&self) -> Result<Vec<Session>, Self::Error>;
}
