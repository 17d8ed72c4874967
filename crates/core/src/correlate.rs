//! Commit ↔ session correlation by buffered time windows.
//!
//! A session is relevant to a commit when the commit time falls inside
//! `[session_start - pre_buffer, session_end + post_buffer]`. For a relevant
//! session, only messages up to `commit_time + cutoff` are kept; a session
//! left with no messages after that cut is dropped.
//!
//! Matching is a plain scan over every (commit, session) pair and borrows
//! from the owned inputs, so matches are recomputed on every run and never
//! stored.

use chrono::{DateTime, Duration, Utc};

use crate::trace::{Commit, Message, Session};

pub const DEFAULT_PRE_BUFFER_MINUTES: i64 = 15;
pub const DEFAULT_POST_BUFFER_MINUTES: i64 = 5;
pub const DEFAULT_CUTOFF_SECONDS: i64 = 60;

/// Tolerances applied around a session's time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchWindow {
    /// Slack before the first message (work often starts before the first prompt)
    pub pre_buffer: Duration,
    /// Slack after the last message (the commit may land after the last reply)
    pub post_buffer: Duration,
    /// How far past the commit a message may be and still count as its context
    pub cutoff: Duration,
}

impl Default for MatchWindow {
    fn default() -> Self {
        Self::from_parts(
            DEFAULT_PRE_BUFFER_MINUTES,
            DEFAULT_POST_BUFFER_MINUTES,
            DEFAULT_CUTOFF_SECONDS,
        )
    }
}

impl MatchWindow {
    /// Values beyond what a `Duration` can hold saturate to `Duration::MAX`.
    pub fn from_parts(pre_buffer_minutes: i64, post_buffer_minutes: i64, cutoff_seconds: i64) -> Self {
        Self {
            pre_buffer: Duration::try_minutes(pre_buffer_minutes).unwrap_or(Duration::MAX),
            post_buffer: Duration::try_minutes(post_buffer_minutes).unwrap_or(Duration::MAX),
            cutoff: Duration::try_seconds(cutoff_seconds).unwrap_or(Duration::MAX),
        }
    }

    /// Whether `at` falls inside the session's buffered window (inclusive).
    ///
    /// A bound that falls outside the representable time range is open.
    pub fn contains(&self, session: &Session, at: DateTime<Utc>) -> bool {
        let range = session.time_range();
        let lower = range.start.checked_sub_signed(self.pre_buffer);
        let upper = range.end.checked_add_signed(self.post_buffer);
        lower.is_none_or(|lower| lower <= at) && upper.is_none_or(|upper| at <= upper)
    }

    /// Messages of `session` at or before `at + cutoff`.
    ///
    /// Messages are time-sorted, so the result is always a prefix.
    pub fn relevant_messages<'a>(&self, session: &'a Session, at: DateTime<Utc>) -> &'a [Message] {
        let messages = session.messages();
        let Some(cutoff) = at.checked_add_signed(self.cutoff) else {
            return messages;
        };
        let end = messages.partition_point(|m| m.timestamp <= cutoff);
        &messages[..end]
    }
}

/// One session's contribution to a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionMatch<'a> {
    pub session_id: &'a str,
    /// Non-empty, time-ordered
    pub messages: &'a [Message],
}

impl SessionMatch<'_> {
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.messages.first().map(|m| m.timestamp)
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.messages.last().map(|m| m.timestamp)
    }
}

/// A commit together with every session that matched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMatches<'a> {
    pub commit: &'a Commit,
    /// In session-source enumeration order
    pub sessions: Vec<SessionMatch<'a>>,
}

impl CommitMatches<'_> {
    pub fn session_ids(&self) -> Vec<&str> {
        self.sessions.iter().map(|s| s.session_id).collect()
    }

    pub fn message_count(&self) -> usize {
        self.sessions.iter().map(|s| s.messages.len()).sum()
    }
}

/// Sessions relevant to a single commit, in `sessions` order.
pub fn match_commit<'a>(
    commit: &'a Commit,
    sessions: &'a [Session],
    window: &MatchWindow,
) -> Vec<SessionMatch<'a>> {
    let at = commit.time_utc();
    sessions
        .iter()
        .filter(|session| window.contains(session, at))
        .filter_map(|session| {
            let messages = window.relevant_messages(session, at);
            if messages.is_empty() {
                return None;
            }
            Some(SessionMatch {
                session_id: session.session_id(),
                messages,
            })
        })
        .collect()
}

/// Match every commit against every session.
///
/// Commits without a single match are left out. The result keeps the order
/// commits were delivered in; see [`audit_order`] for navigation order.
pub fn correlate<'a>(
    commits: &'a [Commit],
    sessions: &'a [Session],
    window: &MatchWindow,
) -> Vec<CommitMatches<'a>> {
    commits
        .iter()
        .filter_map(|commit| {
            let matched = match_commit(commit, sessions, window);
            if matched.is_empty() {
                tracing::debug!(commit = commit.short_hash(), "no session overlaps commit");
                return None;
            }
            Some(CommitMatches {
                commit,
                sessions: matched,
            })
        })
        .collect()
}

/// Reorder matched commits oldest-first.
///
/// Input is expected newest-first (as git delivers it); reversing before the
/// stable sort keeps equal timestamps in oldest-delivered-first order.
pub fn audit_order(mut matched: Vec<CommitMatches<'_>>) -> Vec<CommitMatches<'_>> {
    matched.reverse();
    matched.sort_by_key(|m| m.commit.time_utc());
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{commit, session, ts};
    use crate::trace::Role;

    fn single_message_session(id: &str, start: &str, end: &str) -> Session {
        session(
            id,
            &[(Role::Human, start, "start"), (Role::Assistant, end, "end")],
        )
    }

    #[test]
    fn window_includes_exact_pre_buffer_boundary() {
        let window = MatchWindow::default();
        let s = single_message_session("s", "2026-03-01T10:00:00Z", "2026-03-01T11:00:00Z");

        assert!(window.contains(&s, ts("2026-03-01T09:45:00Z")));
        assert!(!window.contains(&s, ts("2026-03-01T09:44:59Z")));
    }

    #[test]
    fn window_includes_exact_post_buffer_boundary() {
        let window = MatchWindow::default();
        let s = single_message_session("s", "2026-03-01T10:00:00Z", "2026-03-01T11:00:00Z");

        assert!(window.contains(&s, ts("2026-03-01T11:05:00Z")));
        assert!(!window.contains(&s, ts("2026-03-01T11:05:01Z")));
    }

    #[test]
    fn relevant_messages_stop_at_cutoff() {
        let window = MatchWindow::default();
        let s = session(
            "s",
            &[
                (Role::Human, "2026-03-01T10:00:00Z", "a"),
                (Role::Assistant, "2026-03-01T10:01:00Z", "b"),
                (Role::Human, "2026-03-01T10:01:01Z", "c"),
            ],
        );

        let relevant = window.relevant_messages(&s, ts("2026-03-01T10:00:00Z"));
        let texts: Vec<&str> = relevant.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn end_to_end_scenario_matches_only_the_overlapping_commit() {
        let commits = vec![
            commit("b".repeat(40).as_str(), "2026-03-01T11:00:00Z", "later"),
            commit("a".repeat(40).as_str(), "2026-03-01T10:00:00Z", "earlier"),
        ];
        let sessions = vec![session(
            "s1",
            &[
                (Role::Human, "2026-03-01T09:50:00Z", "plan"),
                (Role::Assistant, "2026-03-01T09:58:00Z", "done"),
                (Role::Human, "2026-03-01T10:04:00Z", "after the commit"),
            ],
        )];

        let matched = correlate(&commits, &sessions, &MatchWindow::default());
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].commit.subject, "earlier");
        assert_eq!(matched[0].message_count(), 2);
        let texts: Vec<&str> = matched[0].sessions[0]
            .messages
            .iter()
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(texts, vec!["plan", "done"]);
    }

    #[test]
    fn session_with_no_message_before_cutoff_is_dropped() {
        // Commit sits inside the pre-buffer, but every message is after the cutoff.
        let commits = vec![commit("c1", "2026-03-01T09:50:00Z", "early")];
        let sessions = vec![single_message_session(
            "s1",
            "2026-03-01T10:00:00Z",
            "2026-03-01T10:10:00Z",
        )];

        let window = MatchWindow::default();
        assert!(window.contains(&sessions[0], commits[0].time_utc()));
        assert!(correlate(&commits, &sessions, &window).is_empty());
    }

    #[test]
    fn one_session_matches_many_commits_with_independent_subsets() {
        let commits = vec![
            commit("c2", "2026-03-01T10:30:00Z", "second"),
            commit("c1", "2026-03-01T10:10:00Z", "first"),
        ];
        let sessions = vec![session(
            "long",
            &[
                (Role::Human, "2026-03-01T10:00:00Z", "one"),
                (Role::Assistant, "2026-03-01T10:05:00Z", "two"),
                (Role::Human, "2026-03-01T10:20:00Z", "three"),
                (Role::Assistant, "2026-03-01T10:40:00Z", "four"),
            ],
        )];

        let matched = correlate(&commits, &sessions, &MatchWindow::default());
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].commit.subject, "second");
        assert_eq!(matched[0].message_count(), 3);
        assert_eq!(matched[1].commit.subject, "first");
        assert_eq!(matched[1].message_count(), 2);
    }

    #[test]
    fn matches_follow_session_enumeration_order() {
        let commits = vec![commit("c1", "2026-03-01T10:00:00Z", "x")];
        let sessions = vec![
            single_message_session("zeta", "2026-03-01T09:55:00Z", "2026-03-01T10:02:00Z"),
            single_message_session("alpha", "2026-03-01T09:30:00Z", "2026-03-01T09:58:00Z"),
        ];

        let matched = correlate(&commits, &sessions, &MatchWindow::default());
        assert_eq!(matched[0].session_ids(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn offsets_are_compared_on_the_utc_axis() {
        // 12:00+02:00 is 10:00Z, inside a session running 09:50Z–10:10Z.
        let commits = vec![commit("c1", "2026-03-01T12:00:00+02:00", "x")];
        let sessions = vec![single_message_session(
            "s",
            "2026-03-01T09:50:00Z",
            "2026-03-01T10:10:00Z",
        )];

        let matched = correlate(&commits, &sessions, &MatchWindow::default());
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].message_count(), 1);
    }

    #[test]
    fn custom_window_changes_the_boundaries() {
        let window = MatchWindow::from_parts(0, 0, 0);
        let s = single_message_session("s", "2026-03-01T10:00:00Z", "2026-03-01T10:30:00Z");

        assert!(!window.contains(&s, ts("2026-03-01T09:59:59Z")));
        assert!(window.contains(&s, ts("2026-03-01T10:00:00Z")));
        assert_eq!(window.relevant_messages(&s, ts("2026-03-01T10:00:00Z")).len(), 1);
    }

    #[test]
    fn huge_window_matches_without_overflowing() {
        let window = MatchWindow::from_parts(1_000_000_000_000, i64::MAX, i64::MAX);
        let s = single_message_session("s", "2026-03-01T10:00:00Z", "2026-03-01T10:30:00Z");
        let c = commit("c1", "1999-01-01T00:00:00Z", "long before");

        let matched = match_commit(&c, std::slice::from_ref(&s), &window);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].messages.len(), 2);
    }

    #[test]
    fn audit_order_is_oldest_first_and_stable() {
        let commits = vec![
            commit("c3", "2026-03-01T10:20:00Z", "third"),
            commit("c2b", "2026-03-01T10:10:00Z", "tie newer"),
            commit("c2a", "2026-03-01T10:10:00Z", "tie older"),
            commit("c1", "2026-03-01T10:00:00Z", "first"),
        ];
        let sessions = vec![single_message_session(
            "s",
            "2026-03-01T09:59:00Z",
            "2026-03-01T10:21:00Z",
        )];

        let ordered = audit_order(correlate(&commits, &sessions, &MatchWindow::default()));
        let subjects: Vec<&str> = ordered.iter().map(|m| m.commit.subject.as_str()).collect();
        assert_eq!(subjects, vec!["first", "tie older", "tie newer", "third"]);
    }
}
