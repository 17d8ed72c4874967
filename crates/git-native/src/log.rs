//! Parsing `git log` output produced with [`LOG_FORMAT`].

use chrono::DateTime;
use commit_audit_core::Commit;

const FIELD_SEP: char = '\x1f';
const RECORD_SEP: char = '\x1e';

/// Hash, strict ISO author date, author name, author email, subject, body.
pub const LOG_FORMAT: &str = "--format=%H%x1f%aI%x1f%an%x1f%ae%x1f%s%x1f%B%x1e";

/// Parse every record in `raw`, newest first as git emits them.
///
/// Records with missing fields or an unparseable date are skipped.
pub fn parse_log(raw: &str) -> Vec<Commit> {
    raw.split(RECORD_SEP)
        .filter(|record| !record.trim().is_empty())
        .filter_map(|record| {
            let commit = parse_record(record);
            if commit.is_none() {
                tracing::debug!("Skipping malformed git log record: {:?}", record.trim());
            }
            commit
        })
        .collect()
}

fn parse_record(record: &str) -> Option<Commit> {
    let record = record.trim_start_matches(['\n', '\r']);
    let mut fields = record.splitn(6, FIELD_SEP);
    let hash = fields.next()?.trim();
    let date = fields.next()?.trim();
    let author_name = fields.next()?;
    let author_email = fields.next()?;
    let subject = fields.next()?;
    let body = fields.next()?;

    if hash.is_empty() {
        return None;
    }
    let timestamp = DateTime::parse_from_rfc3339(date).ok()?;

    Some(Commit {
        hash: hash.to_string(),
        timestamp,
        author_name: author_name.to_string(),
        author_email: author_email.to_string(),
        subject: subject.to_string(),
        message: body.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hash: &str, date: &str, subject: &str, body: &str) -> String {
        format!("{hash}\x1f{date}\x1fAda\x1fada@example.com\x1f{subject}\x1f{body}\x1e\n")
    }

    #[test]
    fn parses_records_and_keeps_author_offset() {
        let raw = [
            record("b".repeat(40).as_str(), "2026-03-01T12:00:00+02:00", "Second", "Second\n\nDetails.\n"),
            record("a".repeat(40).as_str(), "2026-03-01T09:00:00Z", "First", "First\n"),
        ]
        .concat();

        let commits = parse_log(&raw);
        assert_eq!(commits.len(), 2);

        let newest = &commits[0];
        assert_eq!(newest.hash, "b".repeat(40));
        assert_eq!(newest.timestamp.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(newest.author(), "Ada <ada@example.com>");
        assert_eq!(newest.subject, "Second");
        assert_eq!(newest.message, "Second\n\nDetails.");
        assert_eq!(commits[1].message, "First");
    }

    #[test]
    fn body_may_contain_field_separator_lookalikes() {
        let raw = record("c".repeat(40).as_str(), "2026-03-01T09:00:00Z", "Tabs", "Tabs\n\ta\tb\n");
        let commits = parse_log(&raw);
        assert_eq!(commits[0].message, "Tabs\n\ta\tb");
    }

    #[test]
    fn malformed_records_are_skipped() {
        let raw = [
            "only\x1ftwo fields\x1e\n".to_string(),
            record("d".repeat(40).as_str(), "last tuesday", "Bad date", "Bad date"),
            record("e".repeat(40).as_str(), "2026-03-01T09:00:00Z", "Good", "Good"),
        ]
        .concat();

        let commits = parse_log(&raw);
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].subject, "Good");
    }

    #[test]
    fn empty_output_yields_no_commits() {
        assert!(parse_log("").is_empty());
        assert!(parse_log("\n").is_empty());
    }
}
