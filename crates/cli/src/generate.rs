use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use commit_audit_core::correlate::{CommitMatches, audit_order, correlate};
use commit_audit_core::publish::{PlannedWrite, PublishPlan, Publisher, WriteReason};
use commit_audit_core::render::{INDEX_FILE_NAME, IndexContext};
use commit_audit_core::source::{CommitSource, SessionSource};
use commit_audit_parsers::ClaudeProjectSource;

use crate::settings::{self, MatchingArgs, TargetArgs};

/// Subjects longer than this are cut in progress output.
const SUBJECT_PREVIEW_CHARS: usize = 60;

#[derive(Debug, Clone, clap::Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Output directory (default: .claude-audit/ in the repository root)
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Only audit commits whose author matches (passed to git log --author)
    #[arg(long)]
    pub author: Option<String>,

    /// Show what would be written without touching the output directory
    #[arg(long)]
    pub dry_run: bool,

    /// Regenerate every document, not only those of new commits
    #[arg(long)]
    pub rebuild: bool,

    #[command(flatten)]
    pub matching: MatchingArgs,
}

pub fn run_generate(args: &GenerateArgs) -> Result<()> {
    let commit_source = settings::open_repo(&args.target.repo_path)?.with_author(args.author.clone());
    let repo_root = commit_source.repo_root().to_path_buf();
    let config = settings::load_config(args.target.config.as_deref(), &repo_root, &args.matching)?;
    let output_dir = settings::output_dir(args.output_dir.as_deref(), &config, &repo_root);
    tracing::debug!(
        repo = %repo_root.display(),
        output = %output_dir.display(),
        pre_buffer_minutes = config.matching.pre_buffer_minutes,
        post_buffer_minutes = config.matching.post_buffer_minutes,
        cutoff_seconds = config.matching.cutoff_seconds,
        rebuild = args.rebuild,
        dry_run = args.dry_run,
        "resolved settings"
    );

    println!("Repository: {}", repo_root.display());

    let session_dir = settings::session_dir(args.target.session_dir.as_deref(), &config, &repo_root)?;
    println!(
        "Session dir: {} ({})",
        session_dir.path.display(),
        session_dir.detection.as_str()
    );

    println!("Loading sessions...");
    let sessions = ClaudeProjectSource::new(&session_dir.path).sessions()?;
    if sessions.is_empty() {
        println!("No sessions found (or all sessions contained only tool calls).");
        return Ok(());
    }
    let total_messages: usize = sessions.iter().map(|s| s.messages().len()).sum();
    println!(
        "  Found {} session(s) with {} human/assistant message(s)",
        sessions.len(),
        total_messages
    );

    println!("Reading git history...");
    let commits = commit_source
        .commits()
        .context("failed to read git history")?;
    if commits.is_empty() {
        println!("No commits found.");
        return Ok(());
    }
    println!("  Found {} commit(s)", commits.len());

    println!("Matching commits to sessions...");
    let window = settings::match_window(&config.matching);
    let audited = audit_order(correlate(&commits, &sessions, &window));
    println!("  {} commit(s) matched to session(s)", audited.len());

    if audited.is_empty() {
        println!();
        println!("No commits could be matched to any Claude Code sessions.");
        println!("This can happen if session timestamps don't overlap with commit times.");
        return Ok(());
    }

    let publisher = Publisher::new(&output_dir, args.rebuild);
    let plan = publisher.plan(&audited);

    if args.dry_run {
        print_dry_run(&audited, &plan, publisher.output_dir());
        return Ok(());
    }

    let stale = publisher.stale_documents(&audited)?;
    if !stale.is_empty() {
        println!(
            "  {} existing document(s) no longer match a commit; left in place",
            stale.len()
        );
    }

    let index = IndexContext {
        total_commits: commits.len(),
        repo_root: &repo_root,
        generated_at: Utc::now(),
    };

    if plan.primary_count() == 0 {
        println!();
        println!("No new commits to audit.");
    } else {
        println!();
        println!("Writing audit files to {}/", publisher.output_dir().display());
        println!("  {}", plan_summary(&plan));
    }

    let report = publisher.publish(&audited, &plan, &index, &commit_source)?;
    for write in &report.written {
        println!("  {}", write_line(&audited, write));
    }

    if plan.primary_count() == 0 {
        println!("  {} refreshed — {} audited commits", INDEX_FILE_NAME, audited.len());
    } else {
        println!("  {} — {} audited commits", INDEX_FILE_NAME, audited.len());
        println!();
        println!(
            "Done. {} file(s) written, {} total audited commits.",
            report.written.len(),
            audited.len()
        );
    }
    Ok(())
}

fn print_dry_run(audited: &[CommitMatches<'_>], plan: &PublishPlan, output_dir: &Path) {
    for write in &plan.writes {
        println!("  {}", write_line(audited, write));
    }
    if plan.unchanged > 0 {
        println!(
            "  ({} existing file(s) unchanged; use --rebuild to regenerate)",
            plan.unchanged
        );
    }

    println!();
    if plan.is_empty() {
        println!("Dry run — no new files to generate in {}/", output_dir.display());
    } else {
        println!(
            "Dry run — would generate {} file(s) in {}/",
            plan.writes.len(),
            output_dir.display()
        );
    }
}

/// `<file> — <subject> (<n> msgs)` plus the reason when it is not a new document.
fn write_line(audited: &[CommitMatches<'_>], write: &PlannedWrite) -> String {
    let entry = &audited[write.position];
    let subject: String = entry
        .commit
        .subject
        .chars()
        .take(SUBJECT_PREVIEW_CHARS)
        .collect();
    let tag = match write.reason {
        WriteReason::New => "",
        WriteReason::Rebuild => " (rebuild)",
        WriteReason::Navigation => " (nav update)",
    };
    format!(
        "{} — {} ({} msgs){}",
        write.file_name,
        subject,
        entry.message_count(),
        tag
    )
}

fn plan_summary(plan: &PublishPlan) -> String {
    let count = |reason: WriteReason| plan.writes.iter().filter(|w| w.reason == reason).count();
    let rebuilt = count(WriteReason::Rebuild);
    let mut parts = vec![format!("{} new", count(WriteReason::New))];
    if rebuilt > 0 {
        parts.push(format!("{rebuilt} rebuilt"));
    }
    parts.push(format!("{} updated (nav links)", plan.navigation_count()));
    parts.push(format!("{} unchanged", plan.unchanged));
    parts.join(", ")
}
