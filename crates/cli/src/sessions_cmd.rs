use anyhow::Result;
use commit_audit_core::render::format_timestamp;
use commit_audit_parsers::ClaudeProjectSource;

use crate::settings::{self, MatchingArgs, TargetArgs};

#[derive(Debug, Clone, clap::Args)]
pub struct SessionsArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// List the sessions that `generate` would match against.
pub fn run_sessions(args: &SessionsArgs) -> Result<()> {
    let repo = settings::open_repo(&args.target.repo_path)?;
    let repo_root = repo.repo_root();
    let config = settings::load_config(args.target.config.as_deref(), repo_root, &MatchingArgs::default())?;
    let session_dir = settings::session_dir(args.target.session_dir.as_deref(), &config, repo_root)?;

    println!(
        "Session dir: {} ({})",
        session_dir.path.display(),
        session_dir.detection.as_str()
    );

    let loaded = ClaudeProjectSource::new(&session_dir.path).load()?;
    let sessions = loaded.sessions;
    if sessions.is_empty() {
        println!("No sessions found (or all sessions contained only tool calls).");
        return Ok(());
    }

    let mut total_messages = 0usize;
    for session in &sessions {
        let range = session.time_range();
        let count = session.messages().len();
        total_messages += count;
        println!(
            "  {}  {} → {}  ({} message(s))",
            session.session_id(),
            format_timestamp(&range.start),
            format_timestamp(&range.end),
            count
        );
    }

    println!();
    println!(
        "Total: {} session(s), {} message(s) in {} transcript file(s)",
        sessions.len(),
        total_messages,
        loaded.file_count
    );
    Ok(())
}
