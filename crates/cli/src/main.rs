mod generate;
mod sessions_cmd;
mod settings;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "commit-audit",
    version,
    about = "Generate an audit trail matching Claude Code sessions to git commits"
)]
struct Cli {
    /// Log debug detail to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match sessions to commits and write one Markdown document per commit
    Generate(generate::GenerateArgs),

    /// List the sessions found for a repository
    Sessions(sessions_cmd::SessionsArgs),
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Generate(args) => generate::run_generate(&args),
        Commands::Sessions(args) => sessions_cmd::run_sessions(&args),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
