use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GitSourceError {
    #[error("not a git repository: {0}")]
    NotARepo(PathBuf),

    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("git {command} failed ({status}): {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },
}

pub type Result<T> = std::result::Result<T, GitSourceError>;
