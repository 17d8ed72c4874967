//! Configuration types for `commit-audit`.
//!
//! The file is optional. The CLI looks for `commit-audit.toml` at the
//! repository root unless `--config` names another file, and command-line
//! flags override whatever the file says. Values are resolved once at
//! start-up and passed down explicitly.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Canonical config file name, looked up at the repository root.
pub const CONFIG_FILE_NAME: &str = "commit-audit.toml";

/// Default output directory, relative to the repository root.
pub const DEFAULT_OUTPUT_DIR_NAME: &str = ".claude-audit";

/// Default root holding one transcript directory per project.
pub const DEFAULT_PROJECTS_ROOT: &str = "~/.claude/projects";

/// Largest accepted buffer, one year in minutes.
pub const MAX_BUFFER_MINUTES: i64 = 365 * 24 * 60;

/// Largest accepted cutoff, one year in seconds.
pub const MAX_CUTOFF_SECONDS: i64 = MAX_BUFFER_MINUTES * 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {field}: {value} (must not be negative)")]
    Negative { field: &'static str, value: i64 },

    #[error("invalid value for {field}: {value} (must be at most {max})")]
    TooLarge {
        field: &'static str,
        value: i64,
        max: i64,
    },
}

/// Top-level configuration (persisted as `commit-audit.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AuditConfig {
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub sessions: SessionSettings,
}

/// Time-window heuristics used to match commits to sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchingSettings {
    #[serde(default = "default_pre_buffer_minutes")]
    pub pre_buffer_minutes: i64,
    #[serde(default = "default_post_buffer_minutes")]
    pub post_buffer_minutes: i64,
    #[serde(default = "default_cutoff_seconds")]
    pub cutoff_seconds: i64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            pre_buffer_minutes: default_pre_buffer_minutes(),
            post_buffer_minutes: default_post_buffer_minutes(),
            cutoff_seconds: default_cutoff_seconds(),
        }
    }
}

impl MatchingSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value, max) in [
            ("pre_buffer_minutes", self.pre_buffer_minutes, MAX_BUFFER_MINUTES),
            ("post_buffer_minutes", self.post_buffer_minutes, MAX_BUFFER_MINUTES),
            ("cutoff_seconds", self.cutoff_seconds, MAX_CUTOFF_SECONDS),
        ] {
            if value < 0 {
                return Err(ConfigError::Negative { field, value });
            }
            if value > max {
                return Err(ConfigError::TooLarge { field, value, max });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputSettings {
    /// Output directory; relative paths are resolved against the repository root
    #[serde(default = "default_output_dir_name")]
    pub dir_name: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir_name: default_output_dir_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSettings {
    /// Directory scanned when auto-detecting a project's transcript folder
    #[serde(default = "default_projects_root")]
    pub projects_root: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            projects_root: default_projects_root(),
        }
    }
}

// ── Serde default functions ─────────────────────────────────────────────

fn default_pre_buffer_minutes() -> i64 {
    15
}
fn default_post_buffer_minutes() -> i64 {
    5
}
fn default_cutoff_seconds() -> i64 {
    60
}
fn default_output_dir_name() -> String {
    DEFAULT_OUTPUT_DIR_NAME.to_string()
}
fn default_projects_root() -> String {
    DEFAULT_PROJECTS_ROOT.to_string()
}

// ── Loading ─────────────────────────────────────────────────────────────

/// Read and validate a config file.
pub fn load(path: &Path) -> Result<AuditConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: AuditConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.matching.validate()?;
    Ok(config)
}

/// Load the explicit file when given, else `<repo_root>/commit-audit.toml`
/// when it exists, else defaults.
///
/// An explicit path that does not exist is an error; a missing repo-level
/// file is not.
pub fn load_for_repo(explicit: Option<&Path>, repo_root: &Path) -> Result<AuditConfig, ConfigError> {
    if let Some(path) = explicit {
        return load(path);
    }
    let candidate = repo_root.join(CONFIG_FILE_NAME);
    if candidate.is_file() {
        load(&candidate)
    } else {
        Ok(AuditConfig::default())
    }
}
