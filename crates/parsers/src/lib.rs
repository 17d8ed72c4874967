//! Session source for Claude Code transcripts.
//!
//! [`discover`] finds the transcript directory of a repository;
//! [`claude_code::ClaudeProjectSource`] turns its JSONL files into sessions.

pub mod claude_code;
pub mod discover;

pub use claude_code::{ClaudeProjectSource, Transcripts};
