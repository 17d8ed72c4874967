//! Commit history of a local git repository.
//!
//! Repository discovery goes through `gix`; history and change summaries come
//! from the `git` executable so the output matches what `git log` shows the
//! operator.

pub mod error;
pub mod log;
pub mod ops;
pub mod source;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{GitSourceError, Result};
pub use source::GitCommitSource;
