//! Incremental publishing of audit documents.
//!
//! Documents carry prev/next links, so creating (or rebuilding) document `i`
//! changes what documents `i - 1` and `i + 1` should say. The write set for a
//! run is therefore every new document plus its immediate neighbors, with
//! neighbors always taken from the current audited list. The index is
//! rewritten on every run.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::correlate::CommitMatches;
use crate::render::{
    INDEX_FILE_NAME, IndexContext, document_file_name, render_commit_document, render_index,
};
use crate::source::CommitSource;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list output directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a document is in the write set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteReason {
    /// No document existed yet
    New,
    /// Document existed, full rebuild requested
    Rebuild,
    /// Neighbor of a new or rebuilt document; only its links may have changed
    Navigation,
}

impl WriteReason {
    /// Whether the document itself triggered the write (as opposed to a neighbor).
    pub fn is_primary(&self) -> bool {
        !matches!(self, Self::Navigation)
    }
}

/// One document scheduled for writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedWrite {
    /// Position in the audited (oldest-first) list
    pub position: usize,
    pub file_name: String,
    pub reason: WriteReason,
}

/// The minimal set of documents a run has to write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishPlan {
    /// Ascending by position
    pub writes: Vec<PlannedWrite>,
    /// Audited commits whose documents are left alone
    pub unchanged: usize,
}

impl PublishPlan {
    /// Compute the write set for `audited` (oldest-first).
    ///
    /// `exists` reports whether a document file name is already present.
    pub fn compute(
        audited: &[CommitMatches<'_>],
        rebuild: bool,
        exists: impl Fn(&str) -> bool,
    ) -> Self {
        let mut reasons: BTreeMap<usize, WriteReason> = BTreeMap::new();

        for (i, entry) in audited.iter().enumerate() {
            let present = exists(&document_file_name(entry.commit));
            if !present {
                reasons.insert(i, WriteReason::New);
            } else if rebuild {
                reasons.insert(i, WriteReason::Rebuild);
            }
        }

        let primary: Vec<usize> = reasons.keys().copied().collect();
        for i in primary {
            let neighbors = [i.checked_sub(1), Some(i + 1).filter(|&n| n < audited.len())];
            for n in neighbors.into_iter().flatten() {
                reasons.entry(n).or_insert(WriteReason::Navigation);
            }
        }

        let writes: Vec<PlannedWrite> = reasons
            .into_iter()
            .map(|(position, reason)| PlannedWrite {
                position,
                file_name: document_file_name(audited[position].commit),
                reason,
            })
            .collect();
        let unchanged = audited.len() - writes.len();

        Self { writes, unchanged }
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn primary_count(&self) -> usize {
        self.writes.iter().filter(|w| w.reason.is_primary()).count()
    }

    pub fn navigation_count(&self) -> usize {
        self.writes.len() - self.primary_count()
    }
}

/// What a publish run wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub written: Vec<PlannedWrite>,
    pub unchanged: usize,
    pub index_path: PathBuf,
}

/// Writes audit documents into one output directory.
#[derive(Debug, Clone)]
pub struct Publisher {
    output_dir: PathBuf,
    rebuild: bool,
}

impl Publisher {
    pub fn new(output_dir: impl Into<PathBuf>, rebuild: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            rebuild,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn index_path(&self) -> PathBuf {
        self.output_dir.join(INDEX_FILE_NAME)
    }

    /// Plan against the documents currently on disk. Never writes.
    pub fn plan(&self, audited: &[CommitMatches<'_>]) -> PublishPlan {
        PublishPlan::compute(audited, self.rebuild, |name| {
            self.output_dir.join(name).is_file()
        })
    }

    /// Render and write every planned document, then the index.
    ///
    /// Change summaries are fetched only for documents being written.
    pub fn publish<C>(
        &self,
        audited: &[CommitMatches<'_>],
        plan: &PublishPlan,
        index: &IndexContext<'_>,
        commits: &C,
    ) -> Result<PublishReport, PublishError>
    where
        C: CommitSource + ?Sized,
    {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| PublishError::CreateDir {
            path: self.output_dir.clone(),
            source,
        })?;

        for write in &plan.writes {
            let i = write.position;
            let entry = &audited[i];
            let prev = i.checked_sub(1).map(|p| audited[p].commit);
            let next = audited.get(i + 1).map(|n| n.commit);
            let summary = commits.change_summary(&entry.commit.hash);

            let doc = render_commit_document(
                entry.commit,
                &entry.sessions,
                summary.as_deref(),
                prev,
                next,
            );
            self.write_file(&write.file_name, &doc)?;
            tracing::debug!(file = %write.file_name, reason = ?write.reason, "wrote audit document");
        }

        self.write_file(INDEX_FILE_NAME, &render_index(audited, index))?;

        Ok(PublishReport {
            written: plan.writes.clone(),
            unchanged: plan.unchanged,
            index_path: self.index_path(),
        })
    }

    /// Documents on disk whose commit is no longer audited.
    ///
    /// They are reported, never deleted: a commit can drop out of the audited
    /// set because of a narrower author filter or window, and its document is
    /// still a valid record.
    pub fn stale_documents(
        &self,
        audited: &[CommitMatches<'_>],
    ) -> Result<Vec<PathBuf>, PublishError> {
        if !self.output_dir.is_dir() {
            return Ok(Vec::new());
        }

        let current: HashSet<String> = audited
            .iter()
            .map(|entry| document_file_name(entry.commit))
            .collect();

        let entries = std::fs::read_dir(&self.output_dir).map_err(|source| {
            PublishError::ReadDir {
                path: self.output_dir.clone(),
                source,
            }
        })?;

        let mut stale: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "md"))
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| name != INDEX_FILE_NAME && !current.contains(name))
            })
            .collect();
        stale.sort();

        for path in &stale {
            tracing::warn!(path = %path.display(), "audit document has no matching commit; leaving it in place");
        }
        Ok(stale)
    }

    fn write_file(&self, name: &str, body: &str) -> Result<(), PublishError> {
        let path = self.output_dir.join(name);
        std::fs::write(&path, body).map_err(|source| PublishError::Write { path, source })
    }
}
