//! Ordered view over one read of the branch history.

use std::collections::HashMap;

use tracing::debug;

use crate::git::{CommitRecord, RepositoryGateway};
use crate::squash::SquashError;

/// Commits from one history read, most recent first, indexed by hash.
#[derive(Debug, Clone)]
pub struct CommitHistory {
    commits: Vec<CommitRecord>,
    positions: HashMap<String, usize>,
}

impl CommitHistory {
    /// Reads up to `max_count` commits from the gateway.
    pub fn read<G>(gateway: &G, max_count: usize) -> Result<Self, SquashError>
    where
        G: RepositoryGateway + ?Sized,
    {
        let commits = gateway.log(max_count).map_err(SquashError::Fetch)?;
        debug!(count = commits.len(), max_count, "read commit history");
        Ok(Self::from_commits(commits))
    }

    /// Wraps an already ordered, newest-first sequence.
    pub fn from_commits(commits: Vec<CommitRecord>) -> Self {
        let positions = commits
            .iter()
            .enumerate()
            .map(|(offset, commit)| (commit.hash.clone(), offset))
            .collect();

        Self { commits, positions }
    }

    /// Returns all commits, most recent first.
    pub fn commits(&self) -> &[CommitRecord] {
        &self.commits
    }

    /// Number of commits in this read.
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// Returns true when the read returned nothing.
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// The branch tip at the time of the read.
    pub fn tip(&self) -> Option<&CommitRecord> {
        self.commits.first()
    }

    /// Offset of a commit from the tip (0 = tip).
    pub fn position(&self, hash: &str) -> Option<usize> {
        self.positions.get(hash).copied()
    }

    /// Looks up a commit by hash.
    pub fn get(&self, hash: &str) -> Option<&CommitRecord> {
        self.position(hash).map(|offset| &self.commits[offset])
    }

    /// Looks up a commit by offset from the tip.
    pub fn at(&self, offset: usize) -> Option<&CommitRecord> {
        self.commits.get(offset)
    }

    /// Commits strictly newer than `hash`, most recent first.
    ///
    /// Returns an empty slice when `hash` is not part of this read.
    pub fn newer_than(&self, hash: &str) -> &[CommitRecord] {
        match self.position(hash) {
            Some(offset) => &self.commits[..offset],
            None => &[],
        }
    }
}
