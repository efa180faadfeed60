//! Commit selections and fast/general path classification.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::git::CommitRecord;
use crate::squash::{CommitHistory, SquashError};

/// Minimum number of commits a squash needs.
pub const MIN_SELECTION: usize = 2;

/// Strategy used to rewrite history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SquashPath {
    /// The selection is the newest contiguous run: soft reset and recommit.
    Fast,
    /// Anything else: rebuild on a temporary branch and replay the rest.
    General,
}

impl fmt::Display for SquashPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SquashPath::Fast => write!(f, "fast path (soft reset)"),
            SquashPath::General => write!(f, "general path (temporary branch rebuild)"),
        }
    }
}

/// A validated set of commits to squash.
///
/// Commits are held in history order (newest first) regardless of the order
/// they were picked in. A selection is tied to the history read it was built
/// from; `tip` records that read's branch tip.
#[derive(Debug, Clone)]
pub struct Selection {
    commits: Vec<CommitRecord>,
    positions: Vec<usize>,
    tip: String,
}

impl Selection {
    /// Validates `hashes` against `history`.
    ///
    /// Requires at least two distinct hashes, each present in `history`.
    pub fn new<I, S>(hashes: I, history: &CommitHistory) -> Result<Self, SquashError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hashes: Vec<S> = hashes.into_iter().collect();
        if hashes.len() < MIN_SELECTION {
            return Err(SquashError::TooFewSelected {
                selected: hashes.len(),
            });
        }

        let mut seen = HashSet::new();
        let mut positions = Vec::with_capacity(hashes.len());
        for hash in &hashes {
            let hash = hash.as_ref();
            if !seen.insert(hash) {
                return Err(SquashError::InvalidSelection(format!(
                    "commit {hash} selected more than once"
                )));
            }
            let position = history.position(hash).ok_or_else(|| {
                SquashError::InvalidSelection(format!("commit {hash} is not in the listed history"))
            })?;
            positions.push(position);
        }
        positions.sort_unstable();

        let commits = positions
            .iter()
            .filter_map(|&offset| history.at(offset).cloned())
            .collect();
        let tip = history
            .tip()
            .map(|c| c.hash.clone())
            .ok_or_else(|| SquashError::InvalidSelection("history is empty".to_string()))?;

        Ok(Self {
            commits,
            positions,
            tip,
        })
    }

    /// Number of selected commits.
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    /// Always false; a selection holds at least two commits.
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Selected commits, newest first.
    pub fn commits(&self) -> &[CommitRecord] {
        &self.commits
    }

    /// Returns true if `hash` is selected.
    pub fn contains(&self, hash: &str) -> bool {
        self.commits.iter().any(|c| c.hash == hash)
    }

    /// Branch tip of the history this selection was validated against.
    pub fn tip(&self) -> &str {
        &self.tip
    }

    /// Selected commit closest to the tip.
    pub fn newest(&self) -> &CommitRecord {
        &self.commits[0]
    }

    /// Selected commit furthest from the tip.
    pub fn oldest(&self) -> &CommitRecord {
        &self.commits[self.commits.len() - 1]
    }

    /// Offset of the newest selected commit from the tip.
    pub fn newest_position(&self) -> usize {
        self.positions[0]
    }

    /// Offset of the oldest selected commit from the tip.
    pub fn oldest_position(&self) -> usize {
        self.positions[self.positions.len() - 1]
    }

    /// Selected commits in replay order, oldest first.
    pub fn oldest_to_newest(&self) -> impl Iterator<Item = &CommitRecord> {
        self.commits.iter().rev()
    }

    /// Unselected commits between the oldest and newest selection, oldest first.
    pub fn interleaved<'h>(&self, history: &'h CommitHistory) -> Vec<&'h CommitRecord> {
        (self.newest_position() + 1..self.oldest_position())
            .rev()
            .filter(|offset| self.positions.binary_search(offset).is_err())
            .filter_map(|offset| history.at(offset))
            .collect()
    }

    /// Commits newer than the newest selection, oldest first.
    pub fn later<'h>(&self, history: &'h CommitHistory) -> Vec<&'h CommitRecord> {
        history
            .newer_than(&self.newest().hash)
            .iter()
            .rev()
            .collect()
    }

    /// Picks the rewrite strategy for this selection.
    pub fn classify(&self, history: &CommitHistory) -> SquashPath {
        let hashes: Vec<&str> = self.commits.iter().map(|c| c.hash.as_str()).collect();
        if is_latest_and_contiguous(&hashes, history) {
            SquashPath::Fast
        } else {
            SquashPath::General
        }
    }
}

/// Returns true when `selection`, taken as a set, is exactly the
/// `selection.len()` most recent commits of `history`.
///
/// Order within `selection` is irrelevant; duplicates disqualify it.
pub fn is_latest_and_contiguous<S: AsRef<str>>(selection: &[S], history: &CommitHistory) -> bool {
    let selected: HashSet<&str> = selection.iter().map(|s| s.as_ref()).collect();
    let count = selection.len();

    if selected.len() != count || count > history.len() {
        return false;
    }

    history.commits()[..count]
        .iter()
        .all(|commit| selected.contains(commit.hash.as_str()))
}
