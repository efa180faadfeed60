//! Squash-specific error handling.

use thiserror::Error;

use crate::git::GatewayError;

/// Errors produced while planning or executing a squash.
#[derive(Error, Debug)]
pub enum SquashError {
    /// Reading history failed.
    #[error("Failed to read commit history: {0}")]
    Fetch(#[source] GatewayError),

    /// The branch has too few commits to squash anything.
    #[error("Not enough commits to squash (found {available}, need at least 2)")]
    TooFewCommits {
        /// Commits available in the listed history.
        available: usize,
    },

    /// Fewer than two commits were chosen.
    #[error("Select at least 2 commits to squash (got {selected})")]
    TooFewSelected {
        /// Commits chosen by the user.
        selected: usize,
    },

    /// The squash message was empty after trimming.
    #[error("Commit message cannot be empty")]
    EmptyMessage,

    /// The selection does not fit the history it is applied to.
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// HEAD moved after the selection was made.
    #[error("Branch tip moved from {expected} to {actual} since the commits were listed; run again")]
    TipMoved {
        /// Tip the selection was built against.
        expected: String,
        /// Tip found just before rewriting.
        actual: String,
    },

    /// A repository operation failed during the rewrite.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl SquashError {
    /// Returns true for outcomes that end the run without counting as a failure.
    pub fn is_early_exit(&self) -> bool {
        matches!(
            self,
            SquashError::TooFewCommits { .. } | SquashError::TooFewSelected { .. }
        )
    }
}
