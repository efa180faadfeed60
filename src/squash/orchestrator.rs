//! Sequences validation, stashing and the chosen squash strategy.

use serde::Serialize;
use tracing::{info, warn};

use crate::git::RepositoryGateway;
use crate::squash::fast_path::squash_in_place;
use crate::squash::guard::{WorkingTreeGuard, STASH_LABEL};
use crate::squash::selection::MIN_SELECTION;
use crate::squash::{
    CommitHistory, DryRunPreview, Reconstructor, Selection, SquashError, SquashPath,
};

/// Summary of a completed squash.
#[derive(Debug, Clone, Serialize)]
pub struct SquashOutcome {
    /// Strategy that was used.
    pub path: SquashPath,
    /// Hash of the new squashed commit.
    pub new_commit: String,
    /// Number of commits folded into it.
    pub squashed: usize,
    /// Number of unselected commits replayed above it.
    pub replayed: usize,
    /// Whether stashed uncommitted changes were restored.
    pub stash_restored: bool,
}

/// Entry point for squashing a selection of commits.
pub struct Squasher<'g, G: RepositoryGateway + ?Sized> {
    gateway: &'g G,
}

impl<'g, G: RepositoryGateway + ?Sized> Squasher<'g, G> {
    /// Creates a squasher over a gateway.
    pub fn new(gateway: &'g G) -> Self {
        Self { gateway }
    }

    /// Reads the most recent `max_count` commits.
    ///
    /// Fails with [`SquashError::TooFewCommits`] when there is nothing to squash.
    pub fn load_history(&self, max_count: usize) -> Result<CommitHistory, SquashError> {
        let history = CommitHistory::read(self.gateway, max_count)?;

        if history.len() < MIN_SELECTION {
            return Err(SquashError::TooFewCommits {
                available: history.len(),
            });
        }

        Ok(history)
    }

    /// Describes what [`squash`](Self::squash) would do. Only reads.
    pub fn preview(
        &self,
        history: &CommitHistory,
        selection: &Selection,
        message: &str,
    ) -> Result<DryRunPreview, SquashError> {
        let message = validate_message(message)?;
        let status = self.gateway.status()?;

        Ok(DryRunPreview::build(
            history,
            selection,
            message,
            status.uncommitted,
        ))
    }

    /// Squashes `selection` into one commit.
    ///
    /// Uncommitted changes are stashed first and restored on success. When the
    /// rewrite fails they stay stashed.
    pub fn squash(
        &self,
        history: &CommitHistory,
        selection: &Selection,
        message: &str,
    ) -> Result<SquashOutcome, SquashError> {
        let message = validate_message(message)?;
        self.ensure_tip_unchanged(selection)?;

        let path = selection.classify(history);
        info!(%path, count = selection.len(), "squashing commits");

        let guard = WorkingTreeGuard::acquire(self.gateway)?;

        let result = match path {
            SquashPath::Fast => {
                squash_in_place(self.gateway, selection, message).map(|commit| (commit, 0))
            }
            SquashPath::General => Reconstructor::new(self.gateway)
                .run(history, selection, message)
                .map(|report| (report.new_commit, report.replayed)),
        };

        let (new_commit, replayed) = match result {
            Ok(done) => done,
            Err(e) => {
                if guard.is_stashed() {
                    warn!("Uncommitted changes are still stashed as \"{STASH_LABEL}\"; run `git stash pop` to restore them");
                }
                return Err(e.into());
            }
        };

        let stash_restored = guard.release()?;

        Ok(SquashOutcome {
            path,
            new_commit,
            squashed: selection.len(),
            replayed,
            stash_restored,
        })
    }

    fn ensure_tip_unchanged(&self, selection: &Selection) -> Result<(), SquashError> {
        let head = self.gateway.log(1).map_err(SquashError::Fetch)?;
        let actual = head.first().map(|c| c.hash.as_str()).unwrap_or_default();

        if actual != selection.tip() {
            return Err(SquashError::TipMoved {
                expected: selection.tip().to_string(),
                actual: actual.to_string(),
            });
        }

        Ok(())
    }
}

/// Trims `message`, rejecting it if nothing is left.
pub fn validate_message(message: &str) -> Result<&str, SquashError> {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Err(SquashError::EmptyMessage);
    }
    Ok(trimmed)
}
