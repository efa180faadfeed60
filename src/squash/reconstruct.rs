//! General-path squash: rebuild on a temporary branch, then transplant.
//!
//! The squashed commit is built on a throwaway branch reset to the parent of
//! the oldest selected commit (the anchor). Only once that has succeeded is
//! the original branch reset to the same anchor and rebuilt from the squashed
//! commit followed by every unselected commit that sat above the anchor,
//! oldest first.
//!
//! Any failure rolls back: the original branch is checked out again, moved
//! back to its recorded tip if it had already been reset, and the temporary
//! branch is force-deleted.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::git::{CommitRecord, GatewayError, RepositoryGateway};
use crate::squash::{CommitHistory, Selection};

/// Prefix for temporary branch names.
pub const TEMP_BRANCH_PREFIX: &str = "git-squash-tmp-";

/// Progress of a general-path rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RewriteStage {
    /// Nothing changed yet.
    Start,
    /// The temporary branch exists.
    TempBranchCreated,
    /// The squashed commit exists on the temporary branch.
    Reconstructed,
    /// The original branch holds the rewritten history.
    Transplanted,
    /// The temporary branch is gone.
    CleanedUp,
    /// A step failed and cleanup has run.
    RolledBack,
}

/// In-flight state of one general-path rewrite.
#[derive(Debug)]
pub struct PendingRewrite {
    original_branch: String,
    original_tip: String,
    temp_branch: String,
    anchor: String,
    replay: Vec<CommitRecord>,
    squashed: Option<String>,
    stage: RewriteStage,
    original_reset: bool,
}

impl PendingRewrite {
    /// Branch being rewritten.
    pub fn original_branch(&self) -> &str {
        &self.original_branch
    }

    /// Name of the temporary branch.
    pub fn temp_branch(&self) -> &str {
        &self.temp_branch
    }

    /// Commits replayed after the squashed commit, oldest first.
    pub fn replay(&self) -> &[CommitRecord] {
        &self.replay
    }

    /// Squashed commit built on the temporary branch, once it exists.
    pub fn squashed(&self) -> Option<&str> {
        self.squashed.as_deref()
    }

    /// Current stage.
    pub fn stage(&self) -> RewriteStage {
        self.stage
    }
}

/// Result of a successful general-path rewrite.
#[derive(Debug, Clone)]
pub struct RewriteReport {
    /// Hash of the squashed commit on the original branch.
    pub new_commit: String,
    /// Number of unselected commits replayed above it.
    pub replayed: usize,
}

/// Runs the general-path algorithm against a gateway.
pub struct Reconstructor<'g, G: RepositoryGateway + ?Sized> {
    gateway: &'g G,
}

impl<'g, G: RepositoryGateway + ?Sized> Reconstructor<'g, G> {
    /// Creates a reconstructor.
    pub fn new(gateway: &'g G) -> Self {
        Self { gateway }
    }

    /// Squashes `selection` into one commit with `message`.
    pub fn run(
        &self,
        history: &CommitHistory,
        selection: &Selection,
        message: &str,
    ) -> Result<RewriteReport, GatewayError> {
        let mut pending = self.prepare(history, selection)?;

        match self.advance(&mut pending, selection, message) {
            Ok(new_commit) => Ok(RewriteReport {
                new_commit,
                replayed: pending.replay.len(),
            }),
            Err(e) => {
                warn!(stage = ?pending.stage, "Squash failed, rolling back: {e}");
                self.roll_back(&mut pending);
                Err(e)
            }
        }
    }

    /// Gathers everything the rewrite needs without changing the repository.
    pub fn prepare(
        &self,
        history: &CommitHistory,
        selection: &Selection,
    ) -> Result<PendingRewrite, GatewayError> {
        let original_branch = self.gateway.current_branch()?;
        let anchor = self.gateway.resolve_parent(&selection.oldest().hash)?;

        let replay: Vec<CommitRecord> = selection
            .interleaved(history)
            .into_iter()
            .chain(selection.later(history))
            .cloned()
            .collect();

        debug!(
            branch = %original_branch,
            anchor = %anchor,
            replay = replay.len(),
            "prepared general-path squash"
        );

        Ok(PendingRewrite {
            original_branch,
            original_tip: selection.tip().to_string(),
            temp_branch: temp_branch_name(),
            anchor,
            replay,
            squashed: None,
            stage: RewriteStage::Start,
            original_reset: false,
        })
    }

    fn advance(
        &self,
        pending: &mut PendingRewrite,
        selection: &Selection,
        message: &str,
    ) -> Result<String, GatewayError> {
        let gateway = self.gateway;

        gateway.create_branch(&pending.temp_branch)?;
        pending.stage = RewriteStage::TempBranchCreated;
        gateway.checkout(&pending.temp_branch)?;
        debug!(branch = %pending.temp_branch, "checked out temporary branch");

        gateway.hard_reset(&pending.anchor)?;
        for commit in selection.oldest_to_newest() {
            gateway.cherry_pick(&commit.hash)?;
            debug!(commit = %commit.short_hash(), "replayed selected commit");
        }
        gateway.soft_reset(&pending.anchor)?;
        let squashed = gateway.commit(message)?;
        pending.squashed = Some(squashed.clone());
        pending.stage = RewriteStage::Reconstructed;
        debug!(commit = %squashed, "built squashed commit");

        gateway.checkout(&pending.original_branch)?;
        gateway.hard_reset(&pending.anchor)?;
        pending.original_reset = true;
        gateway.cherry_pick(&squashed)?;
        for commit in &pending.replay {
            gateway.cherry_pick(&commit.hash)?;
            debug!(commit = %commit.short_hash(), "replayed unselected commit");
        }
        pending.stage = RewriteStage::Transplanted;

        let rebuilt = gateway.log(pending.replay.len() + 1)?;
        let new_commit = rebuilt
            .last()
            .map(|c| c.hash.clone())
            .ok_or(GatewayError::EmptyRepository)?;

        gateway.delete_branch(&pending.temp_branch, true)?;
        pending.stage = RewriteStage::CleanedUp;

        info!(commit = %new_commit, replayed = pending.replay.len(), "general-path squash complete");
        Ok(new_commit)
    }

    /// Best-effort cleanup after a failed step. Errors here are logged, never returned.
    fn roll_back(&self, pending: &mut PendingRewrite) {
        let temp_created = pending.stage >= RewriteStage::TempBranchCreated;

        match self.gateway.checkout(&pending.original_branch) {
            Ok(()) => {
                if pending.original_reset {
                    match self.gateway.hard_reset(&pending.original_tip) {
                        Ok(()) => info!(
                            branch = %pending.original_branch,
                            tip = %pending.original_tip,
                            "restored original branch tip"
                        ),
                        Err(e) => warn!(
                            "Could not restore {} to {}: {e}",
                            pending.original_branch, pending.original_tip
                        ),
                    }
                }
            }
            Err(e) => warn!(
                "Could not check out {} during rollback: {e}",
                pending.original_branch
            ),
        }

        if temp_created {
            if let Err(e) = self.gateway.delete_branch(&pending.temp_branch, true) {
                debug!("Temporary branch cleanup failed: {e}");
            }
        }

        pending.stage = RewriteStage::RolledBack;
    }
}

/// Builds a branch name that will not collide with an existing ref.
fn temp_branch_name() -> String {
    format!(
        "{TEMP_BRANCH_PREFIX}{}-{}",
        Utc::now().format("%Y%m%d%H%M%S%f"),
        std::process::id()
    )
}
