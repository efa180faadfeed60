//! Abstract repository boundary used by every squash component.

use thiserror::Error;

use crate::git::CommitRecord;

/// Errors surfaced by a [`RepositoryGateway`] operation.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// A cherry-pick could not be applied cleanly.
    #[error("Cherry-pick of {commit} conflicted: {detail}")]
    Conflict {
        /// Commit whose changes could not be applied.
        commit: String,
        /// Backend output describing the conflict.
        detail: String,
    },

    /// A backend command exited unsuccessfully.
    #[error("git {args} failed: {output}")]
    CommandFailed {
        /// Arguments passed to the backend.
        args: String,
        /// Captured stderr, or stdout when stderr was empty.
        output: String,
    },

    /// The commit is a root commit and has no parent to squash onto.
    #[error("Commit {0} has no parent")]
    NoParent(String),

    /// HEAD does not point at a branch.
    #[error("Repository is in detached HEAD state")]
    DetachedHead,

    /// The repository has no commits.
    #[error("Repository has no commits")]
    EmptyRepository,

    /// libgit2 error.
    #[error(transparent)]
    Git(#[from] git2::Error),

    /// Failure to launch the backend process.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Uncommitted state of the working tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkingTreeStatus {
    /// Number of paths with uncommitted changes, untracked files included.
    pub uncommitted: usize,
}

impl WorkingTreeStatus {
    /// Returns true when anything would be lost by a hard reset.
    pub fn has_changes(&self) -> bool {
        self.uncommitted > 0
    }
}

/// Capability set the squash algorithms need from a version-control backend.
///
/// Every call performs exactly one backend operation and returns once it has
/// completed. Nothing is retried; failures are handed back unchanged.
pub trait RepositoryGateway {
    /// Reads up to `max_count` commits reachable from HEAD, most recent first.
    fn log(&self, max_count: usize) -> Result<Vec<CommitRecord>, GatewayError>;

    /// Reports uncommitted changes.
    fn status(&self) -> Result<WorkingTreeStatus, GatewayError>;

    /// Returns the short name of the checked-out branch.
    fn current_branch(&self) -> Result<String, GatewayError>;

    /// Creates a branch at HEAD without switching to it.
    fn create_branch(&self, name: &str) -> Result<(), GatewayError>;

    /// Switches to an existing branch.
    fn checkout(&self, name: &str) -> Result<(), GatewayError>;

    /// Deletes a local branch.
    fn delete_branch(&self, name: &str, force: bool) -> Result<(), GatewayError>;

    /// Moves the branch tip, leaving index and working tree alone.
    fn soft_reset(&self, to: &str) -> Result<(), GatewayError>;

    /// Moves the branch tip and discards tracked index and working-tree differences.
    fn hard_reset(&self, to: &str) -> Result<(), GatewayError>;

    /// Commits the index and returns the new commit's identity.
    fn commit(&self, message: &str) -> Result<String, GatewayError>;

    /// Replays a single commit's changes on top of HEAD as a new commit.
    fn cherry_pick(&self, id: &str) -> Result<(), GatewayError>;

    /// Stashes all uncommitted changes under `label`.
    fn stash_save(&self, label: &str) -> Result<(), GatewayError>;

    /// Re-applies and drops the most recent stash entry.
    fn stash_pop(&self) -> Result<(), GatewayError>;

    /// Returns the identity of the first parent of `id`.
    fn resolve_parent(&self, id: &str) -> Result<String, GatewayError>;
}
