//! Stashes uncommitted work around a history rewrite.

use tracing::{debug, warn};

use crate::git::{GatewayError, RepositoryGateway};

/// Label given to the stash entry created before a rewrite.
pub const STASH_LABEL: &str = "git-squash: uncommitted changes before squash";

/// Holds uncommitted changes aside while history is rewritten.
///
/// The stash is only popped by [`release`](Self::release). Dropping the guard
/// after a failed rewrite leaves the stash in place for manual recovery.
pub struct WorkingTreeGuard<'g, G: RepositoryGateway + ?Sized> {
    gateway: &'g G,
    stashed: bool,
    uncommitted: usize,
}

impl<'g, G: RepositoryGateway + ?Sized> WorkingTreeGuard<'g, G> {
    /// Stashes uncommitted changes if there are any.
    pub fn acquire(gateway: &'g G) -> Result<Self, GatewayError> {
        let status = gateway.status()?;

        if status.has_changes() {
            debug!(uncommitted = status.uncommitted, "stashing uncommitted changes");
            gateway.stash_save(STASH_LABEL)?;
        }

        Ok(Self {
            gateway,
            stashed: status.has_changes(),
            uncommitted: status.uncommitted,
        })
    }

    /// Returns true if a stash entry was created.
    pub fn is_stashed(&self) -> bool {
        self.stashed
    }

    /// Number of uncommitted paths found at acquisition.
    pub fn uncommitted(&self) -> usize {
        self.uncommitted
    }

    /// Restores stashed changes. Returns whether anything was restored.
    pub fn release(self) -> Result<bool, GatewayError> {
        if !self.stashed {
            return Ok(false);
        }

        if let Err(e) = self.gateway.stash_pop() {
            warn!("Restoring stashed changes failed; they remain in `git stash list` as \"{STASH_LABEL}\"");
            return Err(e);
        }

        debug!("restored stashed changes");
        Ok(true)
    }
}
