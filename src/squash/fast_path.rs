//! In-place squash for the newest contiguous run of commits.

use tracing::{debug, info, warn};

use crate::git::{GatewayError, RepositoryGateway};
use crate::squash::Selection;

/// Squashes a fast-path selection: soft reset below the oldest selected
/// commit, then commit the staged result with `message`.
///
/// If the commit is refused (a hook, signing, or a net-empty change) the
/// branch is moved back to the selection's tip before the error is returned.
///
/// Returns the new commit's hash.
pub fn squash_in_place<G>(
    gateway: &G,
    selection: &Selection,
    message: &str,
) -> Result<String, GatewayError>
where
    G: RepositoryGateway + ?Sized,
{
    let anchor = gateway.resolve_parent(&selection.oldest().hash)?;
    debug!(anchor = %anchor, count = selection.len(), "soft resetting for fast-path squash");

    gateway.soft_reset(&anchor)?;
    let new_commit = match gateway.commit(message) {
        Ok(commit) => commit,
        Err(e) => {
            restore_tip(gateway, selection.tip());
            return Err(e);
        }
    };

    info!(commit = %new_commit, "fast-path squash committed");
    Ok(new_commit)
}

fn restore_tip<G>(gateway: &G, tip: &str)
where
    G: RepositoryGateway + ?Sized,
{
    match gateway.soft_reset(tip) {
        Ok(()) => info!(tip = %tip, "restored branch tip after failed commit"),
        Err(e) => warn!("Could not move the branch back to {tip}: {e}"),
    }
}
