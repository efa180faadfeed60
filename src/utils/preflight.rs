//! Preflight validation checks for early failure detection
//!
//! These run before any history is read so that a misconfigured environment
//! fails with a clear message instead of halfway through a rewrite.

use anyhow::{bail, Context, Result};
use git2::RepositoryState;

use crate::git::{GitRepository, RepositoryGateway};

/// Validate that the `git` executable is available
///
/// History rewrites shell out to `git`, so a missing binary must be caught
/// before anything is changed.
pub fn check_git_cli() -> Result<()> {
    let output = std::process::Command::new("git")
        .arg("--version")
        .output()
        .context("git executable not found. Install git and make sure it is in PATH.")?;

    if !output.status.success() {
        bail!(
            "git --version failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(())
}

/// Validate that the current directory is a git repository and open it
pub fn check_git_repository() -> Result<GitRepository> {
    GitRepository::open().context(
        "Not in a git repository. Please run this command from within a git repository.",
    )
}

/// Validate that the repository can be rewritten safely
///
/// This checks:
/// 1. No merge, rebase, cherry-pick or similar operation is in progress
/// 2. HEAD is on a branch
pub fn check_rewrite_prerequisites(repo: &GitRepository) -> Result<()> {
    let state = repo.state();
    if state != RepositoryState::Clean {
        bail!(
            "Repository has an operation in progress ({}). Finish or abort it first.",
            describe_state(state)
        );
    }

    repo.current_branch()
        .context("Check out a branch before squashing commits")?;

    Ok(())
}

fn describe_state(state: RepositoryState) -> &'static str {
    match state {
        RepositoryState::Clean => "none",
        RepositoryState::Merge => "merge",
        RepositoryState::Revert | RepositoryState::RevertSequence => "revert",
        RepositoryState::CherryPick | RepositoryState::CherryPickSequence => "cherry-pick",
        RepositoryState::Bisect => "bisect",
        RepositoryState::Rebase
        | RepositoryState::RebaseInteractive
        | RepositoryState::RebaseMerge => "rebase",
        RepositoryState::ApplyMailbox | RepositoryState::ApplyMailboxOrRebase => "am",
    }
}
