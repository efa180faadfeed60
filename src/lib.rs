//! # git-squash
//!
//! Squash an arbitrary selection of recent commits on the current branch into
//! a single commit.
//!
//! ## Features
//!
//! - Soft-reset squash when the selection is the newest contiguous run
//! - Temporary-branch rebuild for any other selection, replaying unselected
//!   commits in their original order
//! - Automatic stashing of uncommitted changes and rollback on failure
//! - Read-only dry runs, as text or YAML
//!
//! ## Quick Start
//!
//! ```no_run
//! use git_squash::git::GitRepository;
//! use git_squash::squash::{Selection, Squasher};
//!
//! # fn main() -> anyhow::Result<()> {
//! let repo = GitRepository::open()?;
//! let squasher = Squasher::new(&repo);
//! let history = squasher.load_history(10)?;
//! let picked: Vec<String> = history.commits()[..2].iter().map(|c| c.hash.clone()).collect();
//! let selection = Selection::new(picked, &history)?;
//! squasher.squash(&history, &selection, "Combine the last two commits")?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod data;
pub mod git;
pub mod squash;
pub mod utils;

pub use crate::cli::Cli;

/// The current version of git-squash.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
