//! Git operations and repository management.

pub mod commit;
pub mod gateway;
pub mod repository;

#[cfg(test)]
pub(crate) mod test_utils;

pub use commit::{abbreviate_hash, CommitRecord};
pub use gateway::{GatewayError, RepositoryGateway, WorkingTreeStatus};
pub use repository::GitRepository;

/// Number of hex characters to show in abbreviated commit hashes.
pub const SHORT_HASH_LEN: usize = 8;
