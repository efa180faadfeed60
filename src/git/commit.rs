//! Commit records read from history.

use chrono::{DateTime, FixedOffset};
use git2::Commit;
use serde::{Deserialize, Serialize};

use crate::git::{GatewayError, SHORT_HASH_LEN};

/// Immutable snapshot of one commit as seen by a single history read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Full SHA-1 hash of the commit.
    pub hash: String,
    /// Author date with its original timezone.
    pub date: DateTime<FixedOffset>,
    /// First line of the commit message.
    pub summary: String,
    /// The complete commit message.
    pub message: String,
}

impl CommitRecord {
    /// Builds a record from a `git2::Commit`.
    pub fn from_git_commit(commit: &Commit) -> Result<Self, GatewayError> {
        let hash = commit.id().to_string();

        let timestamp = commit.author().when();
        let offset = FixedOffset::east_opt(timestamp.offset_minutes() * 60)
            .or_else(|| FixedOffset::east_opt(0))
            .ok_or_else(|| git2::Error::from_str("Invalid commit timezone offset"))?;
        let date = DateTime::from_timestamp(timestamp.seconds(), 0)
            .ok_or_else(|| git2::Error::from_str("Invalid commit timestamp"))?
            .with_timezone(&offset);

        let message = commit.message().unwrap_or("").to_string();

        Ok(Self::new(hash, date, message))
    }

    /// Builds a record, deriving the summary from the message.
    pub fn new(hash: String, date: DateTime<FixedOffset>, message: String) -> Self {
        let summary = summary_line(&message).to_string();
        Self {
            hash,
            date,
            summary,
            message,
        }
    }

    /// Returns the abbreviated hash.
    pub fn short_hash(&self) -> &str {
        abbreviate_hash(&self.hash)
    }
}

/// Truncates a commit hash to [`SHORT_HASH_LEN`] characters.
pub fn abbreviate_hash(hash: &str) -> &str {
    if hash.len() > SHORT_HASH_LEN {
        &hash[..SHORT_HASH_LEN]
    } else {
        hash
    }
}

/// Returns the first non-empty line of a commit message.
pub fn summary_line(message: &str) -> &str {
    message
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}
