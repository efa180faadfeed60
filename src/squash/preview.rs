//! Read-only before/after projection of a squash.

use std::fmt;

use serde::Serialize;

use crate::git::commit::summary_line;
use crate::git::{CommitRecord, SHORT_HASH_LEN};
use crate::squash::{CommitHistory, Selection, SquashPath};

/// Smallest number of commits shown in a preview.
pub const MIN_PREVIEW_WINDOW: usize = 10;

/// Extra commits shown past the selection size.
pub const PREVIEW_MARGIN: usize = 3;

/// Placeholder hash for the commit the squash would create.
pub const NEW_COMMIT_MARKER: &str = "NEW";

/// One line of a preview listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewEntry {
    /// Abbreviated hash, or [`NEW_COMMIT_MARKER`].
    pub hash: String,
    /// Commit summary.
    pub summary: String,
    /// Whether the commit is part of the selection.
    pub selected: bool,
}

impl PreviewEntry {
    fn from_commit(commit: &CommitRecord, selected: bool) -> Self {
        Self {
            hash: commit.short_hash().to_string(),
            summary: commit.summary.clone(),
            selected,
        }
    }

    /// Returns true for the placeholder entry.
    pub fn is_new(&self) -> bool {
        self.hash == NEW_COMMIT_MARKER
    }
}

/// What a squash would do, computed without touching the repository.
#[derive(Debug, Clone, Serialize)]
pub struct DryRunPreview {
    /// Strategy the squash would use.
    pub path: SquashPath,
    /// Message for the squashed commit.
    pub message: String,
    /// Number of commits that would be squashed.
    pub selected: usize,
    /// Uncommitted paths that would be stashed and restored.
    pub uncommitted_changes: usize,
    /// The listed history as it is now, newest first.
    pub before: Vec<PreviewEntry>,
    /// The listed history as it would be afterwards, newest first.
    pub after: Vec<PreviewEntry>,
}

impl DryRunPreview {
    /// Projects `selection` onto `history`.
    pub fn build(
        history: &CommitHistory,
        selection: &Selection,
        message: &str,
        uncommitted_changes: usize,
    ) -> Self {
        let window = preview_window(history.len(), selection);
        let oldest = selection.oldest_position();
        let shown = &history.commits()[..window];

        let before = shown
            .iter()
            .map(|commit| PreviewEntry::from_commit(commit, selection.contains(&commit.hash)))
            .collect();

        let after = shown
            .iter()
            .enumerate()
            .filter_map(|(offset, commit)| {
                if offset == oldest {
                    Some(PreviewEntry {
                        hash: NEW_COMMIT_MARKER.to_string(),
                        summary: summary_line(message).to_string(),
                        selected: true,
                    })
                } else if selection.contains(&commit.hash) {
                    None
                } else {
                    Some(PreviewEntry::from_commit(commit, false))
                }
            })
            .collect();

        Self {
            path: selection.classify(history),
            message: message.to_string(),
            selected: selection.len(),
            uncommitted_changes,
            before,
            after,
        }
    }
}

/// Number of commits a preview lists: at least [`MIN_PREVIEW_WINDOW`], the
/// selection plus [`PREVIEW_MARGIN`], and always down to the oldest selection.
pub fn preview_window(history_len: usize, selection: &Selection) -> usize {
    MIN_PREVIEW_WINDOW
        .max(selection.len() + PREVIEW_MARGIN)
        .max(selection.oldest_position() + 1)
        .min(history_len)
}

impl fmt::Display for DryRunPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dry run: squash {} commits via {}", self.selected, self.path)?;
        writeln!(f, "Message: {}", summary_line(&self.message))?;
        if self.uncommitted_changes > 0 {
            writeln!(
                f,
                "Uncommitted changes: {} (would be stashed and restored)",
                self.uncommitted_changes
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Before:")?;
        for entry in &self.before {
            write_entry(f, entry)?;
        }

        writeln!(f)?;
        writeln!(f, "After:")?;
        for entry in &self.after {
            write_entry(f, entry)?;
        }
        Ok(())
    }
}

fn write_entry(f: &mut fmt::Formatter<'_>, entry: &PreviewEntry) -> fmt::Result {
    let marker = match (entry.is_new(), entry.selected) {
        (true, _) => '+',
        (false, true) => '*',
        (false, false) => ' ',
    };
    writeln!(
        f,
        "  {marker} {:<width$} {}",
        entry.hash,
        entry.summary,
        width = SHORT_HASH_LEN
    )
}
