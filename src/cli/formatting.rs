//! Display formatting shared by the squash command.

use crate::git::{abbreviate_hash, CommitRecord};
use crate::squash::{SquashOutcome, SquashPath};

/// Formats one numbered row of the commit picker.
pub(crate) fn format_commit_row(number: usize, commit: &CommitRecord) -> String {
    format!(
        "{number:>3}. {} {} {}",
        commit.short_hash(),
        commit.date.format("%Y-%m-%d"),
        commit.summary
    )
}

/// Returns every candidate hash that starts with `prefix`.
///
/// An empty prefix matches nothing.
pub(crate) fn matching_hashes<'a>(prefix: &str, candidates: &'a [CommitRecord]) -> Vec<&'a str> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return Vec::new();
    }

    candidates
        .iter()
        .filter(|c| c.hash.starts_with(prefix))
        .map(|c| c.hash.as_str())
        .collect()
}

/// Formats the summary printed after a successful squash.
pub(crate) fn format_outcome(outcome: &SquashOutcome) -> String {
    let mut lines = vec![format!(
        "\u{2705} Squashed {} commits into {} ({})",
        outcome.squashed,
        abbreviate_hash(&outcome.new_commit),
        outcome.path
    )];

    if outcome.path == SquashPath::General {
        lines.push(format!(
            "\u{1f501} Replayed {} unselected commit(s) on top",
            outcome.replayed
        ));
    }

    if outcome.stash_restored {
        lines.push("\u{1f4e6} Restored stashed uncommitted changes".to_string());
    }

    lines.join("\n")
}
