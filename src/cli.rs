//! CLI interface for git-squash.

use std::io::{self, BufReader, IsTerminal};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::debug;

use crate::data::to_yaml;
use crate::squash::{CommitHistory, Selection, SquashError, Squasher};
use crate::utils::{check_git_cli, check_git_repository, check_rewrite_prerequisites, Settings};

pub mod formatting;
pub mod prompt;

/// Output format for dry-run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable before/after listing.
    Text,
    /// Machine-readable YAML.
    Yaml,
}

/// git-squash: squash any selection of recent commits into one.
#[derive(Parser, Debug)]
#[command(name = "git-squash")]
#[command(about = "Squash any selection of recent commits into one", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Number of recent commits to list [default: $GIT_SQUASH_COUNT or 10].
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub count: Option<u32>,

    /// Message for the squashed commit; skips the message prompt.
    #[arg(short, long)]
    pub message: Option<String>,

    /// Commit to squash, by full or abbreviated hash; repeat to skip the picker.
    #[arg(short = 'c', long = "commit", value_name = "HASH")]
    pub commits: Vec<String>,

    /// Show what the squash would do without changing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Output format for --dry-run.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl Cli {
    /// Executes the squash command.
    pub fn execute(self) -> Result<()> {
        check_git_cli()?;
        let repo = check_git_repository()?;
        check_rewrite_prerequisites(&repo)?;

        let count = match self.count {
            Some(count) => count as usize,
            None => Settings::load()?.commit_count()?,
        };
        debug!(count, "listing recent commits");

        let squasher = Squasher::new(&repo);
        let history = match squasher.load_history(count) {
            Ok(history) => history,
            Err(e) if e.is_early_exit() => {
                println!("\u{2139}\u{fe0f}  {e}");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let is_terminal = io::stdin().is_terminal();
        let mut reader = BufReader::new(io::stdin());

        let hashes = if self.commits.is_empty() {
            match prompt::select_commits(&history, is_terminal, &mut reader)? {
                Some(hashes) => hashes,
                None => {
                    println!("\u{274c} No commits selected");
                    return Ok(());
                }
            }
        } else {
            resolve_presets(&self.commits, &history)?
        };

        let selection = match Selection::new(hashes, &history) {
            Ok(selection) => selection,
            Err(e @ SquashError::TooFewSelected { .. }) => {
                println!("\u{2139}\u{fe0f}  {e}");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let message = match self.message {
            Some(message) => message,
            None => match prompt::prompt_message(&selection, is_terminal, &mut reader)? {
                Some(message) => message,
                None => {
                    println!("\u{274c} Squash cancelled");
                    return Ok(());
                }
            },
        };

        if self.dry_run {
            let preview = squasher.preview(&history, &selection, &message)?;
            match self.format {
                OutputFormat::Text => print!("{preview}"),
                OutputFormat::Yaml => print!("{}", to_yaml(&preview)?),
            }
            return Ok(());
        }

        println!(
            "\u{1f504} Squashing {} commits via {}...",
            selection.len(),
            selection.classify(&history)
        );
        let outcome = squasher
            .squash(&history, &selection, &message)
            .context("Squash failed; the branch was left as it was")?;

        println!("{}", formatting::format_outcome(&outcome));
        Ok(())
    }
}

/// Resolves `--commit` values to full hashes within the listed history.
fn resolve_presets(presets: &[String], history: &CommitHistory) -> Result<Vec<String>> {
    presets
        .iter()
        .map(|prefix| -> Result<String> {
            let matches = formatting::matching_hashes(prefix, history.commits());
            match matches.as_slice() {
                [hash] => Ok((*hash).to_string()),
                [] => bail!(
                    "Commit {prefix:?} is not among the {} most recent commits",
                    history.len()
                ),
                _ => bail!("Commit {prefix:?} is ambiguous; use a longer hash"),
            }
        })
        .collect()
}
