//! Interactive commit selection and message entry.
//!
//! `is_terminal` and `reader` are injected so tests can drive the prompts
//! without blocking on real stdin.

use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};

use crate::cli::formatting::format_commit_row;
use crate::squash::selection::MIN_SELECTION;
use crate::squash::{CommitHistory, Selection};

/// Parses a picker answer such as `1,3` or `2-4 6` into zero-based offsets.
///
/// Numbers are one-based and must lie within `1..=max`. Duplicates collapse.
pub(crate) fn parse_selection(input: &str, max: usize) -> Result<Vec<usize>> {
    let mut picked = BTreeSet::new();

    for token in input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let (start, end) = match token.split_once('-') {
            Some((a, b)) => (parse_number(a, max)?, parse_number(b, max)?),
            None => {
                let n = parse_number(token, max)?;
                (n, n)
            }
        };

        if start > end {
            bail!("Range {token} runs backwards");
        }
        picked.extend(start - 1..end);
    }

    Ok(picked.into_iter().collect())
}

fn parse_number(text: &str, max: usize) -> Result<usize> {
    let n: usize = text
        .trim()
        .parse()
        .with_context(|| format!("{text:?} is not a commit number"))?;
    if n == 0 || n > max {
        bail!("{n} is out of range (1-{max})");
    }
    Ok(n)
}

/// Lists `history` and asks which commits to squash.
///
/// Returns the chosen hashes, or `None` when input is unavailable.
pub(crate) fn select_commits(
    history: &CommitHistory,
    is_terminal: bool,
    reader: &mut (dyn BufRead + Send),
) -> Result<Option<Vec<String>>> {
    println!("\n\u{1f4cb} Recent commits (newest first):");
    for (offset, commit) in history.commits().iter().enumerate() {
        println!("{}", format_commit_row(offset + 1, commit));
    }
    println!();

    if !is_terminal {
        eprintln!("warning: stdin is not interactive, cannot prompt for commits; pass --commit instead");
        return Ok(None);
    }

    loop {
        print!("\u{2753} Commits to squash (e.g. 1,3 or 2-4): ");
        io::stdout().flush()?;

        let mut input = String::new();
        let bytes = reader.read_line(&mut input)?;
        if bytes == 0 {
            eprintln!("warning: stdin closed, cancelling squash");
            return Ok(None);
        }

        let offsets = match parse_selection(&input, history.len()) {
            Ok(offsets) => offsets,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        if offsets.len() < MIN_SELECTION {
            println!("Select at least {MIN_SELECTION} commits.");
            continue;
        }

        let hashes = offsets
            .iter()
            .filter_map(|&offset| history.at(offset))
            .map(|commit| commit.hash.clone())
            .collect();
        return Ok(Some(hashes));
    }
}

/// Asks for the squashed commit's message, reprompting until it is non-blank.
///
/// Returns `None` when input is unavailable.
pub(crate) fn prompt_message(
    selection: &Selection,
    is_terminal: bool,
    reader: &mut (dyn BufRead + Send),
) -> Result<Option<String>> {
    println!("\n\u{1f4dd} Squashing {} commits:", selection.len());
    for commit in selection.commits() {
        println!("   {} {}", commit.short_hash(), commit.summary);
    }

    if !is_terminal {
        eprintln!("warning: stdin is not interactive, cannot prompt for a message; pass --message instead");
        return Ok(None);
    }

    loop {
        print!("\u{270f}\u{fe0f}  Commit message: ");
        io::stdout().flush()?;

        let mut input = String::new();
        let bytes = reader.read_line(&mut input)?;
        if bytes == 0 {
            eprintln!("warning: stdin closed, cancelling squash");
            return Ok(None);
        }

        let message = input.trim();
        if message.is_empty() {
            println!("The commit message cannot be empty.");
            continue;
        }
        return Ok(Some(message.to_string()));
    }
}
