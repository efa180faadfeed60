//! Git repository operations

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use git2::{Oid, Repository, RepositoryState, Sort, StatusOptions};
use tracing::debug;

use crate::git::{CommitRecord, GatewayError, RepositoryGateway, WorkingTreeStatus};

/// Git repository wrapper.
///
/// Reads go through libgit2. Anything that moves refs or touches the working
/// tree shells out to the `git` executable so hooks, config and the index lock
/// behave exactly as they do for the user's own commands.
pub struct GitRepository {
    repo: Repository,
    workdir: PathBuf,
}

impl GitRepository {
    /// Open repository at current directory
    pub fn open() -> Result<Self> {
        let repo = Repository::open(".").context("Not in a git repository")?;
        Self::from_repository(repo)
    }

    /// Open repository at specified path
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path).context("Failed to open git repository")?;
        Self::from_repository(repo)
    }

    fn from_repository(repo: Repository) -> Result<Self> {
        let workdir = repo
            .workdir()
            .context("Bare repositories have no working tree to rewrite")?
            .to_path_buf();

        Ok(Self { repo, workdir })
    }

    /// Get workdir path
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Get access to the underlying git2::Repository
    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Returns the repository's in-progress operation state.
    pub fn state(&self) -> RepositoryState {
        self.repo.state()
    }

    /// Runs a git command in the working tree and returns its stdout.
    fn run_git(&self, args: &[&str]) -> Result<String, GatewayError> {
        debug!(args = %args.join(" "), "running git");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()?;

        if !output.status.success() {
            return Err(GatewayError::CommandFailed {
                args: args.join(" "),
                output: failure_output(&output),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn head_id(&self) -> Result<String, GatewayError> {
        let head = self.repo.head()?;
        let oid = head.target().ok_or(GatewayError::EmptyRepository)?;
        Ok(oid.to_string())
    }
}

/// Picks the text explaining a failed git command.
///
/// Some failures, such as `commit` with nothing staged, report only on stdout.
fn failure_output(output: &std::process::Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !stderr.is_empty() {
        return stderr;
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

impl RepositoryGateway for GitRepository {
    fn log(&self, max_count: usize) -> Result<Vec<CommitRecord>, GatewayError> {
        let head = match self.repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => {
                return Err(GatewayError::EmptyRepository)
            }
            Err(e) => return Err(e.into()),
        };
        let head_oid = head.target().ok_or(GatewayError::EmptyRepository)?;

        let mut walker = self.repo.revwalk()?;
        walker.push(head_oid)?;
        walker.simplify_first_parent()?;
        walker.set_sorting(Sort::TOPOLOGICAL)?;

        let mut commits = Vec::with_capacity(max_count);
        for oid in walker.take(max_count) {
            let commit = self.repo.find_commit(oid?)?;
            commits.push(CommitRecord::from_git_commit(&commit)?);
        }

        Ok(commits)
    }

    fn status(&self) -> Result<WorkingTreeStatus, GatewayError> {
        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut options))?;
        let uncommitted = statuses
            .iter()
            .filter(|entry| !entry.status().is_ignored())
            .count();

        Ok(WorkingTreeStatus { uncommitted })
    }

    fn current_branch(&self) -> Result<String, GatewayError> {
        let head = self.repo.head()?;

        if head.is_branch() {
            if let Some(name) = head.shorthand() {
                return Ok(name.to_string());
            }
        }

        Err(GatewayError::DetachedHead)
    }

    fn create_branch(&self, name: &str) -> Result<(), GatewayError> {
        self.run_git(&["branch", name])?;
        Ok(())
    }

    fn checkout(&self, name: &str) -> Result<(), GatewayError> {
        self.run_git(&["checkout", "--quiet", name])?;
        Ok(())
    }

    fn delete_branch(&self, name: &str, force: bool) -> Result<(), GatewayError> {
        let flag = if force { "-D" } else { "-d" };
        self.run_git(&["branch", flag, name])?;
        Ok(())
    }

    fn soft_reset(&self, to: &str) -> Result<(), GatewayError> {
        self.run_git(&["reset", "--soft", to])?;
        Ok(())
    }

    fn hard_reset(&self, to: &str) -> Result<(), GatewayError> {
        self.run_git(&["reset", "--hard", "--quiet", to])?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<String, GatewayError> {
        self.run_git(&["commit", "--quiet", "--message", message])?;
        self.head_id()
    }

    fn cherry_pick(&self, id: &str) -> Result<(), GatewayError> {
        match self.run_git(&["cherry-pick", "--allow-empty", id]) {
            Ok(_) => Ok(()),
            Err(GatewayError::CommandFailed { output, .. })
                if self.repo.state() == RepositoryState::CherryPick =>
            {
                // Leave the tree usable for whoever handles the failure.
                if let Err(e) = self.run_git(&["cherry-pick", "--abort"]) {
                    debug!("Cherry-pick abort during cleanup failed: {e}");
                }
                Err(GatewayError::Conflict {
                    commit: id.to_string(),
                    detail: output,
                })
            }
            Err(e) => Err(e),
        }
    }

    fn stash_save(&self, label: &str) -> Result<(), GatewayError> {
        self.run_git(&["stash", "push", "--include-untracked", "--message", label])?;
        Ok(())
    }

    fn stash_pop(&self) -> Result<(), GatewayError> {
        self.run_git(&["stash", "pop", "--quiet"])?;
        Ok(())
    }

    fn resolve_parent(&self, id: &str) -> Result<String, GatewayError> {
        let oid = Oid::from_str(id)?;
        let commit = self.repo.find_commit(oid)?;

        if commit.parent_count() == 0 {
            return Err(GatewayError::NoParent(id.to_string()));
        }

        Ok(commit.parent_id(0)?.to_string())
    }
}
