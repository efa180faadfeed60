//! Shared test utilities for the `git` and `squash` modules.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::DateTime;

use crate::git::{CommitRecord, GatewayError, RepositoryGateway, WorkingTreeStatus};

/// File path to content snapshot.
pub(crate) type Tree = BTreeMap<String, String>;

/// Gateway operations that only read state.
const READ_ONLY_OPS: &[&str] = &["log", "status", "current_branch", "resolve_parent"];

#[derive(Debug, Clone)]
struct FakeCommit {
    parent: Option<String>,
    message: String,
    tree: Tree,
    timestamp: i64,
}

#[derive(Debug)]
struct State {
    commits: HashMap<String, FakeCommit>,
    branches: BTreeMap<String, String>,
    head: String,
    index: Tree,
    uncommitted: usize,
    stashes: Vec<usize>,
    next_id: u64,
    calls: Vec<String>,
    failures: Vec<(&'static str, usize)>,
    op_counts: HashMap<&'static str, usize>,
}

/// In-memory repository that models commits as whole-tree snapshots.
///
/// Cherry-picks compute the picked commit's changes against its parent and
/// apply them to HEAD, reporting a conflict when HEAD's version of a touched
/// file is neither the "before" nor the "after" side. Every call is recorded,
/// and [`fail_on`](Self::fail_on) makes the n-th call of an operation fail
/// before it changes anything.
pub(crate) struct FakeRepository {
    state: RefCell<State>,
}

impl FakeRepository {
    /// Creates an empty repository with `main` checked out.
    pub(crate) fn new() -> Self {
        Self {
            state: RefCell::new(State {
                commits: HashMap::new(),
                branches: BTreeMap::new(),
                head: "main".to_string(),
                index: Tree::new(),
                uncommitted: 0,
                stashes: Vec::new(),
                next_id: 0,
                calls: Vec::new(),
                failures: Vec::new(),
                op_counts: HashMap::new(),
            }),
        }
    }

    /// Creates a repository whose commits each add their own file, oldest first.
    pub(crate) fn with_linear_history(messages: &[&str]) -> Self {
        let repo = Self::new();
        for message in messages {
            let path = format!("{}.txt", message.to_lowercase());
            repo.add_commit(message, &[(&path, message)]);
        }
        repo
    }

    /// Makes the `nth` (1-based) call to `op` fail.
    pub(crate) fn fail_on(self, op: &'static str, nth: usize) -> Self {
        self.state.borrow_mut().failures.push((op, nth));
        self
    }

    /// Sets the number of uncommitted paths reported by `status`.
    pub(crate) fn set_uncommitted(&self, count: usize) {
        self.state.borrow_mut().uncommitted = count;
    }

    /// Commits `changes` on top of the checked-out branch and returns the new id.
    pub(crate) fn add_commit(&self, message: &str, changes: &[(&str, &str)]) -> String {
        let mut state = self.state.borrow_mut();
        let parent = state.branches.get(&state.head).cloned();
        let mut tree = parent
            .as_ref()
            .map(|p| state.commits[p].tree.clone())
            .unwrap_or_default();
        for (path, content) in changes {
            tree.insert(path.to_string(), content.to_string());
        }
        state.index = tree.clone();
        state.create_commit(parent, message, tree)
    }

    /// Returns every recorded call, in order.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    /// Returns recorded calls that change repository state.
    pub(crate) fn mutating_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| {
                let op = call.split_whitespace().next().unwrap_or("");
                !READ_ONLY_OPS.contains(&op)
            })
            .collect()
    }

    /// Returns the tip of the checked-out branch.
    pub(crate) fn tip(&self) -> String {
        let state = self.state.borrow();
        state.branches[&state.head].clone()
    }

    /// Returns the checked-out branch name.
    pub(crate) fn head_branch(&self) -> String {
        self.state.borrow().head.clone()
    }

    /// Returns all branch names.
    pub(crate) fn branches(&self) -> Vec<String> {
        self.state.borrow().branches.keys().cloned().collect()
    }

    /// Returns the number of stash entries.
    pub(crate) fn stash_depth(&self) -> usize {
        self.state.borrow().stashes.len()
    }

    /// Returns the uncommitted path count.
    pub(crate) fn uncommitted(&self) -> usize {
        self.state.borrow().uncommitted
    }

    /// Returns the tree of the checked-out branch's tip.
    pub(crate) fn head_tree(&self) -> Tree {
        let state = self.state.borrow();
        let tip = &state.branches[&state.head];
        state.commits[tip].tree.clone()
    }

    /// Returns the tree of an arbitrary commit.
    pub(crate) fn tree_of(&self, id: &str) -> Tree {
        self.state.borrow().commits[id].tree.clone()
    }

    /// Returns `(id, message)` for the whole checked-out history, newest first.
    pub(crate) fn history(&self) -> Vec<(String, String)> {
        let state = self.state.borrow();
        let entries: Vec<(String, String)> = state
            .walk_from(state.branches.get(&state.head).cloned())
            .into_iter()
            .map(|id| {
                let message = state.commits[&id].message.clone();
                (id, message)
            })
            .collect();
        entries
    }

    /// Returns the checked-out history's messages, newest first.
    pub(crate) fn messages(&self) -> Vec<String> {
        self.history().into_iter().map(|(_, m)| m).collect()
    }

    /// Returns the id of the first commit created with `message`.
    pub(crate) fn id_of(&self, message: &str) -> String {
        let state = self.state.borrow();
        let mut matches: Vec<(&String, &FakeCommit)> = state
            .commits
            .iter()
            .filter(|(_, c)| c.message == message)
            .collect();
        matches.sort_by_key(|(_, c)| c.timestamp);
        matches
            .first()
            .map(|(id, _)| (*id).clone())
            .unwrap_or_else(|| panic!("no commit with message {message:?}"))
    }

    fn record(&self, op: &'static str, detail: &str) -> Result<(), GatewayError> {
        let mut state = self.state.borrow_mut();
        let call = if detail.is_empty() {
            op.to_string()
        } else {
            format!("{op} {detail}")
        };
        state.calls.push(call.clone());

        let count = state.op_counts.entry(op).or_insert(0);
        *count += 1;
        let count = *count;

        if state.failures.contains(&(op, count)) {
            return Err(GatewayError::CommandFailed {
                args: call,
                output: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl State {
    fn create_commit(&mut self, parent: Option<String>, message: &str, tree: Tree) -> String {
        self.next_id += 1;
        let id = format!("c{:07x}{}", self.next_id, "0".repeat(32));
        self.commits.insert(
            id.clone(),
            FakeCommit {
                parent,
                message: message.to_string(),
                tree,
                timestamp: 1_700_000_000 + self.next_id as i64 * 60,
            },
        );
        self.branches.insert(self.head.clone(), id.clone());
        id
    }

    fn walk_from(&self, tip: Option<String>) -> Vec<String> {
        let mut ids = Vec::new();
        let mut cursor = tip;
        while let Some(id) = cursor {
            cursor = self.commits[&id].parent.clone();
            ids.push(id);
        }
        ids
    }

    fn tip_tree(&self) -> Tree {
        self.branches
            .get(&self.head)
            .map(|tip| self.commits[tip].tree.clone())
            .unwrap_or_default()
    }

    fn require_commit(&self, id: &str) -> Result<&FakeCommit, GatewayError> {
        self.commits
            .get(id)
            .ok_or_else(|| GatewayError::CommandFailed {
                args: id.to_string(),
                output: format!("unknown revision {id}"),
            })
    }
}

fn failed(args: &str, output: &str) -> GatewayError {
    GatewayError::CommandFailed {
        args: args.to_string(),
        output: output.to_string(),
    }
}

impl RepositoryGateway for FakeRepository {
    fn log(&self, max_count: usize) -> Result<Vec<CommitRecord>, GatewayError> {
        self.record("log", &max_count.to_string())?;
        let state = self.state.borrow();
        let tip = state
            .branches
            .get(&state.head)
            .cloned()
            .ok_or(GatewayError::EmptyRepository)?;

        let records: Vec<CommitRecord> = state
            .walk_from(Some(tip))
            .into_iter()
            .take(max_count)
            .map(|id| {
                let commit = &state.commits[&id];
                let date = DateTime::from_timestamp(commit.timestamp, 0)
                    .expect("valid timestamp")
                    .fixed_offset();
                CommitRecord::new(id, date, commit.message.clone())
            })
            .collect();
        Ok(records)
    }

    fn status(&self) -> Result<WorkingTreeStatus, GatewayError> {
        self.record("status", "")?;
        Ok(WorkingTreeStatus {
            uncommitted: self.state.borrow().uncommitted,
        })
    }

    fn current_branch(&self) -> Result<String, GatewayError> {
        self.record("current_branch", "")?;
        Ok(self.state.borrow().head.clone())
    }

    fn create_branch(&self, name: &str) -> Result<(), GatewayError> {
        self.record("create_branch", name)?;
        let mut state = self.state.borrow_mut();
        if state.branches.contains_key(name) {
            return Err(failed(name, "branch already exists"));
        }
        let tip = state
            .branches
            .get(&state.head)
            .cloned()
            .ok_or(GatewayError::EmptyRepository)?;
        state.branches.insert(name.to_string(), tip);
        Ok(())
    }

    fn checkout(&self, name: &str) -> Result<(), GatewayError> {
        self.record("checkout", name)?;
        let mut state = self.state.borrow_mut();
        if !state.branches.contains_key(name) {
            return Err(failed(name, "no such branch"));
        }
        state.head = name.to_string();
        state.index = state.tip_tree();
        Ok(())
    }

    fn delete_branch(&self, name: &str, force: bool) -> Result<(), GatewayError> {
        self.record("delete_branch", &format!("{name} force={force}"))?;
        let mut state = self.state.borrow_mut();
        if state.head == name {
            return Err(failed(name, "cannot delete the checked-out branch"));
        }
        state
            .branches
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| failed(name, "no such branch"))
    }

    fn soft_reset(&self, to: &str) -> Result<(), GatewayError> {
        self.record("soft_reset", to)?;
        let mut state = self.state.borrow_mut();
        state.require_commit(to)?;
        let head = state.head.clone();
        state.branches.insert(head, to.to_string());
        Ok(())
    }

    fn hard_reset(&self, to: &str) -> Result<(), GatewayError> {
        self.record("hard_reset", to)?;
        let mut state = self.state.borrow_mut();
        let tree = state.require_commit(to)?.tree.clone();
        let head = state.head.clone();
        state.branches.insert(head, to.to_string());
        state.index = tree;
        state.uncommitted = 0;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<String, GatewayError> {
        self.record("commit", message)?;
        let mut state = self.state.borrow_mut();
        if state.index == state.tip_tree() {
            return Err(failed("commit", "nothing to commit"));
        }
        let parent = state.branches.get(&state.head).cloned();
        let tree = state.index.clone();
        Ok(state.create_commit(parent, message, tree))
    }

    fn cherry_pick(&self, id: &str) -> Result<(), GatewayError> {
        self.record("cherry_pick", id)?;
        let mut state = self.state.borrow_mut();
        let picked = state.require_commit(id)?.clone();
        let before = picked
            .parent
            .as_ref()
            .map(|p| state.commits[p].tree.clone())
            .unwrap_or_default();

        let head_tree = state.tip_tree();
        let mut result = head_tree.clone();
        let mut changed = false;

        let paths: BTreeSet<&String> = before.keys().chain(picked.tree.keys()).collect();
        for path in paths {
            let old = before.get(path);
            let new = picked.tree.get(path);
            if old == new {
                continue;
            }
            changed = true;
            let current = head_tree.get(path);
            if current == new {
                continue;
            }
            if current != old {
                return Err(GatewayError::Conflict {
                    commit: id.to_string(),
                    detail: format!("CONFLICT (content): Merge conflict in {path}"),
                });
            }
            match new {
                Some(content) => result.insert(path.clone(), content.clone()),
                None => result.remove(path),
            };
        }

        if changed && result == head_tree {
            return Err(failed(id, "The previous cherry-pick is now empty"));
        }

        let parent = state.branches.get(&state.head).cloned();
        state.index = result.clone();
        state.create_commit(parent, &picked.message, result);
        Ok(())
    }

    fn stash_save(&self, label: &str) -> Result<(), GatewayError> {
        self.record("stash_save", label)?;
        let mut state = self.state.borrow_mut();
        let pending = state.uncommitted;
        state.stashes.push(pending);
        state.uncommitted = 0;
        Ok(())
    }

    fn stash_pop(&self) -> Result<(), GatewayError> {
        self.record("stash_pop", "")?;
        let mut state = self.state.borrow_mut();
        let pending = state
            .stashes
            .pop()
            .ok_or_else(|| failed("stash pop", "No stash entries found."))?;
        state.uncommitted = pending;
        Ok(())
    }

    fn resolve_parent(&self, id: &str) -> Result<String, GatewayError> {
        self.record("resolve_parent", id)?;
        let state = self.state.borrow();
        let parent = state.require_commit(id)?.parent.clone();
        parent.ok_or_else(|| GatewayError::NoParent(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_history_is_newest_first() {
        let repo = FakeRepository::with_linear_history(&["C1", "C2", "C3"]);
        assert_eq!(repo.messages(), vec!["C3", "C2", "C1"]);
        let log = repo.log(2).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].summary, "C3");
    }

    #[test]
    fn cherry_pick_applies_changes_onto_head() {
        let repo = FakeRepository::with_linear_history(&["C1", "C2", "C3"]);
        let c3 = repo.id_of("C3");
        repo.hard_reset(&repo.id_of("C1")).unwrap();
        repo.cherry_pick(&c3).unwrap();

        let tree = repo.head_tree();
        assert!(tree.contains_key("c3.txt"));
        assert!(!tree.contains_key("c2.txt"));
        assert_eq!(repo.messages(), vec!["C3", "C1"]);
    }

    #[test]
    fn cherry_pick_reports_conflicts_without_moving_head() {
        let repo = FakeRepository::new();
        repo.add_commit("base", &[("shared.txt", "a")]);
        repo.add_commit("middle", &[("shared.txt", "b")]);
        let last = repo.add_commit("last", &[("shared.txt", "c")]);
        let base = repo.id_of("base");
        repo.hard_reset(&base).unwrap();

        let err = repo.cherry_pick(&last).unwrap_err();
        assert!(matches!(err, GatewayError::Conflict { .. }));
        assert_eq!(repo.tip(), base);
    }

    #[test]
    fn injected_failure_hits_only_the_nth_call() {
        let repo = FakeRepository::with_linear_history(&["C1", "C2"]).fail_on("status", 2);
        assert!(repo.status().is_ok());
        assert!(repo.status().is_err());
        assert!(repo.status().is_ok());
    }

    #[test]
    fn soft_reset_then_commit_collapses_changes() {
        let repo = FakeRepository::with_linear_history(&["C1", "C2", "C3"]);
        repo.soft_reset(&repo.id_of("C1")).unwrap();
        repo.commit("squashed").unwrap();

        assert_eq!(repo.messages(), vec!["squashed", "C1"]);
        assert_eq!(repo.head_tree().len(), 3);
    }
}
