//! Hunk locks: which stack a hunk's changes already belong to.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::diff::{DiffHunk, FileDiff, LineId};

/// Marks a hunk as tied to a commit on a stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HunkLock {
    pub stack_id: String,
    pub commit_id: String,
}

impl HunkLock {
    pub fn new(stack_id: impl Into<String>, commit_id: impl Into<String>) -> Self {
        Self {
            stack_id: stack_id.into(),
            commit_id: commit_id.into(),
        }
    }
}

/// One dependency entry: a hunk of `path` and the locks it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HunkDependency {
    pub path: String,
    pub hunk: DiffHunk,
    #[serde(default)]
    pub locks: Vec<HunkLock>,
}

impl HunkDependency {
    /// True if any lock ties this hunk to a stack other than `stack_id`.
    pub fn locked_elsewhere(&self, stack_id: &str) -> bool {
        self.locks.iter().any(|lock| lock.stack_id != stack_id)
    }
}

/// Locks covering a single change line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineLock {
    pub line: LineId,
    pub locks: Vec<HunkLock>,
}

/// Dependency entries grouped by file path.
///
/// Files without entries are unlocked, so missing data never blocks a
/// selection; the apply engine validates again before writing anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<HunkDependency>")]
pub struct HunkLocks {
    files: BTreeMap<String, Vec<HunkDependency>>,
}

impl From<Vec<HunkDependency>> for HunkLocks {
    fn from(deps: Vec<HunkDependency>) -> Self {
        deps.into_iter().collect()
    }
}

impl FromIterator<HunkDependency> for HunkLocks {
    fn from_iter<I: IntoIterator<Item = HunkDependency>>(iter: I) -> Self {
        let mut files: BTreeMap<String, Vec<HunkDependency>> = BTreeMap::new();
        for dep in iter {
            files.entry(dep.path.clone()).or_default().push(dep);
        }
        Self { files }
    }
}

impl HunkLocks {
    /// Build from `(path, hunk, locks)` triples.
    pub fn from_triples<I>(triples: I) -> Self
    where
        I: IntoIterator<Item = (String, DiffHunk, Vec<HunkLock>)>,
    {
        triples
            .into_iter()
            .map(|(path, hunk, locks)| HunkDependency { path, hunk, locks })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Dependency entries recorded for `path`.
    pub fn for_file(&self, path: &str) -> &[HunkDependency] {
        self.files.get(path).map(Vec::as_slice).unwrap_or_default()
    }

    /// A file is selectable for `stack_id` unless one of its hunks carries a
    /// lock to another stack.
    ///
    /// Selectability is decided per file: one foreign lock excludes the
    /// unlocked hunks of the same file as well.
    pub fn is_file_selectable(&self, path: &str, stack_id: &str) -> bool {
        let selectable = !self
            .for_file(path)
            .iter()
            .any(|dep| dep.locked_elsewhere(stack_id));
        if !selectable {
            log::debug!("{path} is locked to another stack than {stack_id}");
        }
        selectable
    }

    /// The files of `changes` that may be selected for `stack_id`, in order.
    pub fn selectable_files<'a>(&self, changes: &'a [FileDiff], stack_id: &str) -> Vec<&'a FileDiff> {
        changes
            .iter()
            .filter(|file| self.is_file_selectable(&file.path, stack_id))
            .collect()
    }
}

/// Locks on each change line of `hunk`, taken from every entry of `deps`
/// whose hunk contains the line.
///
/// Lines without locks are left out. The flag is true when the hunk has
/// change lines and every one of them is locked.
pub fn get_line_locks(hunk: &DiffHunk, deps: &[HunkDependency]) -> (bool, Vec<LineLock>) {
    let change_ids = hunk.change_ids();

    let line_locks: Vec<LineLock> = change_ids
        .iter()
        .filter_map(|line| {
            let locks: Vec<HunkLock> = deps
                .iter()
                .filter(|dep| dep.hunk.header.contains_line(line))
                .flat_map(|dep| dep.locks.iter().cloned())
                .collect();
            (!locks.is_empty()).then_some(LineLock { line: *line, locks })
        })
        .collect();

    let fully_locked = !change_ids.is_empty() && line_locks.len() == change_ids.len();
    (fully_locked, line_locks)
}
