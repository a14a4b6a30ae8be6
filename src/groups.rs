//! Extraction of contiguous added/removed groups from a hunk.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::diff::{DiffHunk, HunkHeader, LineId, LineKind};

/// Which side of the diff a group of lines belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    Added,
    Removed,
}

impl GroupKind {
    fn of(kind: LineKind) -> Option<Self> {
        match kind {
            LineKind::Added => Some(GroupKind::Added),
            LineKind::Removed => Some(GroupKind::Removed),
            LineKind::Context => None,
        }
    }
}

/// Selected lines of one physical run of added or removed lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineGroup {
    #[serde(rename = "type")]
    pub kind: GroupKind,
    pub lines: Vec<LineId>,
}

impl fmt::Display for LineGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            GroupKind::Added => "added",
            GroupKind::Removed => "removed",
        };
        write!(f, "{kind}")?;
        for line in &self.lines {
            write!(f, " {line}")?;
        }
        Ok(())
    }
}

/// Groups of `hunk` that intersect `selected`, plus the hunk's own header.
///
/// Group boundaries come from the physical diff: a run of removed lines
/// stays one group even when only some of its lines are selected, and
/// context lines or a change of kind end it. Each group's `lines` are the
/// selected ones in diff order, whatever order `selected` was given in.
/// Groups without a selected line are not reported.
pub fn groups_of(hunk: &DiffHunk, selected: &[LineId]) -> (Vec<LineGroup>, HunkHeader) {
    let wanted: BTreeSet<LineId> = selected.iter().copied().collect();
    let mut groups = Vec::new();
    let mut current: Option<LineGroup> = None;

    for line in hunk.lines() {
        let kind = GroupKind::of(line.kind);

        if current.as_ref().map(|group| group.kind) != kind {
            if let Some(done) = current.take().filter(|group| !group.lines.is_empty()) {
                groups.push(done);
            }
            current = kind.map(|kind| LineGroup {
                kind,
                lines: Vec::new(),
            });
        }

        if let Some(group) = current.as_mut()
            && wanted.contains(&line.id)
        {
            group.lines.push(line.id);
        }
    }

    if let Some(done) = current.filter(|group| !group.lines.is_empty()) {
        groups.push(done);
    }

    (groups, hunk.overall_header())
}

/// Groups of the hunk text `diff` that intersect `line_ids`.
///
/// `diff` may start with its `@@` line, which supplies the start numbers.
///
/// ```
/// use hunk_select::diff::{HunkHeader, LineId};
/// use hunk_select::groups::extract_line_groups;
///
/// let (groups, header) = extract_line_groups(&[], "@@ -1,2 +1,1 @@\n a\n-b\n");
/// assert!(groups.is_empty());
/// assert_eq!(header, HunkHeader::new(1, 2, 1, 1));
/// ```
pub fn extract_line_groups(line_ids: &[LineId], diff: &str) -> (Vec<LineGroup>, HunkHeader) {
    groups_of(&DiffHunk::parse(diff), line_ids)
}

/// Every added and removed run of `diff`, as if all of its lines were selected.
pub fn extract_all_groups(diff: &str) -> (Vec<LineGroup>, HunkHeader) {
    let hunk = DiffHunk::parse(diff);
    let all = hunk.change_ids();
    groups_of(&hunk, &all)
}
