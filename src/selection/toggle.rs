use crate::diff::{DiffHunk, LineId};
use crate::join::left_join_by;

/// A click on one displayed row of a hunk, or a shift-click range.
///
/// `index` is the row clicked and `start_index` the anchor of a range
/// selection. Rows are the hunk's displayed lines, context included, unless
/// the caller passes its own `rows`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineToggle {
    pub index: usize,
    pub start_index: Option<usize>,
    pub old_line: Option<u32>,
    pub new_line: Option<u32>,
    pub rows: Option<Vec<LineId>>,
}

impl LineToggle {
    /// Toggle of a single line.
    pub fn line(index: usize, line: LineId) -> Self {
        Self {
            index,
            start_index: None,
            old_line: line.old_line,
            new_line: line.new_line,
            rows: None,
        }
    }

    /// Toggle of every row between `start_index` and `index`, inclusive.
    pub fn range(start_index: usize, index: usize) -> Self {
        Self {
            index,
            start_index: Some(start_index),
            ..Self::default()
        }
    }

    /// Toggle of the given lines, in whatever order.
    pub fn lines(lines: Vec<LineId>) -> Self {
        let last = lines.len().saturating_sub(1);
        Self {
            index: last,
            start_index: Some(0),
            rows: Some(lines),
            ..Self::default()
        }
    }

    fn clicked(&self) -> Option<LineId> {
        (self.old_line.is_some() || self.new_line.is_some()).then_some(LineId {
            old_line: self.old_line,
            new_line: self.new_line,
        })
    }
}

/// Split the change lines of `hunk` into the ones `toggle` covers and the rest.
///
/// Both lists are in diff order. Context rows and lines that do not belong
/// to the hunk are dropped, so a toggle on nothing selectable yields an
/// empty first list.
pub fn extract_line_ids(hunk: &DiffHunk, toggle: &LineToggle) -> (Vec<LineId>, Vec<LineId>) {
    let displayed: Vec<LineId> = hunk.lines().iter().map(|line| line.id).collect();
    let rows = toggle.rows.as_deref().unwrap_or(&displayed);

    let picked: Vec<LineId> = match toggle.start_index {
        Some(start) => {
            let low = start.min(toggle.index);
            let high = start.max(toggle.index);
            rows.iter().skip(low).take((high - low).saturating_add(1)).copied().collect()
        }
        None => toggle
            .clicked()
            .or_else(|| rows.get(toggle.index).copied())
            .into_iter()
            .collect(),
    };

    let change_ids = hunk.change_ids();
    let selected: Vec<LineId> = change_ids
        .iter()
        .filter(|id| picked.contains(id))
        .copied()
        .collect();
    let rest = left_join_by(&change_ids, &selected, LineId::key);

    (selected, rest)
}
