use crate::diff::{DiffHunk, FileDiff, LineId};
use crate::join::outer_join_by;

use super::toggle::{LineToggle, extract_line_ids};
use super::{FileSelection, HunkSelection, SelectedFile, SelectedHunk, Selection};

/// A user action on the selection tree.
///
/// Events carry the file's current diff so transitions can resolve hunks
/// and lines against it.
#[derive(Debug, Clone)]
pub enum SelectionEvent<'a> {
    /// Toggle lines of the `hunk`-th hunk of `file`.
    ToggleLines {
        file: &'a FileDiff,
        hunk: usize,
        toggle: LineToggle,
    },
    /// Toggle the `hunk`-th hunk of `file` as a whole.
    ToggleHunk { file: &'a FileDiff, hunk: usize },
    ToggleFile { file: &'a FileDiff },
    Clear,
}

impl SelectionEvent<'_> {
    /// The file the event acts on, if any.
    pub fn file(&self) -> Option<&FileDiff> {
        match self {
            SelectionEvent::ToggleLines { file, .. }
            | SelectionEvent::ToggleHunk { file, .. }
            | SelectionEvent::ToggleFile { file } => Some(*file),
            SelectionEvent::Clear => None,
        }
    }
}

/// Apply `event` to `selection`, returning the new tree.
///
/// The result is always normalized: a hunk whose lines cover all of its
/// change lines is full, a file whose full hunks cover all of its hunks is
/// full, and empty hunks or files are dropped. Events that reference a hunk
/// or line the file does not have leave the tree as it was.
pub fn transition(selection: &Selection, event: &SelectionEvent<'_>) -> Selection {
    let mut next = selection.clone();

    match event {
        SelectionEvent::ToggleLines { file, hunk, toggle } => toggle_lines(&mut next, file, *hunk, toggle),
        SelectionEvent::ToggleHunk { file, hunk } => toggle_hunk(&mut next, file, *hunk),
        SelectionEvent::ToggleFile { file } => toggle_file(&mut next, file),
        SelectionEvent::Clear => next.files.clear(),
    }

    next
}

fn toggle_lines(selection: &mut Selection, file: &FileDiff, index: usize, toggle: &LineToggle) {
    let Some(hunk) = file.hunks.get(index) else {
        log::debug!("{}: no hunk #{index}, ignoring line toggle", file.path);
        return;
    };

    let (selected, rest) = extract_line_ids(hunk, toggle);
    if selected.is_empty() {
        log::debug!("{}: toggle in {} selects no change line", file.path, hunk.header);
        return;
    }
    let count = selected.len();

    let hunks = match selection.file(&file.path).map(|f| &f.selection) {
        None => vec![SelectedHunk::partial(hunk, selected)],
        Some(FileSelection::Full) => file
            .hunks
            .iter()
            .map(|h| {
                if h == hunk {
                    SelectedHunk::partial(h, rest.clone())
                } else {
                    SelectedHunk::full(h)
                }
            })
            .collect(),
        Some(FileSelection::Partial(existing)) => {
            let mut hunks = existing.clone();
            match hunks.iter().position(|h| h.is_for(hunk)) {
                None => hunks.push(SelectedHunk::partial(hunk, selected)),
                Some(at) => {
                    let lines = match &hunks[at].selection {
                        HunkSelection::Full => rest,
                        HunkSelection::Partial(lines) => outer_join_by(lines, &selected, LineId::key),
                    };
                    hunks[at] = SelectedHunk::partial(hunk, lines);
                }
            }
            hunks
        }
    };

    log::trace!("{}: toggled {} line(s) in {}", file.path, count, hunk.header);
    store(selection, file, FileSelection::Partial(hunks));
}

fn toggle_hunk(selection: &mut Selection, file: &FileDiff, index: usize) {
    let Some(hunk) = file.hunks.get(index) else {
        log::debug!("{}: no hunk #{index}, ignoring hunk toggle", file.path);
        return;
    };

    let hunks = match selection.file(&file.path).map(|f| &f.selection) {
        None => vec![SelectedHunk::full(hunk)],
        Some(FileSelection::Full) => file
            .hunks
            .iter()
            .filter(|h| *h != hunk)
            .map(SelectedHunk::full)
            .collect(),
        Some(FileSelection::Partial(existing)) => {
            let mut hunks = existing.clone();
            match hunks.iter().position(|h| h.is_for(hunk)) {
                None => hunks.push(SelectedHunk::full(hunk)),
                Some(at) if hunks[at].is_full() => {
                    hunks.remove(at);
                }
                Some(at) => hunks[at] = SelectedHunk::full(hunk),
            }
            hunks
        }
    };

    store(selection, file, FileSelection::Partial(hunks));
}

fn toggle_file(selection: &mut Selection, file: &FileDiff) {
    let state = match selection.file(&file.path).map(|f| &f.selection) {
        Some(FileSelection::Full) => FileSelection::Partial(Vec::new()),
        None | Some(FileSelection::Partial(_)) => FileSelection::Full,
    };
    store(selection, file, state);
}

/// Replace the entry for `file` with its normalized form, keeping files
/// ordered by path.
fn store(selection: &mut Selection, file: &FileDiff, state: FileSelection) {
    let position = selection
        .files
        .binary_search_by(|f| f.path.as_str().cmp(file.path.as_str()));

    match (position, normalize(file, state)) {
        (Ok(at), Some(entry)) => selection.files[at] = entry,
        (Ok(at), None) => {
            selection.files.remove(at);
        }
        (Err(at), Some(entry)) => selection.files.insert(at, entry),
        (Err(_), None) => {}
    }
}

/// Canonical form of a file's selection, or `None` when nothing is left.
fn normalize(file: &FileDiff, state: FileSelection) -> Option<SelectedFile> {
    let selected = match state {
        FileSelection::Full => return Some(SelectedFile::full(file)),
        FileSelection::Partial(selected) => selected,
    };

    let hunks: Vec<SelectedHunk> = file
        .hunks
        .iter()
        .filter_map(|hunk| {
            let entry = selected.iter().find(|h| h.is_for(hunk))?;
            normalize_hunk(hunk, &entry.selection)
        })
        .collect();

    if hunks.is_empty() {
        return None;
    }
    if hunks.len() == file.hunks.len() && hunks.iter().all(SelectedHunk::is_full) {
        return Some(SelectedFile::full(file));
    }
    Some(SelectedFile::partial(file, hunks))
}

fn normalize_hunk(hunk: &DiffHunk, selection: &HunkSelection) -> Option<SelectedHunk> {
    let lines = match selection {
        HunkSelection::Full => return Some(SelectedHunk::full(hunk)),
        HunkSelection::Partial(lines) => lines,
    };

    let change_ids = hunk.change_ids();
    let kept: Vec<LineId> = change_ids
        .iter()
        .filter(|id| lines.contains(id))
        .copied()
        .collect();

    if kept.is_empty() {
        None
    } else if kept.len() == change_ids.len() {
        Some(SelectedHunk::full(hunk))
    } else {
        Some(SelectedHunk::partial(hunk, kept))
    }
}
