//! Selection tree: which files, hunks and lines are picked for the next
//! stage, commit or discard.
//!
//! A file is either fully or partially selected; a partial file lists its
//! selected hunks, each either full or partial with explicit lines. Absent
//! files are unselected. Only [`transition`] builds new trees; everything
//! else reads them.

pub mod machine;
pub mod toggle;
pub mod transition;

use serde::Serialize;

use crate::diff::{DiffHunk, FileDiff, HunkHeader, LineId};

pub use machine::SelectionMachine;
pub use toggle::{LineToggle, extract_line_ids};
pub use transition::{SelectionEvent, transition};

/// Selection state of one hunk inside a partially selected file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "lines", rename_all = "lowercase")]
pub enum HunkSelection {
    Full,
    /// A non-empty strict subset of the hunk's change lines, in diff order.
    Partial(Vec<LineId>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedHunk {
    #[serde(flatten)]
    pub header: HunkHeader,
    #[serde(flatten)]
    pub selection: HunkSelection,
}

impl SelectedHunk {
    pub fn full(hunk: &DiffHunk) -> Self {
        Self {
            header: hunk.header,
            selection: HunkSelection::Full,
        }
    }

    pub fn partial(hunk: &DiffHunk, lines: Vec<LineId>) -> Self {
        Self {
            header: hunk.header,
            selection: HunkSelection::Partial(lines),
        }
    }

    /// Hunks are identified by where they start on both sides.
    pub fn is_for(&self, hunk: &DiffHunk) -> bool {
        self.header.old_start == hunk.header.old_start && self.header.new_start == hunk.header.new_start
    }

    pub fn is_full(&self) -> bool {
        self.selection == HunkSelection::Full
    }
}

/// Selection state of a file present in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "hunks", rename_all = "lowercase")]
pub enum FileSelection {
    Full,
    /// Selected hunks in file order. Never empty.
    Partial(Vec<SelectedHunk>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedFile {
    pub path: String,
    pub path_bytes: Vec<u8>,
    #[serde(flatten)]
    pub selection: FileSelection,
}

impl SelectedFile {
    pub fn full(file: &FileDiff) -> Self {
        Self {
            path: file.path.clone(),
            path_bytes: file.path_bytes(),
            selection: FileSelection::Full,
        }
    }

    pub fn partial(file: &FileDiff, hunks: Vec<SelectedHunk>) -> Self {
        Self {
            path: file.path.clone(),
            path_bytes: file.path_bytes(),
            selection: FileSelection::Partial(hunks),
        }
    }

    /// The entry for `hunk`, if it is listed.
    pub fn hunk(&self, hunk: &DiffHunk) -> Option<&SelectedHunk> {
        match &self.selection {
            FileSelection::Full => None,
            FileSelection::Partial(hunks) => hunks.iter().find(|h| h.is_for(hunk)),
        }
    }
}

/// Tri-state checkbox value shown for a file or hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Checked,
    Indeterminate,
    Unchecked,
}

/// Every selected file, ordered by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Selection {
    pub files: Vec<SelectedFile>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn file(&self, path: &str) -> Option<&SelectedFile> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn file_status(&self, path: &str) -> CheckStatus {
        match self.file(path).map(|f| &f.selection) {
            Some(FileSelection::Full) => CheckStatus::Checked,
            Some(FileSelection::Partial(_)) => CheckStatus::Indeterminate,
            None => CheckStatus::Unchecked,
        }
    }

    pub fn hunk_status(&self, path: &str, hunk: &DiffHunk) -> CheckStatus {
        let Some(file) = self.file(path) else {
            return CheckStatus::Unchecked;
        };
        if file.selection == FileSelection::Full {
            return CheckStatus::Checked;
        }
        match file.hunk(hunk).map(|h| &h.selection) {
            Some(HunkSelection::Full) => CheckStatus::Checked,
            Some(HunkSelection::Partial(_)) => CheckStatus::Indeterminate,
            None => CheckStatus::Unchecked,
        }
    }

    pub fn is_line_selected(&self, path: &str, hunk: &DiffHunk, line: &LineId) -> bool {
        let Some(file) = self.file(path) else {
            return false;
        };
        if file.selection == FileSelection::Full {
            return hunk.change_ids().contains(line);
        }
        match file.hunk(hunk).map(|h| &h.selection) {
            Some(HunkSelection::Full) => hunk.change_ids().contains(line),
            Some(HunkSelection::Partial(lines)) => lines.contains(line),
            None => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::diff::Diff;
    use similar_asserts::assert_eq;

    fn sample() -> FileDiff {
        Diff::parse(
            "diff --git a/a.txt b/a.txt\n--- a/a.txt\n+++ b/a.txt\n\
             @@ -1,2 +1,2 @@\n-a\n+A\n b\n\
             @@ -10,1 +10,2 @@\n x\n+y\n",
        )
        .files
        .remove(0)
    }

    #[test]
    fn statuses_of_partial_file() {
        let file = sample();
        let selection = Selection {
            files: vec![SelectedFile::partial(
                &file,
                vec![SelectedHunk::partial(&file.hunks[0], vec![LineId::added(1)])],
            )],
        };

        assert_eq!(selection.file_status("a.txt"), CheckStatus::Indeterminate);
        assert_eq!(selection.file_status("b.txt"), CheckStatus::Unchecked);
        assert_eq!(selection.hunk_status("a.txt", &file.hunks[0]), CheckStatus::Indeterminate);
        assert_eq!(selection.hunk_status("a.txt", &file.hunks[1]), CheckStatus::Unchecked);
        assert!(selection.is_line_selected("a.txt", &file.hunks[0], &LineId::added(1)));
        assert!(!selection.is_line_selected("a.txt", &file.hunks[0], &LineId::removed(1)));
    }

    #[test]
    fn statuses_of_full_file() {
        let file = sample();
        let selection = Selection {
            files: vec![SelectedFile::full(&file)],
        };

        assert_eq!(selection.file_status("a.txt"), CheckStatus::Checked);
        assert_eq!(selection.hunk_status("a.txt", &file.hunks[1]), CheckStatus::Checked);
        assert!(selection.is_line_selected("a.txt", &file.hunks[1], &LineId::added(11)));
        assert!(!selection.is_line_selected("a.txt", &file.hunks[1], &LineId::context(10, 10)));
    }

    #[test]
    fn snapshot_json() {
        let file = sample();
        let selection = Selection {
            files: vec![SelectedFile::partial(
                &file,
                vec![
                    SelectedHunk::full(&file.hunks[0]),
                    SelectedHunk::partial(&file.hunks[1], vec![LineId::added(11)]),
                ],
            )],
        };
        assert_eq!(
            serde_json::to_value(&selection).unwrap(),
            serde_json::json!([{
                "path": "a.txt",
                "pathBytes": [97, 46, 116, 120, 116],
                "type": "partial",
                "hunks": [
                    {"oldStart": 1, "oldLines": 2, "newStart": 1, "newLines": 2, "type": "full"},
                    {
                        "oldStart": 10, "oldLines": 1, "newStart": 10, "newLines": 2,
                        "type": "partial",
                        "lines": [{"oldLine": null, "newLine": 11}]
                    }
                ]
            }])
        );
    }
}
