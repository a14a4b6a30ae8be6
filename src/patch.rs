use serde::Serialize;

use crate::diff::{Diff, FileDiff, HunkHeader, order_headers};
use crate::selection::{FileSelection, HunkSelection, SelectedFile, Selection};
use crate::synth::{HeaderMode, hunk_headers};

/// Payload for the stage, commit or discard command: which file and which
/// parts of it.
///
/// Empty `hunk_headers` means the whole file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchSpec {
    pub previous_path_bytes: Option<Vec<u8>>,
    pub path_bytes: Vec<u8>,
    pub hunk_headers: Vec<HunkHeader>,
}

/// Build a patch spec for every file in `selection`, resolving hunks and
/// lines against `diff`.
///
/// A partially selected file missing from `diff` cannot be expressed and
/// is skipped.
pub fn patch_specs(selection: &Selection, diff: &Diff, mode: HeaderMode) -> Vec<PatchSpec> {
    selection
        .files
        .iter()
        .filter_map(|selected| {
            let file_diff = diff.file(&selected.path);
            let spec = patch_spec(selected, file_diff, mode);
            if spec.is_none() {
                log::warn!("no diff for partially selected {}, skipping", selected.path);
            }
            spec
        })
        .collect()
}

/// Patch spec for one selected file.
///
/// Full hunks are expanded with [`hunk_headers`] over every change line,
/// partial hunks over their selected lines, and the result is sorted by
/// position in the file.
pub fn patch_spec(selected: &SelectedFile, file_diff: Option<&FileDiff>, mode: HeaderMode) -> Option<PatchSpec> {
    let previous_path_bytes = file_diff.and_then(FileDiff::previous_path_bytes);
    let whole_file = PatchSpec {
        previous_path_bytes,
        path_bytes: selected.path_bytes.clone(),
        hunk_headers: Vec::new(),
    };

    let hunks = match &selected.selection {
        FileSelection::Full => return Some(whole_file),
        FileSelection::Partial(hunks) => hunks,
    };
    let file_diff = file_diff?;

    let covers_file = hunks.iter().all(|h| h.is_full())
        && file_diff.hunks.iter().all(|hunk| hunks.iter().any(|h| h.is_for(hunk)));
    if covers_file {
        return Some(whole_file);
    }

    let mut headers: Vec<HunkHeader> = file_diff
        .hunks
        .iter()
        .filter_map(|hunk| {
            let entry = hunks.iter().find(|h| h.is_for(hunk))?;
            Some(match &entry.selection {
                HunkSelection::Full => hunk_headers(hunk, &hunk.change_ids(), mode),
                HunkSelection::Partial(lines) => hunk_headers(hunk, lines, mode),
            })
        })
        .flatten()
        .collect();
    headers.sort_by(order_headers);

    Some(PatchSpec {
        hunk_headers: headers,
        ..whole_file
    })
}
