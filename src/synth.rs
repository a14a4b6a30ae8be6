//! Synthesis of hunk headers that describe only a selected part of a hunk.
//!
//! Every contiguous run of selected lines gets its own header. The run's
//! own side carries its start and length. The other side is either zeroed
//! (`commit`, a standalone patch against one image) or spans the whole
//! original hunk (`discard`, where the engine reverts by reapplying the
//! source hunk around the selection).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::diff::{DiffHunk, HunkHeader, LineId};
use crate::groups::{GroupKind, LineGroup, groups_of};

/// How headers for the side a selected run does not touch are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMode {
    /// Zero the untouched side.
    #[default]
    Commit,
    /// Span the untouched side with the original hunk bounds.
    Discard,
}

impl fmt::Display for HeaderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderMode::Commit => write!(f, "commit"),
            HeaderMode::Discard => write!(f, "discard"),
        }
    }
}

/// Headers describing exactly the selected `line_ids` of the hunk text `diff`.
///
/// Output follows diff position, never the order of `line_ids`. Ids that
/// name no added or removed line of the hunk are ignored, so an empty or
/// foreign selection yields no headers.
///
/// ```
/// use hunk_select::diff::{HunkHeader, LineId};
/// use hunk_select::synth::{HeaderMode, line_ids_to_hunk_headers};
///
/// let diff = "@@ -1,3 +1,2 @@\n  line 1\n- line 2\n  line 3\n";
/// let ids = [LineId::removed(2)];
/// assert_eq!(
///     line_ids_to_hunk_headers(&ids, diff, HeaderMode::Discard),
///     vec![HunkHeader::new(2, 1, 1, 2)]
/// );
/// assert_eq!(
///     line_ids_to_hunk_headers(&ids, diff, HeaderMode::Commit),
///     vec![HunkHeader::new(2, 1, 0, 0)]
/// );
/// ```
pub fn line_ids_to_hunk_headers(line_ids: &[LineId], diff: &str, mode: HeaderMode) -> Vec<HunkHeader> {
    hunk_headers(&DiffHunk::parse(diff), line_ids, mode)
}

/// Headers for every change line of the hunk text `diff`.
pub fn diff_to_hunk_headers(diff: &str, mode: HeaderMode) -> Vec<HunkHeader> {
    let hunk = DiffHunk::parse(diff);
    let all = hunk.change_ids();
    hunk_headers(&hunk, &all, mode)
}

/// Headers for the `selected` lines of an already parsed hunk.
pub fn hunk_headers(hunk: &DiffHunk, selected: &[LineId], mode: HeaderMode) -> Vec<HunkHeader> {
    let (groups, overall) = groups_of(hunk, selected);
    let headers = headers_for_groups(&groups, &overall, mode);
    log::trace!(
        "{} selected lines in {} gave {} {mode} headers",
        selected.len(),
        hunk.header,
        headers.len()
    );
    headers
}

/// Emit one header per run of consecutive line numbers inside each group.
pub fn headers_for_groups(groups: &[LineGroup], overall: &HunkHeader, mode: HeaderMode) -> Vec<HunkHeader> {
    let mut headers = Vec::new();

    for group in groups {
        let numbers: Vec<u32> = group
            .lines
            .iter()
            .filter_map(|line| match group.kind {
                GroupKind::Removed => line.old_line,
                GroupKind::Added => line.new_line,
            })
            .collect();

        for (start, len) in runs(&numbers) {
            let header = match (group.kind, mode) {
                (GroupKind::Removed, HeaderMode::Commit) => HunkHeader::new(start, len, 0, 0),
                (GroupKind::Removed, HeaderMode::Discard) => {
                    HunkHeader::new(start, len, overall.new_start, overall.new_lines)
                }
                (GroupKind::Added, HeaderMode::Commit) => HunkHeader::new(0, 0, start, len),
                (GroupKind::Added, HeaderMode::Discard) => {
                    HunkHeader::new(overall.old_start, overall.old_lines, start, len)
                }
            };
            headers.push(header);
        }
    }

    headers
}

/// Maximal runs of consecutive numbers as `(start, len)`, in input order.
fn runs(numbers: &[u32]) -> Vec<(u32, u32)> {
    let mut runs: Vec<(u32, u32)> = Vec::new();

    for &n in numbers {
        match runs.last_mut() {
            Some((start, len)) if start.checked_add(*len) == Some(n) => *len += 1,
            _ => runs.push((n, 1)),
        }
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    const BIG: &str = "@@ -1,10 +1,12 @@
 1
 2
 3
- 4
+ new 4
 5
- 6
- 7
+ new 6
+ new 7
+ an extra line
+ another extra line
 8
 9
 10
";

    const SINGLE: &str = "@@ -1,3 +1,2 @@
  line 1
- line 2
  line 3
";

    const AT_START: &str = "@@ -1,3 +1,4 @@
-old first
+new first
+another
 line 2
 line 3
";

    fn h(old_start: u32, old_lines: u32, new_start: u32, new_lines: u32) -> HunkHeader {
        HunkHeader::new(old_start, old_lines, new_start, new_lines)
    }

    #[test]
    fn single_line_selection() {
        let ids = [LineId::removed(2)];
        assert_eq!(
            line_ids_to_hunk_headers(&ids, SINGLE, HeaderMode::Discard),
            vec![h(2, 1, 1, 2)]
        );
        assert_eq!(
            line_ids_to_hunk_headers(&ids, SINGLE, HeaderMode::Commit),
            vec![h(2, 1, 0, 0)]
        );
    }

    #[test]
    fn empty_selection_gives_no_headers() {
        assert!(line_ids_to_hunk_headers(&[], BIG, HeaderMode::Discard).is_empty());
        assert!(line_ids_to_hunk_headers(&[], BIG, HeaderMode::Commit).is_empty());
    }

    #[test]
    fn complex_selection_discard() {
        let ids = [LineId::removed(4), LineId::added(6), LineId::added(7)];
        assert_eq!(
            line_ids_to_hunk_headers(&ids, BIG, HeaderMode::Discard),
            vec![h(4, 1, 1, 12), h(1, 10, 6, 2)]
        );
    }

    #[test]
    fn complex_selection_commit() {
        let ids = [LineId::removed(4), LineId::added(6), LineId::added(7)];
        assert_eq!(
            line_ids_to_hunk_headers(&ids, BIG, HeaderMode::Commit),
            vec![h(4, 1, 0, 0), h(0, 0, 6, 2)]
        );
    }

    #[test]
    fn disjoint_groups_follow_diff_order() {
        let ids = [
            LineId::added(7),
            LineId::removed(6),
            LineId::added(4),
            LineId::added(6),
            LineId::removed(4),
        ];
        assert_eq!(
            line_ids_to_hunk_headers(&ids, BIG, HeaderMode::Discard),
            vec![h(4, 1, 1, 12), h(1, 10, 4, 1), h(6, 1, 1, 12), h(1, 10, 6, 2)]
        );
        assert_eq!(
            line_ids_to_hunk_headers(&ids, BIG, HeaderMode::Commit),
            vec![h(4, 1, 0, 0), h(0, 0, 4, 1), h(6, 1, 0, 0), h(0, 0, 6, 2)]
        );
    }

    #[test]
    fn gap_inside_group_splits_header() {
        let ids = [LineId::added(6), LineId::added(8), LineId::added(9)];
        assert_eq!(
            line_ids_to_hunk_headers(&ids, BIG, HeaderMode::Commit),
            vec![h(0, 0, 6, 1), h(0, 0, 8, 2)]
        );
    }

    #[test]
    fn whole_hunk_discard() {
        assert_eq!(
            diff_to_hunk_headers(BIG, HeaderMode::Discard),
            vec![h(4, 1, 1, 12), h(1, 10, 4, 1), h(6, 2, 1, 12), h(1, 10, 6, 4)]
        );
    }

    #[test]
    fn whole_hunk_commit() {
        assert_eq!(
            diff_to_hunk_headers(BIG, HeaderMode::Commit),
            vec![h(4, 1, 0, 0), h(0, 0, 4, 1), h(6, 2, 0, 0), h(0, 0, 6, 4)]
        );
    }

    #[test]
    fn deleted_file() {
        let diff = "@@ -1,3 +0,0 @@\n-line 1\n-line 2\n-line 3\n";
        assert_eq!(diff_to_hunk_headers(diff, HeaderMode::Discard), vec![h(1, 3, 0, 0)]);
        assert_eq!(diff_to_hunk_headers(diff, HeaderMode::Commit), vec![h(1, 3, 0, 0)]);
    }

    #[test]
    fn new_file() {
        let diff = "@@ -0,0 +1,3 @@\n+line 1\n+line 2\n+line 3\n";
        assert_eq!(diff_to_hunk_headers(diff, HeaderMode::Discard), vec![h(0, 0, 1, 3)]);
        assert_eq!(diff_to_hunk_headers(diff, HeaderMode::Commit), vec![h(0, 0, 1, 3)]);
    }

    #[test]
    fn change_at_start_of_file() {
        assert_eq!(
            diff_to_hunk_headers(AT_START, HeaderMode::Discard),
            vec![h(1, 1, 1, 4), h(1, 3, 1, 2)]
        );
        assert_eq!(
            diff_to_hunk_headers(AT_START, HeaderMode::Commit),
            vec![h(1, 1, 0, 0), h(0, 0, 1, 2)]
        );
    }

    #[test]
    fn alternating_changes() {
        let diff = "@@ -1,4 +1,4 @@\n-a\n+A\n-b\n+B\n-c\n+C\n d\n";
        assert_eq!(
            diff_to_hunk_headers(diff, HeaderMode::Commit),
            vec![
                h(1, 1, 0, 0),
                h(0, 0, 1, 1),
                h(2, 1, 0, 0),
                h(0, 0, 2, 1),
                h(3, 1, 0, 0),
                h(0, 0, 3, 1),
            ]
        );
    }

    #[test]
    fn context_only_hunk() {
        assert!(diff_to_hunk_headers("@@ -1,2 +1,2 @@\n a\n b\n", HeaderMode::Discard).is_empty());
    }

    #[test]
    fn render_headers() {
        let rendered: Vec<String> = diff_to_hunk_headers(BIG, HeaderMode::Discard)
            .iter()
            .map(ToString::to_string)
            .collect();
        insta::assert_snapshot!(rendered.join("\n"), @r"
        @@ -4,1 +1,12 @@
        @@ -1,10 +4,1 @@
        @@ -6,2 +1,12 @@
        @@ -1,10 +6,4 @@
        ");
    }

    #[test]
    fn start_at_last_line_number() {
        let diff = "@@ -4294967295,2 +1,1 @@\n-a\n-b\n+c\n";
        let ids = [LineId::removed(u32::MAX), LineId::added(1)];
        assert_eq!(
            line_ids_to_hunk_headers(&ids, diff, HeaderMode::Commit),
            vec![h(u32::MAX, 1, 0, 0)]
        );
        assert_eq!(
            line_ids_to_hunk_headers(&ids, diff, HeaderMode::Discard),
            vec![h(u32::MAX, 1, 1, 0)]
        );
        assert_eq!(diff_to_hunk_headers(diff, HeaderMode::Commit), vec![h(u32::MAX, 1, 0, 0)]);
    }

    #[test]
    fn runs_split_on_gaps() {
        assert_eq!(runs(&[1, 2, 3, 5, 7, 8]), vec![(1, 3), (5, 1), (7, 2)]);
        assert!(runs(&[]).is_empty());
    }
}
