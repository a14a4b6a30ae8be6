use serde::{Deserialize, Serialize};
use std::fmt;

use super::header::HunkHeader;

/// Identity of a single line inside a hunk.
///
/// Removed lines carry only `old_line`, added lines only `new_line`, and
/// context lines both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineId {
    pub old_line: Option<u32>,
    pub new_line: Option<u32>,
}

impl LineId {
    /// A line removed from the old side.
    pub const fn removed(old_line: u32) -> Self {
        Self {
            old_line: Some(old_line),
            new_line: None,
        }
    }

    /// A line added on the new side.
    pub const fn added(new_line: u32) -> Self {
        Self {
            old_line: None,
            new_line: Some(new_line),
        }
    }

    /// A context line present on both sides.
    pub const fn context(old_line: u32, new_line: u32) -> Self {
        Self {
            old_line: Some(old_line),
            new_line: Some(new_line),
        }
    }

    /// Composite key used by the set-join helpers.
    pub fn key(&self) -> (Option<u32>, Option<u32>) {
        (self.old_line, self.new_line)
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.old_line, self.new_line) {
            (Some(old), None) => write!(f, "-{old}"),
            (None, Some(new)) => write!(f, "+{new}"),
            (Some(old), Some(new)) => write!(f, "{old}:{new}"),
            (None, None) => write!(f, "?"),
        }
    }
}

/// Classification of one physical diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Context,
    Added,
    Removed,
}

impl LineKind {
    fn of(line: &str) -> Self {
        match line.as_bytes().first() {
            Some(b'+') => LineKind::Added,
            Some(b'-') => LineKind::Removed,
            _ => LineKind::Context,
        }
    }

    /// Added and removed lines are the selectable ones.
    pub fn is_change(self) -> bool {
        self != LineKind::Context
    }
}

/// A classified line of a hunk body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub kind: LineKind,
    pub id: LineId,
    pub content: String,
}

/// Run of consecutive lines sharing one classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSection {
    pub kind: LineKind,
    pub lines: Vec<DiffLine>,
}

/// A hunk: its header plus the body lines, without the `@@` line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffHunk {
    #[serde(flatten)]
    pub header: HunkHeader,
    #[serde(default)]
    pub diff: String,
}

impl DiffHunk {
    pub fn new(header: HunkHeader, diff: impl Into<String>) -> Self {
        Self {
            header,
            diff: diff.into(),
        }
    }

    /// Split hunk text into header and body.
    ///
    /// The `@@` line is optional; without it the header is all zeros.
    pub fn parse(text: &str) -> Self {
        match text.split_once('\n') {
            Some((first, body)) if first.starts_with("@@") => {
                Self::new(HunkHeader::parse(Some(first)), body)
            }
            None if text.starts_with("@@") => Self::new(HunkHeader::parse(Some(text)), ""),
            _ => Self::new(HunkHeader::default(), text),
        }
    }

    /// Classify every body line, numbering from the header's starts.
    pub fn lines(&self) -> Vec<DiffLine> {
        classify(&self.header, &self.diff)
    }

    /// Ids of every added or removed line, in diff order.
    pub fn change_ids(&self) -> Vec<LineId> {
        self.lines()
            .into_iter()
            .filter(|line| line.kind.is_change())
            .map(|line| line.id)
            .collect()
    }

    /// The header's starts with lengths counted from the body.
    ///
    /// Stays correct when the `@@` line was stripped or lies about its
    /// lengths.
    pub fn overall_header(&self) -> HunkHeader {
        let mut header = HunkHeader {
            old_lines: 0,
            new_lines: 0,
            ..self.header
        };
        for line in self.lines() {
            match line.kind {
                LineKind::Removed => header.old_lines += 1,
                LineKind::Added => header.new_lines += 1,
                LineKind::Context => {
                    header.old_lines += 1;
                    header.new_lines += 1;
                }
            }
        }
        header
    }
}

/// Walk a hunk body and number each line.
///
/// `\ No newline at end of file` markers are skipped and consume no line
/// numbers. Numbering stops at the first line whose number would pass
/// `u32::MAX`; the lines before it are kept.
pub fn classify(header: &HunkHeader, body: &str) -> Vec<DiffLine> {
    let mut old = Some(header.old_start);
    let mut new = Some(header.new_start);
    let mut lines = Vec::new();

    for line in body.lines().filter(|line| !line.starts_with('\\')) {
        let kind = LineKind::of(line);
        let id = match kind {
            LineKind::Removed => old.map(LineId::removed),
            LineKind::Added => new.map(LineId::added),
            LineKind::Context => old.zip(new).map(|(old, new)| LineId::context(old, new)),
        };
        let Some(id) = id else {
            log::debug!("line numbers of {header} overflow, dropping the rest of the hunk");
            break;
        };

        if kind != LineKind::Added {
            old = old.and_then(|n| n.checked_add(1));
        }
        if kind != LineKind::Removed {
            new = new.and_then(|n| n.checked_add(1));
        }

        let content = match kind {
            LineKind::Context => line.strip_prefix(' ').unwrap_or(line),
            LineKind::Added | LineKind::Removed => &line[1..],
        };
        lines.push(DiffLine {
            kind,
            id,
            content: content.to_string(),
        });
    }

    lines
}

/// Group classified lines into sections, starting a new one on every change
/// of classification.
pub fn sections(lines: Vec<DiffLine>) -> Vec<ContentSection> {
    let mut sections: Vec<ContentSection> = Vec::new();

    for line in lines {
        match sections.last_mut() {
            Some(section) if section.kind == line.kind => section.lines.push(line),
            _ => sections.push(ContentSection {
                kind: line.kind,
                lines: vec![line],
            }),
        }
    }

    sections
}
