use super::hunk::{DiffHunk, LineId};
use std::fmt;

/// The changes to one file: its path and hunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// File path (extracted from `+++ b/path`, or `--- a/path` for deletions)
    pub path: String,
    /// Path before a rename, from the `rename from` header line
    pub previous_path: Option<String>,
    pub hunks: Vec<DiffHunk>,
}

impl FileDiff {
    pub fn new(path: impl Into<String>, hunks: Vec<DiffHunk>) -> Self {
        Self {
            path: path.into(),
            previous_path: None,
            hunks,
        }
    }

    /// Parse the section of `git diff` output for one file.
    ///
    /// The path comes from `+++ b/path`, or from `--- a/path` when the new
    /// side is `/dev/null`. Sections without either line (pure renames,
    /// mode changes, binary files) fall back to `rename to path` and then
    /// to the `b/` half of the `diff --git` line. Every `@@` line starts a
    /// new hunk. Returns `None` when no path can be found.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let path = header_path(text, "+++ b/")
            .or_else(|| header_path(text, "--- a/"))
            .or_else(|| header_path(text, "rename to "))
            .or_else(|| git_header_path(text))?
            .to_string();
        let previous_path = header_path(text, "rename from ").map(str::to_string);

        let mut hunks = Vec::new();
        let mut current: Option<String> = None;
        for line in text.lines() {
            if line.starts_with("@@ ")
                && let Some(done) = current.replace(String::new())
            {
                hunks.push(DiffHunk::parse(&done));
            }
            if let Some(hunk_text) = current.as_mut() {
                hunk_text.push_str(line);
                hunk_text.push('\n');
            }
        }
        hunks.extend(current.as_deref().map(DiffHunk::parse));

        Some(FileDiff {
            path,
            previous_path,
            hunks,
        })
    }

    /// Raw bytes of the path, as handed to the apply engine.
    pub fn path_bytes(&self) -> Vec<u8> {
        self.path.as_bytes().to_vec()
    }

    pub fn previous_path_bytes(&self) -> Option<Vec<u8>> {
        self.previous_path.as_ref().map(|p| p.as_bytes().to_vec())
    }

    /// Index of the hunk whose added or removed lines include `line`.
    pub fn hunk_of_line(&self, line: &LineId) -> Option<usize> {
        self.hunks
            .iter()
            .position(|hunk| hunk.change_ids().contains(line))
    }
}

/// Rest of the first line starting with `prefix`, when not empty.
fn header_path<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    text.lines()
        .find_map(|line| line.strip_prefix(prefix))
        .filter(|rest| !rest.is_empty())
}

/// New-side path of the `diff --git a/X b/Y` line.
fn git_header_path(text: &str) -> Option<&str> {
    text.lines()
        .find_map(|line| line.strip_prefix("diff --git "))
        .and_then(|paths| paths.rsplit_once(" b/"))
        .map(|(_, path)| path)
        .filter(|path| !path.is_empty())
}

impl fmt::Display for FileDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let old_path = self.previous_path.as_deref().unwrap_or(&self.path);
        writeln!(f, "diff --git a/{} b/{}", old_path, self.path)?;
        if let Some(previous) = &self.previous_path {
            writeln!(f, "rename from {}", previous)?;
            writeln!(f, "rename to {}", self.path)?;
        }
        writeln!(f, "--- a/{}", old_path)?;
        writeln!(f, "+++ b/{}", self.path)?;

        for hunk in &self.hunks {
            writeln!(f, "{}", hunk.header)?;
            write!(f, "{}", hunk.diff)?;
            if !hunk.diff.is_empty() && !hunk.diff.ends_with('\n') {
                writeln!(f)?;
            }
        }

        Ok(())
    }
}
