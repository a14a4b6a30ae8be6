use std::fmt;

use super::file::FileDiff;

/// A whole `git diff`: one [`FileDiff`] per changed file, in diff order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    pub files: Vec<FileDiff>,
}

impl Diff {
    /// Split `git diff` output at each `diff --git` line and parse the pieces.
    ///
    /// Text before the first file header is ignored, as are pieces with no
    /// recoverable path.
    pub fn parse(text: &str) -> Self {
        let mut chunks: Vec<String> = Vec::new();
        for line in text.lines() {
            if line.starts_with("diff --git ") {
                chunks.push(String::new());
            }
            if let Some(chunk) = chunks.last_mut() {
                chunk.push_str(line);
                chunk.push('\n');
            }
        }

        let files: Vec<FileDiff> = chunks.iter().filter_map(|chunk| FileDiff::parse(chunk)).collect();
        if files.len() < chunks.len() {
            log::debug!("dropped {} file section(s) without a path", chunks.len() - files.len());
        }
        log::debug!("parsed diff with {} file(s)", files.len());
        Diff { files }
    }

    /// The diff of the file at `path`, if it changed.
    pub fn file(&self, path: &str) -> Option<&FileDiff> {
        self.files.iter().find(|file_diff| file_diff.path == path)
    }
}

impl fmt::Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.files.iter().try_for_each(|file_diff| write!(f, "{file_diff}"))
    }
}
