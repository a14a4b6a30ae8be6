use error_set::error_set;

pub mod diff;
pub mod groups;
pub mod join;
pub mod locks;
pub mod parse;
pub mod patch;
pub mod selection;
pub mod synth;

pub use diff::{Diff, DiffHunk, FileDiff, HunkHeader, LineId, format_diff};
pub use groups::{LineGroup, extract_all_groups, extract_line_groups};
pub use locks::{HunkDependency, HunkLock, HunkLocks, get_line_locks};
pub use parse::ParseError;
pub use patch::{PatchSpec, patch_specs};
pub use selection::{Selection, SelectionEvent, SelectionMachine};
pub use synth::{HeaderMode, diff_to_hunk_headers, line_ids_to_hunk_headers};

use selection::LineToggle;

error_set! {
    /// Top-level error for hunk-select operations
    HunkSelectError := {
        #[display("No changed lines in {file} match the given references")]
        NoMatchingLines { file: String },
        #[display("{file} is not part of the diff")]
        UnknownFile { file: String },
        #[display("{file} is locked to a stack other than {stack_id}")]
        LockedFile { file: String, stack_id: String },
        ParseError(ParseError),
    } || InputError

    /// Errors reading or writing data at the edges of the library
    InputError := {
        #[display("Failed to read {path}: {message}")]
        ReadFailed { path: String, message: String },
        #[display("Invalid lock data: {message}")]
        InvalidLocks { message: String },
        #[display("Failed to encode output: {message}")]
        EncodeFailed { message: String },
    }
}

/// Parse hunk dependency data: a JSON array of `{path, hunk, locks}`
/// entries.
pub fn read_locks(json: &str) -> Result<HunkLocks, InputError> {
    serde_json::from_str(json).map_err(|e| InputError::InvalidLocks {
        message: e.to_string(),
    })
}

/// Main interface: a parsed diff and the selection being built over it.
pub struct HunkSelect {
    diff: Diff,
    machine: SelectionMachine,
}

impl HunkSelect {
    /// Start an empty selection over the unified diff `text`.
    pub fn new(text: &str) -> Self {
        Self {
            diff: Diff::parse(text),
            machine: SelectionMachine::new(),
        }
    }

    /// Like [`HunkSelect::new`], but only files selectable for `stack_id`
    /// may be toggled.
    pub fn for_stack(text: &str, locks: HunkLocks, stack_id: impl Into<String>) -> Self {
        Self {
            diff: Diff::parse(text),
            machine: SelectionMachine::for_stack(locks, stack_id),
        }
    }

    pub fn diff(&self) -> &Diff {
        &self.diff
    }

    pub fn selection(&self) -> &Selection {
        self.machine.selection()
    }

    /// Toggle the lines named by a `FILE:REFS` reference.
    ///
    /// References are toggles: naming an already selected line deselects it.
    ///
    /// # Examples
    /// ```
    /// # use hunk_select::{HeaderMode, HunkSelect};
    /// let mut select = HunkSelect::new(
    ///     "diff --git a/a.txt b/a.txt\n--- a/a.txt\n+++ b/a.txt\n@@ -1,2 +1,2 @@\n-a\n+A\n b\n",
    /// );
    /// select.toggle_refs("a.txt:1").unwrap();
    /// let specs = select.patch_specs(HeaderMode::Commit);
    /// assert_eq!(specs[0].hunk_headers[0].to_string(), "@@ -0,0 +1,1 @@");
    /// ```
    pub fn toggle_refs(&mut self, file_ref: &str) -> Result<(), HunkSelectError> {
        let refs = parse::parse_file_refs(file_ref)?;
        let file = lookup(&self.diff, &self.machine, &refs.file)?;

        let mut matched = false;
        for (index, hunk) in file.hunks.iter().enumerate() {
            let lines = refs.select(&hunk.change_ids());
            if lines.is_empty() {
                continue;
            }
            matched = true;
            self.machine.apply(&SelectionEvent::ToggleLines {
                file,
                hunk: index,
                toggle: LineToggle::lines(lines),
            });
        }

        if !matched {
            return Err(HunkSelectError::NoMatchingLines { file: refs.file });
        }
        Ok(())
    }

    /// Toggle a whole file.
    pub fn toggle_file(&mut self, path: &str) -> Result<(), HunkSelectError> {
        let file = lookup(&self.diff, &self.machine, path)?;
        self.machine.apply(&SelectionEvent::ToggleFile { file });
        Ok(())
    }

    /// Patch specs for the current selection.
    pub fn patch_specs(&self, mode: HeaderMode) -> Vec<PatchSpec> {
        patch::patch_specs(self.machine.selection(), &self.diff, mode)
    }
}

/// Look up a file of `diff` that `machine` will accept toggles for.
fn lookup<'a>(diff: &'a Diff, machine: &SelectionMachine, path: &str) -> Result<&'a FileDiff, HunkSelectError> {
    let file = diff.file(path).ok_or_else(|| HunkSelectError::UnknownFile {
        file: path.to_string(),
    })?;

    if !machine.accepts(path) {
        return Err(HunkSelectError::LockedFile {
            file: path.to_string(),
            stack_id: machine.stack_id().unwrap_or_default().to_string(),
        });
    }
    Ok(file)
}
