use crate::locks::HunkLocks;

use super::transition::{SelectionEvent, transition};
use super::Selection;

/// Sole owner of a selection tree.
///
/// Events are applied one at a time in the order they arrive. When a
/// current stack is set, events on files locked to another stack are
/// rejected and leave the tree untouched.
#[derive(Debug, Clone, Default)]
pub struct SelectionMachine {
    selection: Selection,
    locks: HunkLocks,
    stack_id: Option<String>,
}

impl SelectionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// A machine that only accepts files selectable for `stack_id`.
    pub fn for_stack(locks: HunkLocks, stack_id: impl Into<String>) -> Self {
        Self {
            selection: Selection::default(),
            locks,
            stack_id: Some(stack_id.into()),
        }
    }

    /// Read-only view of the current tree.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Owned copy of the current tree, for handing to another component.
    pub fn snapshot(&self) -> Selection {
        self.selection.clone()
    }

    pub fn into_selection(self) -> Selection {
        self.selection
    }

    pub fn stack_id(&self) -> Option<&str> {
        self.stack_id.as_deref()
    }

    /// True unless `path` is locked to a stack other than the current one.
    pub fn accepts(&self, path: &str) -> bool {
        match &self.stack_id {
            Some(stack_id) => self.locks.is_file_selectable(path, stack_id),
            None => true,
        }
    }

    /// Apply `event`. Returns whether the tree changed.
    pub fn apply(&mut self, event: &SelectionEvent<'_>) -> bool {
        if let Some(file) = event.file()
            && !self.accepts(&file.path)
        {
            log::warn!("{} is locked to another stack, ignoring toggle", file.path);
            return false;
        }

        let next = transition(&self.selection, event);
        let changed = next != self.selection;
        if changed {
            log::debug!("selection now covers {} file(s)", next.files.len());
        }
        self.selection = next;
        changed
    }
}
