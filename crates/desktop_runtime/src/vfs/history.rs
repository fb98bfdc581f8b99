use super::entry::{EntryId, FileSystemEntry};

/// A reversible filesystem mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoableAction {
    /// `item` carries a deep snapshot so a pasted subtree can be recreated on redo.
    Create {
        item: FileSystemEntry,
        parent_path: String,
    },
    Rename {
        item_id: EntryId,
        old_name: String,
        new_name: String,
        path: String,
    },
    Move {
        item: FileSystemEntry,
        source_path: String,
        dest_path: String,
        source_index: usize,
    },
    /// `item` is a deep copy including every descendant listing.
    Delete {
        item: FileSystemEntry,
        parent_path: String,
        index: usize,
    },
}

impl UndoableAction {
    /// Short verb used in notices and menus ("Undo Rename").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Create { .. } => "Create",
            Self::Rename { .. } => "Rename",
            Self::Move { .. } => "Move",
            Self::Delete { .. } => "Delete",
        }
    }
}

/// Linear undo/redo history.
#[derive(Debug, Clone, Default)]
pub struct ActionHistory {
    undo: Vec<UndoableAction>,
    redo: Vec<UndoableAction>,
}

impl ActionHistory {
    /// Records a fresh mutation and invalidates the redo stack.
    pub fn record(&mut self, action: UndoableAction) {
        self.undo.push(action);
        self.redo.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn peek_undo(&self) -> Option<&UndoableAction> {
        self.undo.last()
    }

    pub fn peek_redo(&self) -> Option<&UndoableAction> {
        self.redo.last()
    }

    pub(super) fn pop_undo(&mut self) -> Option<UndoableAction> {
        self.undo.pop()
    }

    pub(super) fn pop_redo(&mut self) -> Option<UndoableAction> {
        self.redo.pop()
    }

    pub(super) fn push_undo(&mut self, action: UndoableAction) {
        self.undo.push(action);
    }

    pub(super) fn push_redo(&mut self, action: UndoableAction) {
        self.redo.push(action);
    }
}
