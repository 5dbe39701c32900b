//! Editor state: the document buffer, caret and selection, and the coalescing
//! undo history, bundled per open document as an `EditorSession`.
//!
//! The session is passed explicitly (`&mut EditorSession`) into every
//! controller operation; nothing here is shared or global. Switching documents
//! means replacing the session content through `replace_document`, which
//! discards the pending history step without committing it.

use std::path::PathBuf;

use core_text::{LineBuffer, SelectionIndex, SelectionRange};
use tracing::trace;

pub mod clock;
pub mod history;
pub mod syntax;

pub use clock::{Clock, ManualClock, SystemClock};
pub use history::{History, HistoryConfig, MergeResult, Operation, ReplaceFrame, Restore, Step};
pub use syntax::{
    SyntaxCheckError, SyntaxCheckSchedule, SyntaxChecker, SyntaxReport, SyntaxRequest,
};

/// Caret plus optional selection anchor.
///
/// The selection is whatever lies between `highlight` and the caret; it is
/// derived on demand and never stored as a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorState {
    pub line: usize,
    pub index: usize,
    pub highlight: Option<SelectionIndex>,
}

impl CursorState {
    pub fn position(&self) -> SelectionIndex {
        SelectionIndex::new(self.line, self.index)
    }

    pub fn set_position(&mut self, position: SelectionIndex) {
        self.line = position.line;
        self.index = position.index;
    }

    /// Ordered selection, or `None` when there is no anchor or it sits on the caret.
    pub fn selection_range(&self) -> Option<SelectionRange> {
        let highlight = self.highlight?;
        let range = SelectionRange::between(highlight, self.position());
        (!range.is_empty()).then_some(range)
    }

    pub fn has_selection(&self) -> bool {
        self.selection_range().is_some()
    }

    /// Pin the anchor at the caret unless a selection is already in progress.
    pub fn anchor(&mut self) {
        if self.highlight.is_none() {
            self.highlight = Some(self.position());
        }
    }

    pub fn clear_selection(&mut self) {
        self.highlight = None;
    }
}

/// One open document: buffer, history, caret and bookkeeping.
#[derive(Debug)]
pub struct EditorSession {
    pub buffer: LineBuffer,
    pub history: History,
    pub cursor: CursorState,
    pub path: Option<PathBuf>,
    revision: u64,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(LineBuffer::new(), History::default())
    }
}

impl EditorSession {
    pub fn new(buffer: LineBuffer, history: History) -> Self {
        Self {
            buffer,
            history,
            cursor: CursorState::default(),
            path: None,
            revision: 0,
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(LineBuffer::from_text(text), History::default())
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Monotonic counter bumped on every text change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn touch(&mut self) {
        self.revision += 1;
    }

    /// Swap in a new document. History is cleared (the pending step is
    /// dropped, not committed) and the caret returns to the origin.
    pub fn replace_document(&mut self, text: &str) {
        self.buffer = LineBuffer::from_text(text);
        self.history.clear();
        self.cursor = CursorState::default();
        self.touch();
        trace!(target: "state.session", lines = self.buffer.line_count(), "replace_document");
    }

    /// Undo one step. Returns the cursor to restore; the caller is expected
    /// to normalize it against the new buffer content.
    pub fn undo(&mut self) -> Option<SelectionIndex> {
        let restore = self.history.undo(&self.buffer, self.cursor.position())?;
        Some(self.apply(restore))
    }

    pub fn redo(&mut self) -> Option<SelectionIndex> {
        let restore = self.history.redo(&self.buffer, self.cursor.position())?;
        Some(self.apply(restore))
    }

    fn apply(&mut self, restore: Restore) -> SelectionIndex {
        self.buffer.replace_lines(restore.lines);
        self.touch();
        restore.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn selection_is_derived_and_ordered() {
        let mut cursor = CursorState {
            line: 1,
            index: 2,
            highlight: None,
        };
        assert!(!cursor.has_selection());
        cursor.anchor();
        assert!(!cursor.has_selection());
        cursor.set_position(SelectionIndex::new(0, 4));
        let range = cursor.selection_range().unwrap();
        assert_eq!(range.start(), SelectionIndex::new(0, 4));
        assert_eq!(range.end(), SelectionIndex::new(1, 2));
        cursor.anchor();
        assert_eq!(cursor.highlight, Some(SelectionIndex::new(1, 2)));
    }

    #[test]
    fn replace_document_resets_everything() {
        let mut session = EditorSession::from_text("a\nb");
        session.history.frame(&session.buffer, SelectionIndex::origin());
        session.cursor.set_position(SelectionIndex::new(1, 1));
        session.cursor.highlight = Some(SelectionIndex::origin());
        let before = session.revision();

        session.replace_document("syscall");
        assert_eq!(session.buffer.lines(), &["syscall"]);
        assert_eq!(session.cursor, CursorState::default());
        assert_eq!(session.history.undo_depth(), 0);
        assert!(session.history.deadline().is_none());
        assert!(session.revision() > before);
        assert!(session.undo().is_none());
    }

    #[test]
    fn undo_then_redo_restores_text() {
        let mut session = EditorSession::from_text("nop");
        let at = SelectionIndex::new(0, 3);
        session.history.dirty(&session.buffer, 0, 1, 1, at);
        let end = session.buffer.put(at, " # idle");
        session.cursor.set_position(end);

        assert_eq!(session.undo(), Some(at));
        assert_eq!(session.buffer.to_text(), "nop");
        session.cursor.set_position(at);
        assert_eq!(session.redo(), Some(end));
        assert_eq!(session.buffer.to_text(), "nop # idle");
    }
}
