//! Text mutation: typing, deletion, line splitting and clipboard text.
//!
//! Each mutation first records the lines it is about to touch through
//! `History::dirty` (so a later undo can restore them), then edits the
//! buffer, then bumps the session revision.

use super::DispatchResult;
use crate::{CursorController, signed};
use core_state::EditorSession;
use core_text::word::Direction;
use core_text::{SelectionIndex, SelectionRange};

impl CursorController {
    /// Delete the selected text, leaving the caret at its start. Returns
    /// false when there was nothing selected.
    pub(crate) fn drop_selection(&self, session: &mut EditorSession) -> bool {
        let Some(range) = session.cursor.selection_range() else {
            session.cursor.clear_selection();
            return false;
        };
        self.drop_range(session, range);
        true
    }

    fn drop_range(&self, session: &mut EditorSession, range: SelectionRange) {
        let cursor = session.cursor.position();
        session
            .history
            .dirty(&session.buffer, range.start_line, range.line_span(), 1, cursor);
        session.buffer.drop(range);
        session.touch();
        session.cursor.clear_selection();
        let (line, index) = signed(range.start());
        self.put_cursor(session, line, index);
        tracing::trace!(target: "actions.dispatch", op = "drop_selection", start_line = range.start_line, lines = range.line_span(), "drop_selection");
    }

    /// Replace the selection (if any) with `c`.
    pub(crate) fn type_char(&mut self, session: &mut EditorSession, c: char) -> DispatchResult {
        self.drop_selection(session);
        let at = session.cursor.position();
        session.history.dirty(&session.buffer, at.line, 1, 1, at);
        let mut utf8 = [0u8; 4];
        let end = session.buffer.put(at, c.encode_utf8(&mut utf8));
        session.touch();
        let (line, index) = signed(end);
        self.put_cursor(session, line, index);
        DispatchResult::edited()
    }

    /// Backspace (`Backward`) or Delete (`Forward`).
    ///
    /// A selection is always deleted first. With the action modifier the
    /// keypress only closes the current undo step: the caret's zero-width
    /// span is the whole target, so nothing else is removed. Otherwise one
    /// char, or one word run with alt, goes. Repeated deletes in the same
    /// direction coalesce into one undo step; a direction change or an
    /// action deletion starts a new one.
    pub(crate) fn handle_delete(
        &mut self,
        session: &mut EditorSession,
        direction: Direction,
        last: Option<Direction>,
        action: bool,
        alt: bool,
    ) -> DispatchResult {
        if last != Some(direction) || action {
            session.history.commit();
        }
        self.last_delete = Some(direction);

        if self.drop_selection(session) {
            return DispatchResult::edited();
        }
        if action {
            return DispatchResult::clean();
        }

        let at = session.cursor.position();
        let count = session.buffer.line_count();
        let len = session.buffer.line_len(at.line);
        let next = match direction {
            Direction::Backward if at.index > 0 => {
                session.history.dirty(&session.buffer, at.line, 1, 1, at);
                session.buffer.backspace(at, alt)
            }
            Direction::Backward if at.line > 0 => {
                session.history.dirty(&session.buffer, at.line - 1, 2, 1, at);
                session.buffer.backspace(at, alt)
            }
            Direction::Forward if at.index < len => {
                session.history.dirty(&session.buffer, at.line, 1, 1, at);
                session.buffer.delete_forwards(at, alt)
            }
            Direction::Forward if at.line + 1 < count => {
                session.history.dirty(&session.buffer, at.line, 2, 1, at);
                session.buffer.delete_forwards(at, alt)
            }
            _ => return DispatchResult::clean(),
        };
        session.touch();
        let (line, index) = signed(next);
        self.put_cursor(session, line, index);
        tracing::trace!(target: "actions.dispatch", op = "delete", ?direction, word = alt, line, index, "delete");
        DispatchResult::edited()
    }

    /// Split the line at the caret with auto-indent. Shift+Enter splits at
    /// the line end instead, opening a fresh line below.
    pub(crate) fn handle_enter(
        &mut self,
        session: &mut EditorSession,
        shift: bool,
    ) -> DispatchResult {
        if shift {
            let line = session.cursor.line;
            let len = session.buffer.line_len(line);
            self.put_cursor(session, line as isize, len as isize);
        }
        session.history.commit();
        self.drop_selection(session);

        let at = session.cursor.position();
        session.history.dirty(&session.buffer, at.line, 1, 2, at);
        let next = session.buffer.newline(at);
        session.touch();
        let (line, index) = signed(next);
        self.put_cursor(session, line, index);
        tracing::trace!(target: "actions.dispatch", op = "newline", line, index, "newline");
        DispatchResult::edited()
    }

    /// Insert possibly multi-line `text` at the caret, replacing the selection.
    pub fn paste_text(&mut self, session: &mut EditorSession, text: &str) -> DispatchResult {
        self.bring_inline(session);
        self.drop_selection(session);
        let at = session.cursor.position();
        let inserted = text.split('\n').count();
        session.history.dirty(&session.buffer, at.line, 1, inserted, at);
        let end = session.buffer.paste(at, text);
        session.touch();
        let (line, index) = signed(end);
        self.put_cursor(session, line, index);
        tracing::trace!(target: "actions.dispatch", op = "paste", lines = inserted, "paste");
        DispatchResult::edited()
    }

    /// Text covered by the selection, if any.
    pub fn selected_text(&self, session: &EditorSession) -> Option<String> {
        let range = session.cursor.selection_range()?;
        Some(session.buffer.grab(range))
    }

    /// Remove the selection and hand back its text.
    pub fn cut_selection(&mut self, session: &mut EditorSession) -> Option<String> {
        let text = self.selected_text(session)?;
        self.drop_selection(session);
        Some(text)
    }

    /// Select the whole document, caret at the start.
    pub fn select_all(&mut self, session: &mut EditorSession) -> DispatchResult {
        let last = session.buffer.line_count() - 1;
        let len = session.buffer.line_len(last);
        self.put_cursor(session, 0, 0);
        self.put_highlight(session, last as isize, len as isize);
        DispatchResult::dirty()
    }

    /// Place the caret at `index` (aligned) and drop any selection.
    pub fn jump(&mut self, session: &mut EditorSession, index: SelectionIndex) -> DispatchResult {
        let (line, index) = signed(index);
        self.put_cursor(session, line, index);
        session.cursor.clear_selection();
        DispatchResult::dirty()
    }
}
