//! Undo / Redo handling.
//!
//! The session restores whole line vectors; the controller then aligns the
//! saved caret against the restored content and drops any selection.

use super::DispatchResult;
use crate::{CursorController, signed};
use core_state::EditorSession;
use core_text::SelectionIndex;

impl CursorController {
    pub fn handle_undo(&mut self, session: &mut EditorSession) -> DispatchResult {
        let restored = session.undo();
        tracing::trace!(target: "actions.dispatch", op = "undo", applied = restored.is_some(), undo_depth = session.history.undo_depth(), "undo");
        self.restore_cursor(session, restored)
    }

    pub fn handle_redo(&mut self, session: &mut EditorSession) -> DispatchResult {
        let restored = session.redo();
        tracing::trace!(target: "actions.dispatch", op = "redo", applied = restored.is_some(), redo_depth = session.history.redo_depth(), "redo");
        self.restore_cursor(session, restored)
    }

    fn restore_cursor(
        &self,
        session: &mut EditorSession,
        restored: Option<SelectionIndex>,
    ) -> DispatchResult {
        let Some(position) = restored else {
            return DispatchResult::clean();
        };
        let (line, index) = signed(position);
        self.put_cursor(session, line, index);
        session.cursor.clear_selection();
        DispatchResult::buffer_replaced()
    }
}
