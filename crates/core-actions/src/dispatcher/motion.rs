//! Motion sub-dispatch (cursor movement).
//!
//! Unshifted horizontal motion with an active selection collapses it to the
//! boundary in the direction of travel instead of moving past it. Shifted
//! motion pins the anchor first. Left/Right wrap across line ends; Up/Down
//! keep the index and let alignment clamp it.

use super::DispatchResult;
use crate::{CursorController, signed};
use core_state::EditorSession;
use core_text::word::{consume_backward, consume_forward};
use core_text::{leading_whitespace, trailing_whitespace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    Left,
    Right,
    WordLeft,
    WordRight,
    Up,
    Down,
    /// First non-whitespace char.
    LineStart,
    /// Just past the last non-whitespace char.
    LineEnd,
}

impl CursorController {
    pub fn handle_motion(
        &mut self,
        session: &mut EditorSession,
        kind: MotionKind,
        shift: bool,
    ) -> DispatchResult {
        let before = session.cursor;
        match kind {
            MotionKind::Left => self.move_left(session, false, shift),
            MotionKind::Right => self.move_right(session, false, shift),
            MotionKind::WordLeft => self.move_left(session, true, shift),
            MotionKind::WordRight => self.move_right(session, true, shift),
            MotionKind::Up => self.move_vertical(session, -1, shift),
            MotionKind::Down => self.move_vertical(session, 1, shift),
            MotionKind::LineStart => self.move_start(session, shift),
            MotionKind::LineEnd => self.move_end(session, shift),
        }
        let after = session.cursor;
        tracing::trace!(target: "actions.dispatch", op = "motion", ?kind, shift, from_line = before.line, from_index = before.index, to_line = after.line, to_index = after.index, "motion");
        if before == after {
            DispatchResult::clean()
        } else {
            DispatchResult::dirty()
        }
    }

    /// Pin or drop the anchor for a motion. Returns false when the motion
    /// was absorbed by collapsing an existing selection.
    fn prepare_horizontal(&self, session: &mut EditorSession, shift: bool, forward: bool) -> bool {
        let range = session.cursor.selection_range();
        match (shift, range) {
            (false, Some(range)) => {
                let (line, index) = signed(if forward { range.end() } else { range.start() });
                self.put_cursor(session, line, index);
                session.cursor.clear_selection();
                false
            }
            (false, None) => {
                session.cursor.clear_selection();
                true
            }
            (true, _) => {
                session.cursor.anchor();
                true
            }
        }
    }

    fn move_left(&self, session: &mut EditorSession, alt: bool, shift: bool) {
        let position = session.cursor.position();
        if !self.prepare_horizontal(session, shift, false) {
            return;
        }
        let text = session.buffer.line_at(position.line);
        let consume = if alt { consume_backward(text, position.index).max(1) } else { 1 };
        let (mut line, mut index) = signed(position);
        index -= consume as isize;
        if index < 0 && line > 0 {
            line -= 1;
            index = session.buffer.line_len(line as usize) as isize;
        }
        self.put_cursor(session, line, index);
    }

    fn move_right(&self, session: &mut EditorSession, alt: bool, shift: bool) {
        let position = session.cursor.position();
        if !self.prepare_horizontal(session, shift, true) {
            return;
        }
        let text = session.buffer.line_at(position.line);
        let consume = if alt { consume_forward(text, position.index).max(1) } else { 1 };
        let (mut line, mut index) = signed(position);
        index += consume as isize;
        if index > session.buffer.line_len(position.line) as isize {
            line += 1;
            index = 0;
        }
        self.put_cursor(session, line, index);
    }

    fn set_selection(&self, session: &mut EditorSession, shift: bool) {
        if shift {
            session.cursor.anchor();
        } else {
            session.cursor.clear_selection();
        }
    }

    fn move_vertical(&self, session: &mut EditorSession, delta: isize, shift: bool) {
        self.set_selection(session, shift);
        let (line, index) = signed(session.cursor.position());
        self.put_cursor(session, line + delta, index);
    }

    fn move_start(&self, session: &mut EditorSession, shift: bool) {
        self.set_selection(session, shift);
        let line = session.cursor.line;
        let start = leading_whitespace(session.buffer.line_at(line)).chars().count();
        self.put_cursor(session, line as isize, start as isize);
    }

    fn move_end(&self, session: &mut EditorSession, shift: bool) {
        self.set_selection(session, shift);
        let line = session.cursor.line;
        let text = session.buffer.line_at(line);
        let end = text.chars().count() - trailing_whitespace(text).chars().count();
        self.put_cursor(session, line as isize, end as isize);
    }
}
