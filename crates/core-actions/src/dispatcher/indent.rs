//! Tab / Shift+Tab.

use super::DispatchResult;
use crate::{CursorController, signed};
use core_state::EditorSession;
use core_text::SelectionIndex;

impl CursorController {
    /// With a selection, indent (or dedent) every covered line by one tab
    /// width. Without one, pad to the next tab stop (or drop one level of
    /// leading indentation on the caret's line).
    pub fn hit_tab(&mut self, session: &mut EditorSession, shift: bool) -> DispatchResult {
        let tab_size = self.settings.tab_size.max(1);
        let position = self.bring_inline(session);

        let region = session.cursor.selection_range();
        let (first, last) = region.map_or((position.line, position.line), |r| {
            (r.start_line, r.end_line)
        });
        if shift && !(first..=last).any(|line| indented(session.buffer.line_at(line))) {
            return DispatchResult::clean();
        }

        let Some(region) = region else {
            session.history.dirty(&session.buffer, position.line, 1, 1, position);
            let (line, index) = signed(position);
            let moved = if shift {
                let removed = session.buffer.drop_tab(position.line, tab_size);
                self.put_cursor(session, line, index - removed as isize);
                removed
            } else {
                let spaces = tab_size - position.index % tab_size;
                session.buffer.put(position, &" ".repeat(spaces));
                self.put_cursor(session, line, index + spaces as isize);
                spaces
            };
            session.touch();
            tracing::trace!(target: "actions.dispatch", op = "tab", shift, moved, "tab");
            return DispatchResult::edited();
        };

        session.history.frame(&session.buffer, position);
        let spaces = " ".repeat(tab_size);
        for line in region.start_line..=region.end_line {
            let alignment = if shift {
                -(session.buffer.drop_tab(line, tab_size) as isize)
            } else {
                session.buffer.put(SelectionIndex::new(line, 0), &spaces);
                tab_size as isize
            };
            self.adjust_line(session, line, alignment);
        }
        session.touch();
        tracing::trace!(target: "actions.dispatch", op = "indent", shift, start_line = region.start_line, end_line = region.end_line, "indent");
        DispatchResult::edited()
    }

    /// Shift caret and anchor indices that sit on `line` by `delta`.
    fn adjust_line(&self, session: &mut EditorSession, line: usize, delta: isize) {
        if session.cursor.line == line {
            let (l, i) = signed(session.cursor.position());
            self.put_cursor(session, l, i + delta);
        }
        if let Some(highlight) = session.cursor.highlight
            && highlight.line == line
        {
            let (l, i) = signed(highlight);
            self.put_highlight(session, l, i + delta);
        }
    }
}

fn indented(text: &str) -> bool {
    text.starts_with(['\t', ' '])
}
