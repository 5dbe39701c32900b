//! Pointer input and pixel/position mapping.
//!
//! Rows are `line_height` pixels tall; horizontal offsets come from the
//! injected `TextMeasure`. Coordinates are relative to the top-left of the
//! text area.

use super::DispatchResult;
use crate::{CursorController, signed};
use core_events::PointerEvent;
use core_state::EditorSession;
use core_text::word::{Direction, consume_direction};
use core_text::{SelectionIndex, byte_offset};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorPosition {
    pub offset_x: f32,
    pub offset_y: f32,
}

/// One visible row of a selection: `leading` is the unselected text before
/// the highlighted `body`, used to place the highlight horizontally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeLine {
    pub leading: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeSelection {
    pub ranges: Vec<RangeLine>,
    /// Pixel offset of the first returned row.
    pub top: f32,
}

fn slice(text: &str, start: usize, end: usize) -> &str {
    let start = byte_offset(text, start);
    let end = byte_offset(text, end).max(start);
    &text[start..end]
}

impl CursorController {
    /// Pixel position of `index`.
    pub fn to_position(&self, session: &EditorSession, index: SelectionIndex) -> CursorPosition {
        let Some(text) = session.buffer.lines().get(index.line) else {
            tracing::warn!(target: "actions.dispatch", line = index.line, lines = session.buffer.line_count(), "position_out_of_range");
            return CursorPosition {
                offset_x: 0.0,
                offset_y: 0.0,
            };
        };
        CursorPosition {
            offset_x: self.measure.width(slice(text, 0, index.index)),
            offset_y: self.line_start(index.line),
        }
    }

    /// Pixel position of the caret.
    pub fn caret_position(&self, session: &EditorSession) -> CursorPosition {
        self.to_position(session, session.cursor.position())
    }

    /// Buffer position under pixel `(x, y)`; rows outside the document clamp
    /// to the first or last line.
    pub fn cursor_coordinates(&self, session: &EditorSession, x: f32, y: f32) -> SelectionIndex {
        let last = session.buffer.line_count() - 1;
        let row = (y / self.settings.line_height).floor();
        let line = if row.is_nan() || row < 0.0 {
            0
        } else {
            (row as usize).min(last)
        };
        let index = self.measure.position(session.buffer.line_at(line), x);
        SelectionIndex::new(line, index)
    }

    /// Pixel offset of the top of `line`.
    pub fn line_start(&self, line: usize) -> f32 {
        line as f32 * self.settings.line_height
    }

    /// Selection slices for the visible rows `start..start + count`, or
    /// `None` when nothing selected is visible.
    pub fn selection_rows(
        &self,
        session: &EditorSession,
        start: usize,
        count: usize,
    ) -> Option<RangeSelection> {
        let range = session.cursor.selection_range()?;
        let visible = |line: usize| start <= line && line < start + count;
        let buffer = &session.buffer;

        if range.start_line == range.end_line {
            if !visible(range.start_line) {
                return None;
            }
            let line = buffer.line_at(range.start_line);
            return Some(RangeSelection {
                ranges: vec![RangeLine {
                    leading: slice(line, 0, range.start_index).to_string(),
                    body: slice(line, range.start_index, range.end_index).to_string(),
                }],
                top: self.line_start(range.start_line),
            });
        }

        let mut top = None;
        let mut ranges = Vec::new();
        if visible(range.start_line) {
            top.get_or_insert(range.start_line);
            let first = buffer.line_at(range.start_line);
            ranges.push(RangeLine {
                leading: slice(first, 0, range.start_index).to_string(),
                body: slice(first, range.start_index, usize::MAX).to_string(),
            });
        }

        let middle_start = (range.start_line + 1).max(start);
        let middle_end = range.end_line.min(start + count);
        if middle_start < middle_end {
            top.get_or_insert(middle_start);
        }
        for line in middle_start..middle_end {
            ranges.push(RangeLine {
                leading: String::new(),
                body: buffer.line_at(line).to_string(),
            });
        }

        if visible(range.end_line) {
            top.get_or_insert(range.end_line);
            ranges.push(RangeLine {
                leading: String::new(),
                body: slice(buffer.line_at(range.end_line), 0, range.end_index).to_string(),
            });
        }

        if ranges.is_empty() {
            return None;
        }
        Some(RangeSelection {
            ranges,
            top: self.line_start(top.unwrap_or(range.start_line)),
        })
    }

    /// Pointer press. One click places the caret (extending the selection
    /// with shift) and closes the current undo step; a double click selects
    /// the word under the pointer; a triple click selects the line.
    pub fn drop_cursor(
        &mut self,
        session: &mut EditorSession,
        x: f32,
        y: f32,
        detail: u8,
        shift: bool,
    ) -> DispatchResult {
        self.last_delete = None;
        let index = self.cursor_coordinates(session, x, y);
        match detail {
            2 => {
                let (start, end) = word_bounds(session.buffer.line_at(index.line), index.index);
                self.put_cursor(session, index.line as isize, end as isize);
                self.put_highlight(session, index.line as isize, start as isize);
            }
            3 => {
                let len = session.buffer.line_len(index.line);
                self.put_cursor(session, index.line as isize, len as isize);
                self.put_highlight(session, index.line as isize, 0);
            }
            _ => {
                if shift {
                    session.cursor.anchor();
                } else {
                    session.cursor.clear_selection();
                }
                session.history.commit();
                let (line, index) = signed(index);
                self.put_cursor(session, line, index);
            }
        }
        tracing::trace!(target: "actions.dispatch", op = "drop_cursor", detail, shift, line = index.line, index = index.index, "drop_cursor");
        DispatchResult::dirty()
    }

    pub fn handle_pointer(
        &mut self,
        session: &mut EditorSession,
        event: PointerEvent,
    ) -> DispatchResult {
        self.drop_cursor(session, event.x, event.y, event.detail, event.shift)
    }

    /// Extend the selection to the pointer. Dragging back onto the anchor
    /// leaves no selection at all.
    pub fn drag_to(&mut self, session: &mut EditorSession, x: f32, y: f32) -> DispatchResult {
        self.bring_inline(session);
        session.cursor.anchor();
        let target = self.cursor_coordinates(session, x, y);
        let (line, index) = signed(target);
        self.put_cursor(session, line, index);
        if session.cursor.highlight == Some(session.cursor.position()) {
            session.cursor.clear_selection();
        }
        DispatchResult::dirty()
    }
}

/// Word span around `index` for double-click selection. Between whitespace
/// and a token only the token side is taken.
fn word_bounds(text: &str, index: usize) -> (usize, usize) {
    let chars: Vec<char> = text.chars().collect();
    let index = index.min(chars.len());
    let is_space = |i: Option<usize>| {
        i.and_then(|i| chars.get(i))
            .is_some_and(|c| c.is_whitespace())
    };
    let backward_space = is_space(index.checked_sub(1));
    let forward_space = is_space(Some(index));
    let directional = backward_space != forward_space;

    let backward = if directional && backward_space {
        0
    } else {
        consume_direction(text, index, Direction::Backward, false)
    };
    let forward = if directional && forward_space {
        0
    } else {
        consume_direction(text, index, Direction::Forward, false)
    };
    (index - backward, index + forward)
}
