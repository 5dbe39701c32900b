//! Cursor & selection controller.
//!
//! `CursorController` turns keyboard and pointer input into `LineBuffer`
//! mutations, recording each edit in the session's `History` *before* the
//! buffer changes. It holds no document state of its own apart from the
//! direction of the previous deletion (used to split undo steps); the
//! caret, selection anchor, buffer and history all live in the
//! `EditorSession` threaded through every call.
//!
//! Every caret write goes through `align_cursor`, so the caret observed by
//! callers is always a valid buffer position.

use core_config::Config;
use core_events::Platform;
use core_state::EditorSession;
use core_text::word::Direction;
use core_text::{LineBuffer, MonospaceMeasure, SelectionIndex, TextMeasure};

pub mod dispatcher;

pub use dispatcher::DispatchResult;
pub use dispatcher::pointer::{CursorPosition, RangeLine, RangeSelection};

/// Editing settings consumed by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorSettings {
    pub tab_size: usize,
    /// Pixel height of one text row.
    pub line_height: f32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            tab_size: 4,
            line_height: 18.0,
        }
    }
}

impl EditorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tab_size: config.tab_size(),
            line_height: config.line_height(),
        }
    }
}

/// Clamp a possibly out-of-range position onto the buffer.
///
/// A line before the first snaps to the document start, a line past the last
/// snaps to the document end, and otherwise the index is clamped into the
/// line. Applying it twice yields the same position.
pub fn align_cursor(buffer: &LineBuffer, line: isize, index: isize) -> SelectionIndex {
    let count = buffer.line_count();
    if line < 0 {
        return SelectionIndex::origin();
    }
    let line = line as usize;
    if line >= count {
        let last = count - 1;
        return SelectionIndex::new(last, buffer.line_len(last));
    }
    let index = index.clamp(0, buffer.line_len(line) as isize) as usize;
    SelectionIndex::new(line, index)
}

pub(crate) fn signed(position: SelectionIndex) -> (isize, isize) {
    (position.line as isize, position.index as isize)
}

pub struct CursorController {
    settings: EditorSettings,
    measure: Box<dyn TextMeasure>,
    platform: Platform,
    last_delete: Option<Direction>,
}

impl Default for CursorController {
    fn default() -> Self {
        Self::new(
            EditorSettings::default(),
            Box::new(MonospaceMeasure::default()),
            Platform::default(),
        )
    }
}

impl std::fmt::Debug for CursorController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorController")
            .field("settings", &self.settings)
            .field("platform", &self.platform)
            .field("last_delete", &self.last_delete)
            .finish()
    }
}

impl CursorController {
    pub fn new(
        settings: EditorSettings,
        measure: Box<dyn TextMeasure>,
        platform: Platform,
    ) -> Self {
        Self {
            settings,
            measure,
            platform,
            last_delete: None,
        }
    }

    pub fn settings(&self) -> EditorSettings {
        self.settings
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Normalize `(line, index)` against the session's buffer.
    pub fn align_cursor(
        &self,
        session: &EditorSession,
        line: isize,
        index: isize,
    ) -> SelectionIndex {
        align_cursor(&session.buffer, line, index)
    }

    /// Move the caret to the aligned form of `(line, index)`.
    pub(crate) fn put_cursor(&self, session: &mut EditorSession, line: isize, index: isize) {
        let position = align_cursor(&session.buffer, line, index);
        session.cursor.set_position(position);
    }

    pub(crate) fn put_highlight(&self, session: &mut EditorSession, line: isize, index: isize) {
        session.cursor.highlight = Some(align_cursor(&session.buffer, line, index));
    }

    /// Re-align caret and anchor in case the buffer changed underneath them.
    /// An anchor sitting on the caret is dropped.
    pub(crate) fn bring_inline(&self, session: &mut EditorSession) -> SelectionIndex {
        let (line, index) = signed(session.cursor.position());
        self.put_cursor(session, line, index);
        if let Some(highlight) = session.cursor.highlight {
            let (line, index) = signed(highlight);
            self.put_highlight(session, line, index);
        }
        if !session.cursor.has_selection() {
            session.cursor.clear_selection();
        }
        session.cursor.position()
    }
}
