//! Key dispatch for the cursor controller.
//!
//! Sub-modules own one concern each and extend `CursorController` with the
//! operations behind it:
//! * `motion`  - arrows, Home/End, word jumps
//! * `edit`    - typing, deletion, Enter, clipboard text
//! * `indent`  - Tab / Shift+Tab
//! * `comment` - `#` comment toggling
//! * `pointer` - click, drag and pixel/position mapping
//! * `undo`    - undo / redo
//!
//! `handle_key` is the single entry point for keyboard input. It returns a
//! `DispatchResult` telling the host whether to repaint, whether the text
//! changed (reschedule syntax checks), and any text bound for the clipboard.

use core_events::{Key, KeyEvent, KeyModifiers, NamedKey};
use core_state::EditorSession;
use core_text::word::Direction;

use crate::CursorController;

mod comment;
mod edit;
mod indent;
mod motion;
pub mod pointer;
mod undo;

pub use motion::MotionKind;

/// Result of dispatching a single input event.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DispatchResult {
    /// The caret, selection or text changed; repaint.
    pub dirty: bool,
    /// Buffer content changed.
    pub text_changed: bool,
    /// Every line was replaced at once (undo/redo); partial render caches are stale.
    pub buffer_replaced: bool,
    /// Text the host should place on the clipboard (copy/cut).
    pub clipboard: Option<String>,
}

impl DispatchResult {
    pub fn clean() -> Self {
        Self::default()
    }
    pub fn dirty() -> Self {
        Self {
            dirty: true,
            ..Self::default()
        }
    }
    pub fn edited() -> Self {
        Self {
            dirty: true,
            text_changed: true,
            ..Self::default()
        }
    }
    pub fn buffer_replaced() -> Self {
        Self {
            dirty: true,
            text_changed: true,
            buffer_replaced: true,
            clipboard: None,
        }
    }
    pub fn with_clipboard(mut self, text: Option<String>) -> Self {
        self.clipboard = text;
        self
    }
}

impl CursorController {
    /// Apply one key press to `session`.
    pub fn handle_key(&mut self, session: &mut EditorSession, event: KeyEvent) -> DispatchResult {
        let last_delete = self.last_delete.take();
        self.bring_inline(session);

        let action = self.platform.has_action_key(event.mods);
        let alt = self.platform.has_alt_key(event.mods);
        let shift = event.shift();

        let result = match event.key {
            Key::Named(NamedKey::Left) if action => {
                self.handle_motion(session, MotionKind::LineStart, shift)
            }
            Key::Named(NamedKey::Right) if action => {
                self.handle_motion(session, MotionKind::LineEnd, shift)
            }
            Key::Named(NamedKey::Left) if alt => {
                self.handle_motion(session, MotionKind::WordLeft, shift)
            }
            Key::Named(NamedKey::Right) if alt => {
                self.handle_motion(session, MotionKind::WordRight, shift)
            }
            Key::Named(NamedKey::Left) => self.handle_motion(session, MotionKind::Left, shift),
            Key::Named(NamedKey::Right) => self.handle_motion(session, MotionKind::Right, shift),
            Key::Named(NamedKey::Up) => self.handle_motion(session, MotionKind::Up, shift),
            Key::Named(NamedKey::Down) => self.handle_motion(session, MotionKind::Down, shift),
            Key::Named(NamedKey::Home) => self.handle_motion(session, MotionKind::LineStart, shift),
            Key::Named(NamedKey::End) => self.handle_motion(session, MotionKind::LineEnd, shift),
            Key::Named(NamedKey::Escape) => DispatchResult::clean(),
            Key::Named(NamedKey::Tab) => self.hit_tab(session, shift),
            Key::Named(NamedKey::Backspace) => {
                self.handle_delete(session, Direction::Backward, last_delete, action, alt)
            }
            Key::Named(NamedKey::Delete) => {
                self.handle_delete(session, Direction::Forward, last_delete, action, alt)
            }
            Key::Named(NamedKey::Enter) => self.handle_enter(session, shift),
            Key::Char(c) if event.mods.intersects(KeyModifiers::CTRL | KeyModifiers::META) => {
                if action {
                    self.handle_action_key(session, c, shift)
                } else {
                    DispatchResult::clean()
                }
            }
            Key::Char('\n') => self.handle_enter(session, shift),
            Key::Char('\t') => self.hit_tab(session, shift),
            Key::Char(c) if c.is_control() => DispatchResult::clean(),
            Key::Char(c) => self.type_char(session, c),
        };
        tracing::trace!(target: "actions.dispatch", key = %event, dirty = result.dirty, text_changed = result.text_changed, "handle_key");
        result
    }

    fn handle_action_key(
        &mut self,
        session: &mut EditorSession,
        c: char,
        shift: bool,
    ) -> DispatchResult {
        match c.to_ascii_lowercase() {
            'a' => self.select_all(session),
            '/' => self.comment(session),
            'z' if shift => self.handle_redo(session),
            'z' => self.handle_undo(session),
            'y' => self.handle_redo(session),
            'c' => DispatchResult::clean().with_clipboard(self.selected_text(session)),
            'x' => match self.cut_selection(session) {
                Some(text) => DispatchResult::edited().with_clipboard(Some(text)),
                None => DispatchResult::clean(),
            },
            _ => DispatchResult::clean(),
        }
    }
}
