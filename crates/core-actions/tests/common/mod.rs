// Shared across many integration tests; each test binary uses a subset of helpers.
#![allow(dead_code)]

use core_actions::{CursorController, DispatchResult, EditorSettings};
use core_events::{Platform, parse_key};
use core_state::{EditorSession, History, HistoryConfig, ManualClock};
use core_text::{LineBuffer, MonospaceMeasure, SelectionIndex};

pub const CELL: f32 = 10.0;
pub const ROW: f32 = 20.0;

pub fn session_with_clock(lines: &[&str]) -> (EditorSession, ManualClock) {
    let clock = ManualClock::new();
    let history = History::new(HistoryConfig::default(), Box::new(clock.clone()));
    let buffer = LineBuffer::from_lines(lines.iter().map(|s| s.to_string()).collect());
    (EditorSession::new(buffer, history), clock)
}

pub fn session(lines: &[&str]) -> EditorSession {
    session_with_clock(lines).0
}

pub fn controller_for(platform: Platform) -> CursorController {
    let settings = EditorSettings {
        tab_size: 4,
        line_height: ROW,
    };
    CursorController::new(settings, Box::new(MonospaceMeasure::new(CELL)), platform)
}

pub fn controller() -> CursorController {
    controller_for(Platform::Other)
}

/// Feed key notations in order, returning the last result.
pub fn press(
    ctrl: &mut CursorController,
    session: &mut EditorSession,
    keys: &[&str],
) -> DispatchResult {
    let mut last = DispatchResult::clean();
    for spec in keys {
        let event = parse_key(spec).unwrap_or_else(|e| panic!("bad key {spec:?}: {e}"));
        last = ctrl.handle_key(session, event);
    }
    last
}

/// Type every char of `text` as a plain key press.
pub fn type_text(ctrl: &mut CursorController, session: &mut EditorSession, text: &str) {
    for c in text.chars() {
        ctrl.handle_key(session, core_events::KeyEvent::char(c));
    }
}

pub fn lines(session: &EditorSession) -> Vec<&str> {
    session.buffer.lines().iter().map(String::as_str).collect()
}

pub fn place(session: &mut EditorSession, line: usize, index: usize) {
    session.cursor.set_position(SelectionIndex::new(line, index));
    session.cursor.highlight = None;
}

pub fn select(session: &mut EditorSession, from: (usize, usize), to: (usize, usize)) {
    session.cursor.highlight = Some(SelectionIndex::new(from.0, from.1));
    session.cursor.set_position(SelectionIndex::new(to.0, to.1));
}

pub fn caret(session: &EditorSession) -> (usize, usize) {
    (session.cursor.line, session.cursor.index)
}
