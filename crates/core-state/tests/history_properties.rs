//! Undo must walk any edit sequence back to the starting document, however
//! the steps were coalesced.

use std::time::Duration;

use core_state::{History, HistoryConfig, ManualClock};
use core_text::{LineBuffer, SelectionIndex};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Edit {
    Type { line: usize, index: usize, c: char },
    Split { line: usize, index: usize },
    Join { line: usize },
    Reindent,
    Pause,
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        4 => (0usize..16, 0usize..16, prop::char::range('a', 'z'))
            .prop_map(|(line, index, c)| Edit::Type { line, index, c }),
        2 => (0usize..16, 0usize..16).prop_map(|(line, index)| Edit::Split { line, index }),
        2 => (0usize..16).prop_map(|line| Edit::Join { line }),
        1 => Just(Edit::Reindent),
        1 => Just(Edit::Pause),
    ]
}

/// Record the edit in `history`, then perform it on `buffer`. Returns the
/// cursor handed to the capture, if anything was recorded.
fn perform(
    history: &mut History,
    clock: &ManualClock,
    buffer: &mut LineBuffer,
    edit: &Edit,
) -> Option<SelectionIndex> {
    let count = buffer.line_count();
    match *edit {
        Edit::Type { line, index, c } => {
            let line = line % count;
            let at = SelectionIndex::new(line, index % (buffer.line_len(line) + 1));
            history.dirty(buffer, line, 1, 1, at);
            buffer.put(at, &c.to_string());
            Some(at)
        }
        Edit::Split { line, index } => {
            let line = line % count;
            let at = SelectionIndex::new(line, index % (buffer.line_len(line) + 1));
            history.dirty(buffer, line, 1, 2, at);
            buffer.newline(at);
            Some(at)
        }
        Edit::Join { line } => {
            let line = line % count;
            if line + 1 < count {
                let at = SelectionIndex::new(line, buffer.line_len(line));
                history.dirty(buffer, line, 2, 1, at);
                buffer.delete_forwards(at, false);
                Some(at)
            } else {
                None
            }
        }
        Edit::Reindent => {
            let at = SelectionIndex::new(count - 1, 0);
            history.frame(buffer, at);
            buffer.prefix(0, count - 1, "\t", true);
            Some(at)
        }
        Edit::Pause => {
            clock.advance(Duration::from_millis(900));
            None
        }
    }
}

proptest! {
    #[test]
    fn undo_everything_restores_original(
        start in proptest::collection::vec("[a-c ]{0,6}", 1..5),
        edits in proptest::collection::vec(edit_strategy(), 0..40),
    ) {
        let clock = ManualClock::new();
        let config = HistoryConfig { backlog: usize::MAX, ..HistoryConfig::default() };
        let mut history = History::new(config, Box::new(clock.clone()));
        let original = LineBuffer::from_lines(start);
        let mut buffer = original.clone();
        let mut first_cursor = None;
        for edit in &edits {
            let recorded = perform(&mut history, &clock, &mut buffer, edit);
            first_cursor = first_cursor.or(recorded);
        }
        let mut last_cursor = None;
        while let Some(restore) = history.undo(&buffer, SelectionIndex::origin()) {
            buffer.replace_lines(restore.lines);
            last_cursor = Some(restore.cursor);
        }
        prop_assert_eq!(buffer, original);
        prop_assert_eq!(last_cursor, first_cursor);
    }

    #[test]
    fn redo_everything_restores_final(
        start in proptest::collection::vec("[a-c ]{0,6}", 1..5),
        edits in proptest::collection::vec(edit_strategy(), 1..30),
    ) {
        let clock = ManualClock::new();
        let config = HistoryConfig { backlog: usize::MAX, ..HistoryConfig::default() };
        let mut history = History::new(config, Box::new(clock.clone()));
        let mut buffer = LineBuffer::from_lines(start);
        for edit in &edits {
            perform(&mut history, &clock, &mut buffer, edit);
        }
        let edited = buffer.clone();
        while let Some(restore) = history.undo(&buffer, SelectionIndex::origin()) {
            buffer.replace_lines(restore.lines);
        }
        while let Some(restore) = history.redo(&buffer, SelectionIndex::origin()) {
            buffer.replace_lines(restore.lines);
        }
        prop_assert_eq!(buffer, edited);
    }
}
