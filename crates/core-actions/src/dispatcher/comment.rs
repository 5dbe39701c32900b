//! `#` comment toggling.
//!
//! The decision is made once for the whole selection: when every non-blank
//! line is already commented the markers are removed, otherwise `# ` is added
//! to each non-blank line that lacks one. Blank lines never vote and are
//! never touched.

use super::DispatchResult;
use crate::{CursorController, signed};
use core_state::EditorSession;
use core_text::{LineRange, char_len, leading_whitespace};

const COMMENT_PREFIX: &str = "# ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineComment {
    Blank,
    /// Span of the `#` or `# ` marker.
    Commented(LineRange),
    Plain,
}

fn classify_line(text: &str) -> LineComment {
    let leading = leading_whitespace(text);
    if leading.len() == text.len() {
        return LineComment::Blank;
    }
    let start = char_len(leading);
    let rest = &text[leading.len()..];
    if rest.starts_with(COMMENT_PREFIX) {
        LineComment::Commented(LineRange::new(start, start + 2))
    } else if rest.starts_with('#') {
        LineComment::Commented(LineRange::new(start, start + 1))
    } else {
        LineComment::Plain
    }
}

/// Where `index` lands once `range` is cut out of its line.
fn reposition(index: usize, range: LineRange) -> usize {
    if index < range.start {
        index
    } else if index < range.end {
        range.start
    } else {
        index - range.len()
    }
}

impl CursorController {
    /// Toggle comments on the selected lines (or the caret's line). Without a
    /// selection the caret then steps down one line.
    pub fn comment(&mut self, session: &mut EditorSession) -> DispatchResult {
        self.bring_inline(session);
        let cursor = session.cursor;
        let region = cursor.selection_range();
        let (start, end) = region.map_or((cursor.line, cursor.line), |r| {
            (r.start_line, r.end_line)
        });
        let line_offset = if region.is_some() { 0 } else { 1 };
        let highlight = cursor.highlight.filter(|_| region.is_some());

        let states: Vec<LineComment> = (start..=end)
            .map(|line| classify_line(session.buffer.line_at(line)))
            .collect();
        let state_of = |line: usize| states[line - start];
        let uncomment = states.iter().all(|s| *s != LineComment::Plain);
        let count = end - start + 1;

        let mut cursor_index = cursor.index;
        let mut highlight_index = highlight.map(|h| h.index);

        if uncomment {
            let crops: Vec<Option<LineRange>> = states
                .iter()
                .map(|s| match s {
                    LineComment::Commented(range) => Some(*range),
                    _ => None,
                })
                .collect();
            if let LineComment::Commented(range) = state_of(cursor.line) {
                cursor_index = reposition(cursor.index, range);
            }
            if let Some(h) = highlight
                && let LineComment::Commented(range) = state_of(h.line)
            {
                highlight_index = Some(reposition(h.index, range));
            }
            if crops.iter().any(Option::is_some) {
                session
                    .history
                    .dirty(&session.buffer, start, count, count, cursor.position());
                session.buffer.crop(start, &crops);
            }
        } else {
            session
                .history
                .dirty(&session.buffer, start, count, count, cursor.position());
            for (offset, state) in states.iter().enumerate() {
                if *state == LineComment::Plain {
                    let line = start + offset;
                    session.buffer.prefix(line, line, COMMENT_PREFIX, true);
                }
            }
            let shifted = |line: usize, index: usize| {
                let lead = char_len(leading_whitespace(session.buffer.line_at(line)));
                if state_of(line) == LineComment::Plain && index >= lead {
                    index + 2
                } else {
                    index
                }
            };
            cursor_index = shifted(cursor.line, cursor.index);
            highlight_index = highlight.map(|h| shifted(h.line, h.index));
        }

        let changed = !uncomment || states.iter().any(|s| matches!(s, LineComment::Commented(_)));
        if changed {
            session.touch();
        }
        self.put_cursor(
            session,
            (cursor.line + line_offset) as isize,
            cursor_index as isize,
        );
        if let (Some(h), Some(index)) = (highlight, highlight_index) {
            self.put_highlight(session, h.line as isize, index as isize);
        }
        tracing::trace!(target: "actions.dispatch", op = "comment", start_line = start, end_line = end, uncomment, "comment");
        if changed {
            DispatchResult::edited()
        } else {
            DispatchResult::dirty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_markers_after_indent() {
        assert_eq!(classify_line("   "), LineComment::Blank);
        assert_eq!(classify_line(""), LineComment::Blank);
        assert_eq!(classify_line("  # x"), LineComment::Commented(LineRange::new(2, 4)));
        assert_eq!(classify_line("\t#x"), LineComment::Commented(LineRange::new(1, 2)));
        assert_eq!(classify_line("  nop # trailing"), LineComment::Plain);
    }

    #[test]
    fn reposition_snaps_inside_marker() {
        let marker = LineRange::new(2, 4);
        assert_eq!(reposition(1, marker), 1);
        assert_eq!(reposition(3, marker), 2);
        assert_eq!(reposition(4, marker), 2);
        assert_eq!(reposition(9, marker), 7);
    }
}
