//! Line-oriented text buffer abstraction.
//!
//! The document is an ordered sequence of line strings without newline
//! characters. Joins and splits are explicit operations. In-line offsets are
//! counted in `char`s (Unicode scalar values), never bytes.
//!
//! Callers are responsible for normalizing positions before calling any
//! mutator (see the controller's alignment step). Line indices past the end
//! panic; in-line offsets past the end trip a debug assertion and saturate to
//! the line length in release builds so the line-count invariant always holds.

use tracing::trace;

pub mod measure;
pub mod word;

pub use measure::{MonospaceMeasure, TextMeasure};

/// A cursor or anchor position: line number plus char offset within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct SelectionIndex {
    pub line: usize,
    pub index: usize,
}

impl SelectionIndex {
    pub const fn new(line: usize, index: usize) -> Self {
        Self { line, index }
    }
    pub const fn origin() -> Self {
        Self { line: 0, index: 0 }
    }
}

/// Normalized span between two positions. `start` never sorts after `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionRange {
    pub start_line: usize,
    pub start_index: usize,
    pub end_line: usize,
    pub end_index: usize,
}

impl SelectionRange {
    /// Order two positions into a range (earlier position becomes `start`).
    pub fn between(a: SelectionIndex, b: SelectionIndex) -> Self {
        let (start, end) = if b < a { (b, a) } else { (a, b) };
        Self {
            start_line: start.line,
            start_index: start.index,
            end_line: end.line,
            end_index: end.index,
        }
    }
    pub fn start(&self) -> SelectionIndex {
        SelectionIndex::new(self.start_line, self.start_index)
    }
    pub fn end(&self) -> SelectionIndex {
        SelectionIndex::new(self.end_line, self.end_index)
    }
    pub fn is_empty(&self) -> bool {
        self.start() == self.end()
    }
    /// Number of buffer lines touched by the range.
    pub fn line_span(&self) -> usize {
        self.end_line - self.start_line + 1
    }
}

/// Half-open `[start, end)` char span within a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
    pub const fn len(&self) -> usize {
        self.end - self.start
    }
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Char count of a line.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of the `index`-th char (saturating at the end of `text`).
pub fn byte_offset(text: &str, index: usize) -> usize {
    text.char_indices()
        .nth(index)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

/// Leading whitespace prefix of a line.
pub fn leading_whitespace(text: &str) -> &str {
    let body = text.trim_start();
    &text[..text.len() - body.len()]
}

/// Trailing whitespace suffix of a line, never overlapping the leading prefix.
pub fn trailing_whitespace(text: &str) -> &str {
    let lead = leading_whitespace(text).len();
    let rest = &text[lead..];
    &rest[rest.trim_end().len()..]
}

/// The document: an ordered, never-empty sequence of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<String>,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuffer {
    /// A buffer holding one empty line.
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
        }
    }

    /// Split `text` on `\n` (dropping a `\r` preceding each newline).
    pub fn from_text(text: &str) -> Self {
        let lines = text
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        Self::from_lines(lines)
    }

    pub fn from_lines(lines: Vec<String>) -> Self {
        let mut buffer = Self { lines };
        buffer.ensure_line();
        buffer
    }

    /// Replace the entire content (undo/redo restoration).
    pub fn replace_lines(&mut self, lines: Vec<String>) {
        self.lines = lines;
        self.ensure_line();
        trace!(target: "text.buffer", lines = self.lines.len(), "replace_lines");
    }

    fn ensure_line(&mut self) {
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Content of line `n`. Panics when `n` is out of range.
    pub fn line_at(&self, n: usize) -> &str {
        &self.lines[n]
    }

    /// Char length of line `n`.
    pub fn line_len(&self, n: usize) -> usize {
        char_len(&self.lines[n])
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Document text with lines joined by `\n`.
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }

    /// Byte offset into line `line` for char offset `index`.
    fn checked_offset(&self, line: usize, index: usize) -> usize {
        let text = &self.lines[line];
        debug_assert!(
            index <= char_len(text),
            "offset {index} past end of line {line}"
        );
        byte_offset(text, index)
    }

    /// Insert single-line `text` at `index`. Returns the position after it.
    pub fn put(&mut self, index: SelectionIndex, text: &str) -> SelectionIndex {
        debug_assert!(!text.contains('\n'), "put expects a single line");
        let at = self.checked_offset(index.line, index.index);
        self.lines[index.line].insert_str(at, text);
        SelectionIndex::new(index.line, index.index + char_len(text))
    }

    /// Insert possibly multi-line `text` at `index`. Returns the position after it.
    pub fn paste(&mut self, index: SelectionIndex, text: &str) -> SelectionIndex {
        let mut pieces: Vec<&str> = text.split('\n').collect();
        if pieces.len() == 1 {
            return self.put(index, text);
        }
        let at = self.checked_offset(index.line, index.index);
        let trailing = self.lines[index.line].split_off(at);
        let first = pieces.remove(0);
        self.lines[index.line].push_str(first);

        let last_len = pieces.last().map(|p| char_len(p)).unwrap_or(0);
        let count = pieces.len();
        let mut inserted: Vec<String> = pieces.into_iter().map(str::to_string).collect();
        if let Some(last) = inserted.last_mut() {
            last.push_str(&trailing);
        }
        let tail = index.line + 1;
        self.lines.splice(tail..tail, inserted);
        trace!(target: "text.buffer", line = index.line, added = count, "paste");
        SelectionIndex::new(index.line + count, last_len)
    }

    /// Remove the text covered by `range`.
    pub fn drop(&mut self, range: SelectionRange) {
        debug_assert!(
            range.start_line < range.end_line
                || (range.start_line == range.end_line && range.start_index <= range.end_index),
            "range must be ordered"
        );
        if range.start_line == range.end_line {
            let start = self.checked_offset(range.start_line, range.start_index);
            let end = self.checked_offset(range.end_line, range.end_index);
            self.lines[range.start_line].replace_range(start..end.max(start), "");
            return;
        }
        let start = self.checked_offset(range.start_line, range.start_index);
        let end = self.checked_offset(range.end_line, range.end_index);
        let trailing = self.lines[range.end_line][end..].to_string();
        let first = &mut self.lines[range.start_line];
        first.truncate(start);
        first.push_str(&trailing);
        self.lines.drain(range.start_line + 1..=range.end_line);
        trace!(target: "text.buffer", line = range.start_line, removed = range.end_line - range.start_line, "drop");
    }

    /// Text covered by `range`, with lines joined by `\n`.
    pub fn grab(&self, range: SelectionRange) -> String {
        let start = self.checked_offset(range.start_line, range.start_index);
        let end = self.checked_offset(range.end_line, range.end_index);
        if range.start_line == range.end_line {
            return self.lines[range.start_line][start..end.max(start)].to_string();
        }
        let mut out = String::from(&self.lines[range.start_line][start..]);
        for line in &self.lines[range.start_line + 1..range.end_line] {
            out.push('\n');
            out.push_str(line);
        }
        out.push('\n');
        out.push_str(&self.lines[range.end_line][..end]);
        out
    }

    /// Delete one char (or a word run) before `index`, joining with the previous
    /// line at column 0. Returns the new cursor position.
    pub fn backspace(&mut self, index: SelectionIndex, word_mode: bool) -> SelectionIndex {
        if index.index > 0 {
            let text = &self.lines[index.line];
            let consumed = if word_mode {
                word::consume_backward(text, index.index).max(1)
            } else {
                1
            };
            let start_index = index.index.saturating_sub(consumed);
            let start = self.checked_offset(index.line, start_index);
            let end = self.checked_offset(index.line, index.index);
            self.lines[index.line].replace_range(start..end, "");
            SelectionIndex::new(index.line, start_index)
        } else if index.line > 0 {
            let current = self.lines.remove(index.line);
            let previous = &mut self.lines[index.line - 1];
            let join = char_len(previous);
            previous.push_str(&current);
            trace!(target: "text.buffer", line = index.line - 1, "join_previous");
            SelectionIndex::new(index.line - 1, join)
        } else {
            index
        }
    }

    /// Delete one char (or a word run) after `index`, joining the next line at
    /// the end of a line. The cursor position does not move.
    pub fn delete_forwards(&mut self, index: SelectionIndex, word_mode: bool) -> SelectionIndex {
        let len = self.line_len(index.line);
        if index.index < len {
            let text = &self.lines[index.line];
            let consumed = if word_mode {
                word::consume_forward(text, index.index).max(1)
            } else {
                1
            };
            let end_index = (index.index + consumed).min(len);
            let start = self.checked_offset(index.line, index.index);
            let end = self.checked_offset(index.line, end_index);
            self.lines[index.line].replace_range(start..end, "");
        } else if index.line + 1 < self.lines.len() {
            let next = self.lines.remove(index.line + 1);
            self.lines[index.line].push_str(&next);
            trace!(target: "text.buffer", line = index.line, "join_next");
        }
        index
    }

    /// Split the line at `index`. The new line inherits the original line's
    /// indentation; the moved trailing text loses its own leading whitespace.
    /// Returns the start of the content on the new line.
    pub fn newline(&mut self, index: SelectionIndex) -> SelectionIndex {
        let at = self.checked_offset(index.line, index.index);
        let spacing = leading_whitespace(&self.lines[index.line]).to_string();
        let trailing = self.lines[index.line].split_off(at);
        let moved = trailing.trim_start();
        let mut next = String::with_capacity(spacing.len() + moved.len());
        next.push_str(&spacing);
        next.push_str(moved);
        self.lines.insert(index.line + 1, next);
        SelectionIndex::new(index.line + 1, char_len(&spacing))
    }

    /// Remove one leading tab, or up to `spacing` leading spaces. Returns the
    /// number of chars removed.
    pub fn drop_tab(&mut self, line: usize, spacing: usize) -> usize {
        let text = &mut self.lines[line];
        let removed = if text.starts_with('\t') {
            1
        } else {
            text.chars().take(spacing).take_while(|c| *c == ' ').count()
        };
        text.replace_range(..removed, "");
        removed
    }

    /// Remove one range per line starting at `start_line`; `None` leaves the line alone.
    pub fn crop(&mut self, start_line: usize, ranges: &[Option<LineRange>]) {
        for (offset, range) in ranges.iter().enumerate() {
            let Some(range) = range else { continue };
            let line = start_line + offset;
            let start = self.checked_offset(line, range.start);
            let end = self.checked_offset(line, range.end);
            self.lines[line].replace_range(start..end.max(start), "");
        }
    }

    /// Insert `text` after the indentation of every line in `start_line..=end_line`.
    pub fn prefix(&mut self, start_line: usize, end_line: usize, text: &str, only_non_empty: bool) {
        for line in &mut self.lines[start_line..=end_line] {
            let lead = leading_whitespace(line).len();
            if only_non_empty && lead == line.len() {
                continue;
            }
            line.insert_str(lead, text);
        }
    }
}
