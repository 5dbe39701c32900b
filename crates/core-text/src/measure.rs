//! Text measurement used for pixel <-> position mapping.
//!
//! The real measurement service (font metrics) lives outside this crate; it is
//! reached through the `TextMeasure` trait. `MonospaceMeasure` is the built-in
//! implementation: each grapheme cluster occupies its terminal cell width
//! (`unicode-width`) times a fixed cell width, so wide CJK glyphs count twice.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

pub trait TextMeasure {
    /// Rendered width of `text` in pixels.
    fn width(&self, text: &str) -> f32;

    /// Char offset in `text` closest to horizontal pixel offset `x`.
    ///
    /// The default walks char boundaries and picks the one whose prefix width
    /// is nearest to `x`; implementors with cheaper lookups may override it.
    fn position(&self, text: &str, x: f32) -> usize {
        if x <= 0.0 {
            return 0;
        }
        let mut previous = 0.0f32;
        for (count, (byte, c)) in text.char_indices().enumerate() {
            let next = self.width(&text[..byte + c.len_utf8()]);
            if next >= x {
                return if x - previous < next - x { count } else { count + 1 };
            }
            previous = next;
        }
        text.chars().count()
    }
}

/// Fixed-pitch measurement: `cell_width` pixels per terminal cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasure {
    pub cell_width: f32,
}

impl MonospaceMeasure {
    pub const fn new(cell_width: f32) -> Self {
        Self { cell_width }
    }

    /// Terminal cells occupied by `text`. Zero-width clusters still take one cell
    /// so the caret never stacks on a combining sequence.
    pub fn cells(text: &str) -> usize {
        text.graphemes(true).map(|g| g.width().max(1)).sum()
    }
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self::new(8.0)
    }
}

impl TextMeasure for MonospaceMeasure {
    fn width(&self, text: &str) -> f32 {
        Self::cells(text) as f32 * self.cell_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_width_is_linear() {
        let m = MonospaceMeasure::new(10.0);
        assert_eq!(m.width(""), 0.0);
        assert_eq!(m.width("nop"), 30.0);
    }

    #[test]
    fn wide_glyphs_take_two_cells() {
        assert_eq!(MonospaceMeasure::cells("a漢"), 3);
    }

    #[test]
    fn position_rounds_to_nearest_boundary() {
        let m = MonospaceMeasure::new(10.0);
        assert_eq!(m.position("abcd", -5.0), 0);
        assert_eq!(m.position("abcd", 4.0), 0);
        assert_eq!(m.position("abcd", 6.0), 1);
        assert_eq!(m.position("abcd", 25.0), 3);
        assert_eq!(m.position("abcd", 400.0), 4);
    }

    #[test]
    fn position_inverts_width_on_boundaries() {
        let m = MonospaceMeasure::new(7.0);
        let line = "  lw $t0, 4($sp)";
        for i in 0..=line.chars().count() {
            let prefix: String = line.chars().take(i).collect();
            assert_eq!(m.position(line, m.width(&prefix)), i);
        }
    }
}
