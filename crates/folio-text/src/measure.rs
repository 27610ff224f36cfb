//! Glyph measurement seam.
//!
//! Font metrics live outside this engine; the renderer that owns the real
//! font supplies an implementation of [`GlyphMeasure`]. The engine only ever
//! asks two questions: how wide is this char, and how many chars of this run
//! fit in a pixel budget.

use unicode_width::UnicodeWidthChar;

/// Width-measurement capability supplied by the embedding renderer.
pub trait GlyphMeasure {
    /// Horizontal advance of one char, in pixels. A newline has no advance.
    fn advance(&self, ch: char) -> u32;

    /// Number of leading chars of `text` whose summed advance stays within
    /// `budget` pixels. Stops at the first newline.
    fn chars_that_fit(&self, text: &str, budget: u32) -> usize {
        let mut width = 0u32;
        let mut count = 0usize;
        for ch in text.chars() {
            if ch == '\n' {
                break;
            }
            width += self.advance(ch);
            if width > budget {
                break;
            }
            count += 1;
        }
        count
    }
}

/// Every char advances by the same amount. Useful for tests and for callers
/// that think in character columns rather than pixels.
#[derive(Debug, Clone, Copy)]
pub struct FixedMeasure(pub u32);

impl GlyphMeasure for FixedMeasure {
    fn advance(&self, ch: char) -> u32 {
        if ch == '\n' { 0 } else { self.0 }
    }
}

/// Terminal-cell measure: a char advances by its Unicode display width times
/// a fixed cell size. Control chars and newlines advance zero.
#[derive(Debug, Clone, Copy)]
pub struct CellMeasure {
    pub cell: u32,
}

impl CellMeasure {
    pub fn new(cell: u32) -> Self {
        Self { cell }
    }
}

impl GlyphMeasure for CellMeasure {
    fn advance(&self, ch: char) -> u32 {
        let cells = UnicodeWidthChar::width(ch).unwrap_or(0) as u32;
        cells * self.cell
    }
}
