//! Page partitioner: split a page's text run into display lines.
//!
//! A line ends either at an explicit `'\n'` (a *hard* break; the newline
//! belongs to the line that it terminates) or where the next char would push
//! the accumulated advance past the width budget (a *soft* break; the char
//! starts the next line). A trailing `'\n'` closes its line without opening
//! an empty one — typing after it is what creates the next line.
//!
//! Spans are char offsets, not byte offsets: the document buffer, the caret
//! and the wire format all count chars.

use crate::measure::GlyphMeasure;

/// One display line within a page's text, as char offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    /// First char of the line content.
    pub start: usize,
    /// One past the last content char (the terminating newline, if any, is
    /// not content).
    pub end: usize,
    /// Terminated by an explicit newline rather than by the width budget.
    pub hard: bool,
}

impl LineSpan {
    /// Chars consumed through this line, including its newline when hard.
    pub fn consumed_end(&self) -> usize {
        self.end + usize::from(self.hard)
    }
}

/// Splits one page's text into display lines. The store and the reflow
/// engine only ever talk to this trait; the width-driven implementation
/// below is the production one.
pub trait PagePartitioner {
    fn partition(&self, text: &str) -> Vec<LineSpan>;

    fn line_count(&self, text: &str) -> usize {
        self.partition(text).len()
    }

    /// Whether another char could still fit on a line holding `line` (no
    /// newlines). Lines with room must be hard-terminated when the document
    /// is rebuilt from externally supplied line data, or the rebuild would
    /// merge them with the following line.
    fn line_has_room(&self, line: &str) -> bool;
}

/// Width-budget partitioner over a [`GlyphMeasure`].
#[derive(Debug, Clone, Copy)]
pub struct WidthPartitioner<M> {
    pub measure: M,
    pub max_width: u32,
}

impl<M: GlyphMeasure> WidthPartitioner<M> {
    pub fn new(measure: M, max_width: u32) -> Self {
        Self { measure, max_width }
    }
}

impl<M: GlyphMeasure> PagePartitioner for WidthPartitioner<M> {
    fn partition(&self, text: &str) -> Vec<LineSpan> {
        let mut spans = Vec::new();
        let mut start = 0usize;
        let mut width = 0u32;
        let mut idx = 0usize;
        for ch in text.chars() {
            if ch == '\n' {
                spans.push(LineSpan {
                    start,
                    end: idx,
                    hard: true,
                });
                start = idx + 1;
                width = 0;
            } else {
                let adv = self.measure.advance(ch);
                // A single char wider than the whole budget still occupies a
                // line by itself rather than looping forever.
                if self.max_width > 0 && width + adv > self.max_width && idx > start {
                    spans.push(LineSpan {
                        start,
                        end: idx,
                        hard: false,
                    });
                    start = idx;
                    width = adv;
                } else {
                    width += adv;
                }
            }
            idx += 1;
        }
        if idx > start {
            spans.push(LineSpan {
                start,
                end: idx,
                hard: false,
            });
        }
        spans
    }

    fn line_has_room(&self, line: &str) -> bool {
        if self.max_width == 0 {
            return true;
        }
        let width: u32 = line.chars().map(|c| self.measure.advance(c)).sum();
        width + self.measure.advance(' ') <= self.max_width
    }
}

/// Char offset at which display line `line` starts; `total_chars` when the
/// text has fewer lines. This is the forward-cascade split point.
pub fn line_start(spans: &[LineSpan], line: usize, total_chars: usize) -> usize {
    spans.get(line).map_or(total_chars, |s| s.start)
}

/// Chars consumed by the first `n` display lines, trailing newlines
/// included. This is the backfill grab amount.
pub fn consumed_by_lines(spans: &[LineSpan], n: usize) -> usize {
    if n == 0 || spans.is_empty() {
        return 0;
    }
    let last = n.min(spans.len()) - 1;
    spans[last].consumed_end()
}
