//! Caret navigation within and across pages.
//!
//! Every motion that does not hit an armed boundary is a local, single-page
//! caret move with no reflow involvement. Hitting a page edge arms the
//! marker; the next keystroke in the same direction crosses.

use folio_store::Book;
use folio_text::LineSpan;
use tracing::trace;

use crate::{Caret, Crossing, settle_marker};

/// Which display line the caret sits on, with that line's content range. An
/// index equal to the span count is the virtual empty line after a trailing
/// newline.
pub(crate) struct CaretLine {
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

pub(crate) fn caret_line(spans: &[LineSpan], offset: usize, page_len: usize) -> CaretLine {
    if spans.is_empty() {
        return CaretLine {
            index: 0,
            start: 0,
            end: 0,
        };
    }
    for (i, s) in spans.iter().enumerate() {
        if offset < s.consumed_end() {
            return CaretLine {
                index: i,
                start: s.start,
                end: s.end,
            };
        }
    }
    let last = spans[spans.len() - 1];
    if last.hard {
        CaretLine {
            index: spans.len(),
            start: page_len,
            end: page_len,
        }
    } else {
        CaretLine {
            index: spans.len() - 1,
            start: last.start,
            end: last.end,
        }
    }
}

fn cross_backward(book: &Book, caret: &mut Caret) {
    caret.page -= 1;
    caret.offset = book.page_len(caret.page);
    settle_marker(book, caret);
    trace!(target: "caret", page = caret.page, "crossed_backward");
}

fn cross_forward(book: &Book, caret: &mut Caret) {
    caret.page += 1;
    caret.offset = 0;
    settle_marker(book, caret);
    trace!(target: "caret", page = caret.page, "crossed_forward");
}

pub(crate) fn left(book: &Book, caret: &mut Caret) {
    if caret.offset > 0 {
        caret.offset -= 1;
        settle_marker(book, caret);
    } else if caret.marker == Crossing::Backward && caret.page > 0 {
        cross_backward(book, caret);
    } else if caret.page > 0 {
        caret.marker = Crossing::Backward;
    }
}

pub(crate) fn right(book: &Book, caret: &mut Caret) {
    if caret.offset < book.page_len(caret.page) {
        caret.offset += 1;
        settle_marker(book, caret);
    } else if caret.marker == Crossing::Forward && caret.page + 1 < book.page_count() {
        cross_forward(book, caret);
    } else if caret.page + 1 < book.page_count() {
        caret.marker = Crossing::Forward;
    }
}

pub(crate) fn up(book: &Book, caret: &mut Caret) {
    let text = book.page_text(caret.page);
    let spans = book.partitioner().partition(&text);
    let line = caret_line(&spans, caret.offset, book.page_len(caret.page));
    if line.index == 0 {
        if caret.offset == 0 {
            if caret.marker == Crossing::Backward && caret.page > 0 {
                cross_backward(book, caret);
            } else if caret.page > 0 {
                caret.marker = Crossing::Backward;
            }
        } else {
            caret.offset = 0;
            settle_marker(book, caret);
        }
        return;
    }
    let col = caret.offset - line.start;
    let target = spans[line.index - 1];
    caret.offset = target.start + col.min(target.end - target.start);
    settle_marker(book, caret);
}

pub(crate) fn down(book: &Book, caret: &mut Caret) {
    let page_len = book.page_len(caret.page);
    let text = book.page_text(caret.page);
    let spans = book.partitioner().partition(&text);
    let line = caret_line(&spans, caret.offset, page_len);
    let bottom = if spans.last().is_some_and(|s| s.hard) {
        spans.len()
    } else {
        spans.len().saturating_sub(1)
    };
    if line.index >= bottom {
        if caret.offset >= page_len {
            if caret.marker == Crossing::Forward && caret.page + 1 < book.page_count() {
                cross_forward(book, caret);
            } else if caret.page + 1 < book.page_count() {
                caret.marker = Crossing::Forward;
            }
        } else {
            caret.offset = page_len;
            settle_marker(book, caret);
        }
        return;
    }
    let col = caret.offset - line.start;
    caret.offset = match spans.get(line.index + 1) {
        Some(target) => target.start + col.min(target.end - target.start),
        None => page_len,
    };
    settle_marker(book, caret);
}

pub(crate) fn home(book: &Book, caret: &mut Caret) {
    if caret.offset == 0 {
        if caret.marker == Crossing::Backward && caret.page > 0 {
            cross_backward(book, caret);
        } else if caret.page > 0 {
            caret.marker = Crossing::Backward;
        }
        return;
    }
    let text = book.page_text(caret.page);
    let spans = book.partitioner().partition(&text);
    let line = caret_line(&spans, caret.offset, book.page_len(caret.page));
    caret.offset = line.start;
    settle_marker(book, caret);
}

pub(crate) fn end(book: &Book, caret: &mut Caret) {
    let page_len = book.page_len(caret.page);
    if caret.offset >= page_len {
        if caret.marker == Crossing::Forward && caret.page + 1 < book.page_count() {
            cross_forward(book, caret);
        } else if caret.page + 1 < book.page_count() {
            caret.marker = Crossing::Forward;
        }
        return;
    }
    let text = book.page_text(caret.page);
    let spans = book.partitioner().partition(&text);
    let line = caret_line(&spans, caret.offset, page_len);
    caret.offset = line.end;
    settle_marker(book, caret);
}
