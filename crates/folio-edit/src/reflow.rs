//! Cascade algorithms: the content-moving half of edit application.
//!
//! Forward cascade: a page wrapping to more than its line capacity donates
//! everything from the start of the first over-capacity line to the head of
//! the next page, repeating until the remainder fits or the final page drops
//! it. In the single-buffer model the donation is a boundary move, not a
//! copy.
//!
//! Backfill (backward cascade): a deletion that frees line slots on a page
//! pulls content forward page by page. Each receiving page is first padded
//! with trailing newlines up to its own prior line count minus the grab, so
//! its line count is preserved; each donor then loses its first `grab`
//! wrapped lines to the page before it. The chain walks to the last page and
//! the caret keeps its logical position at the deletion point.

use folio_store::{Bias, Book};
use folio_text::{PAGE_LINES, wrap};
use tracing::{trace, warn};

use crate::{Caret, Crossing, Selection, settle_marker};

/// Insert at the caret, cascade overflow forward, land the caret after the
/// inserted run. Returns the chars dropped past the final page.
pub(crate) fn insert_text(book: &mut Book, caret: &mut Caret, text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    let g = caret.global(book);
    book.insert_in_page(caret.page, caret.offset, text);
    let target = g + text.chars().count();
    let (first_split, dropped) = forward_cascade(book, caret.page);
    let target = target.min(book.len_chars());
    // A caret at or past the split point rides the content onto the next
    // page; otherwise a boundary tie means "end of this page".
    let bias = match first_split {
        Some(split) if target >= split => Bias::After,
        _ => Bias::Before,
    };
    let (page, offset) = book.locate(target, bias);
    caret.page = page;
    caret.offset = offset;
    settle_marker(book, caret);
    trace!(
        target: "reflow",
        op = "insert",
        chars = text.chars().count(),
        page,
        offset,
        dropped,
        "applied"
    );
    dropped
}

/// Push overflow forward from `start` until every page fits. Returns the
/// absolute offset of the first boundary moved (if any) and the chars
/// dropped at the final page.
pub(crate) fn forward_cascade(book: &mut Book, start: usize) -> (Option<usize>, usize) {
    let mut first_split = None;
    let mut dropped = 0usize;
    let last = book.page_count() - 1;
    for page in start..book.page_count() {
        let text = book.page_text(page);
        let spans = book.partitioner().partition(&text);
        if spans.len() <= PAGE_LINES {
            break;
        }
        let split = book.page_start(page) + wrap::line_start(&spans, PAGE_LINES, book.page_len(page));
        if page == last {
            let end = book.page_range(page).end;
            dropped = end - split;
            warn!(
                target: "reflow",
                page,
                dropped_chars = dropped,
                "final_page_overflow_dropped"
            );
            book.delete_chars(split..end);
        } else {
            trace!(target: "reflow", page, split, "overflow_pushed");
            book.move_boundary(page + 1, split);
            first_split.get_or_insert(split);
        }
    }
    (first_split, dropped)
}

/// Delete the char before the caret. At offset 0 with an armed `Backward`
/// marker this merges across the boundary: the previous page's trailing char
/// goes, freed line slots refill from the pages behind, and the caret lands
/// at the deletion point on the earlier page with `Forward` armed.
pub(crate) fn backspace(book: &mut Book, caret: &mut Caret) {
    if caret.offset == 0 {
        if caret.marker == Crossing::Backward && caret.page > 0 {
            let g = caret.global(book);
            if g == 0 {
                // Every earlier page is empty; pure crossing.
                caret.page -= 1;
                caret.offset = book.page_len(caret.page);
            } else {
                delete_with_backfill(book, g - 1);
                let (page, offset) = book.locate(g - 1, Bias::Before);
                caret.page = page;
                caret.offset = offset;
            }
            caret.marker = Crossing::Forward;
        } else if caret.page > 0 {
            caret.marker = Crossing::Backward;
        }
        return;
    }
    let g = caret.global(book);
    delete_with_backfill(book, g - 1);
    caret.offset -= 1;
    settle_marker(book, caret);
}

/// Delete the char at the caret. At the page end with an armed `Forward`
/// marker this merges across the boundary: the following page's leading char
/// goes and its freed slots refill from behind it. The caret stays put with
/// `Backward` armed.
pub(crate) fn delete_forward(book: &mut Book, caret: &mut Caret) {
    let g = caret.global(book);
    if caret.offset >= book.page_len(caret.page) {
        if caret.marker == Crossing::Forward
            && caret.page + 1 < book.page_count()
            && g < book.len_chars()
        {
            delete_with_backfill(book, g);
            caret.marker = Crossing::Backward;
        } else if caret.page + 1 < book.page_count() {
            caret.marker = Crossing::Forward;
        }
        return;
    }
    delete_with_backfill(book, g);
    settle_marker(book, caret);
}

/// Delete a selection. The range is clamped to the caret's page; the caret
/// lands at the start of the removed run.
pub(crate) fn delete_selection(book: &mut Book, caret: &mut Caret, sel: Selection) {
    let (start, end) = sel.normalized();
    let range = book.page_range(caret.page);
    let start = start.clamp(range.start, range.end);
    let end = end.clamp(range.start, range.end);
    if start >= end {
        return;
    }
    let prior = book.line_count(caret.page);
    book.delete_chars(start..end);
    let now = book.partitioner().line_count(&book.page_text(caret.page));
    backfill(book, caret.page, prior.saturating_sub(now));
    caret.offset = start - book.page_start(caret.page);
    settle_marker(book, caret);
}

/// Remove one char at a global offset, then refill the owning page's freed
/// line slots from the pages behind it.
fn delete_with_backfill(book: &mut Book, at: usize) {
    let (owner, _) = book.locate(at, Bias::After);
    let prior = book.line_count(owner);
    book.delete_chars(at..at + 1);
    let now = book.partitioner().line_count(&book.page_text(owner));
    let grab = prior.saturating_sub(now);
    trace!(target: "reflow", op = "delete", page = owner, grab, "applied");
    backfill(book, owner, grab);
}

/// The backward-cascade chain. `first` lost `grab` line slots; every later
/// page in turn donates its first `grab` wrapped lines to the page before
/// it, with newline padding keeping each receiver at its prior line count.
fn backfill(book: &mut Book, first: usize, grab: usize) {
    if grab == 0 {
        return;
    }
    for from in first + 1..book.page_count() {
        let into = from - 1;
        let into_now = book.partitioner().line_count(&book.page_text(into));
        let target = book.line_count(into);
        // Never pull a receiver past its prior line count.
        let wanted = grab.min(target.saturating_sub(into_now));
        if wanted == 0 {
            break;
        }
        let from_text = book.page_text(from);
        let from_spans = book.partitioner().partition(&from_text);
        let take = wrap::consumed_by_lines(&from_spans, wanted);
        if take == 0 {
            continue;
        }
        let pad = target.saturating_sub(wanted).saturating_sub(into_now);
        if pad > 0 {
            book.insert_in_page(into, book.page_len(into), &"\n".repeat(pad));
        }
        let new_abs = book.page_start(from) + take;
        book.move_boundary(from, new_abs);
        trace!(target: "reflow", into, from, take, pad, "backfill_pull");
    }
}
