#![allow(dead_code)] // Shared across many integration tests; each test binary uses a subset of helpers.

use folio_edit::{Applied, Caret, EditCommand, apply};
use folio_store::{Book, BookParams};
use folio_text::{FixedMeasure, WidthPartitioner};

/// Five 1-px chars per display line in every test book.
pub const WIDTH: u32 = 5;

pub fn book(pages: usize) -> Book {
    Book::new(
        BookParams {
            id: 0xBEEF,
            page_count: pages,
            title: "a field guide".into(),
            author: "nobody".into(),
            editable: true,
            legacy_wire: false,
        },
        Box::new(WidthPartitioner::new(FixedMeasure(1), WIDTH)),
    )
}

/// Book with fixed page contents, snapshot refreshed and dirty bits cleared,
/// as if the content had already been synchronized.
pub fn book_with(pages: usize, texts: &[&str]) -> Book {
    let mut b = book(pages);
    for (p, t) in texts.iter().enumerate() {
        if !t.is_empty() {
            b.insert_in_page(p, 0, t);
        }
    }
    b.refresh_all();
    b.changes().clear();
    b
}

/// Type a string one keystroke at a time. Returns total dropped chars.
pub fn type_str(b: &mut Book, caret: &mut Caret, s: &str) -> usize {
    s.chars()
        .map(|c| apply(b, caret, EditCommand::Insert(c)).dropped_chars)
        .sum()
}

pub fn press(b: &mut Book, caret: &mut Caret, cmd: EditCommand) -> Applied {
    apply(b, caret, cmd)
}

/// Wrapped line count of a page's current text.
pub fn live_lines(b: &Book, page: usize) -> usize {
    b.partitioner().line_count(&b.page_text(page))
}
