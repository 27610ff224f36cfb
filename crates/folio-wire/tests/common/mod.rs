#![allow(dead_code)] // Shared across the wire integration tests.

use folio_store::{Book, BookParams};
use folio_text::{FixedMeasure, WidthPartitioner};

pub const DOC_ID: u32 = 0x00C0FFEE;

pub fn book(pages: usize, editable: bool, legacy_wire: bool) -> Book {
    Book::new(
        BookParams {
            id: DOC_ID,
            page_count: pages,
            title: "tales".into(),
            author: "anon".into(),
            editable,
            legacy_wire,
        },
        Box::new(WidthPartitioner::new(FixedMeasure(1), 5)),
    )
}

/// Editable book with page contents already synchronized (clean).
pub fn seeded(pages: usize, texts: &[&str]) -> Book {
    let mut b = book(pages, true, false);
    for (p, t) in texts.iter().enumerate() {
        if !t.is_empty() {
            b.insert_in_page(p, 0, t);
        }
    }
    b.refresh_all();
    b.changes().clear();
    b
}
