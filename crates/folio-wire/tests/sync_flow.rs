//! Flush, page-turn and close flows over the dirty set.

mod common;

use common::{DOC_ID, book, seeded};
use folio_edit::{Caret, EditCommand, apply};
use folio_store::HEADER_SLOT;
use folio_wire::{RecordKind, SyncSerializer, apply_page_data};
use pretty_assertions::assert_eq;

#[test]
fn flush_emits_header_then_pages_and_is_idempotent() {
    let mut b = seeded(2, &["hi\n", ""]);
    b.set_title("renamed");
    let mut caret = Caret::place(&b, 0, 3);
    apply(&mut b, &mut caret, EditCommand::Insert('x'));

    let records = SyncSerializer::flush(&mut b);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].kind, RecordKind::Header);
    assert_eq!(records[1].kind, RecordKind::PageData { pages: vec![1] });

    // Nothing changed since: the second flush is empty.
    assert!(SyncSerializer::flush(&mut b).is_empty());
    assert!(b.changes().is_empty());
}

#[test]
fn legacy_peer_gets_legacy_header() {
    let mut b = book(2, true, true);
    b.set_title("old format");
    let records = SyncSerializer::flush(&mut b);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, RecordKind::HeaderLegacy);
}

#[test]
fn editable_page_turn_flushes_pending_changes() {
    let mut b = seeded(4, &["words\n", "", "", ""]);
    let mut caret = Caret::place(&b, 0, 0);
    apply(&mut b, &mut caret, EditCommand::Insert('y'));
    assert!(b.is_dirty(1));

    let records = SyncSerializer::on_page_turn(&mut b, 2);
    assert_eq!(records.len(), 1);
    assert_eq!(b.active_pair(), 2);
    assert!(b.changes().is_empty());
}

#[test]
fn readonly_page_turn_requests_unfetched_pages() {
    let mut b = book(8, false, false);

    // Opening spread: only wire page 1 is visible on the right leaf.
    let records = SyncSerializer::on_page_turn(&mut b, 1);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, RecordKind::PageRequest { page: 1 });

    let records = SyncSerializer::on_page_turn(&mut b, 2);
    assert_eq!(
        records.iter().map(|r| r.kind.clone()).collect::<Vec<_>>(),
        vec![
            RecordKind::PageRequest { page: 2 },
            RecordKind::PageRequest { page: 3 },
        ]
    );

    // Once fetched, a revisit asks for nothing.
    b.mark_fetched(1);
    b.mark_fetched(2);
    assert!(SyncSerializer::on_page_turn(&mut b, 2).is_empty());
}

#[test]
fn close_turns_back_to_the_first_pair_and_flushes() {
    let mut b = seeded(4, &["", "", "", ""]);
    b.turn_to(3);
    b.set_author("somebody");
    let records = SyncSerializer::close(&mut b);
    assert_eq!(b.active_pair(), 1);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, RecordKind::Header);
}

#[test]
fn emitted_pages_apply_cleanly_on_a_peer_document() {
    let mut src = seeded(2, &["", ""]);
    let mut caret = Caret::place(&src, 0, 0);
    apply(
        &mut src,
        &mut caret,
        EditCommand::Paste("hi\nthere".into()),
    );
    let records = SyncSerializer::flush(&mut src);
    assert_eq!(records.len(), 1);

    let mut dst = book(2, false, false);
    apply_page_data(&mut dst, &records[0].bytes).unwrap();

    assert_eq!(dst.line_text(0, 0), "hi");
    assert_eq!(dst.line_text(0, 1), "there");
    assert!(dst.is_fetched(0));
    // Peer-applied content is not dirty.
    assert!(dst.changes().is_empty());
    assert!(!dst.is_dirty(HEADER_SLOT));
}

#[test]
fn mismatched_document_id_is_rejected() {
    let mut src = seeded(1, &["x"]);
    src.changes().mark(1);
    let records = SyncSerializer::flush(&mut src);

    let mut other = folio_store::Book::new(
        folio_store::BookParams {
            id: DOC_ID + 1,
            page_count: 1,
            title: String::new(),
            author: String::new(),
            editable: false,
            legacy_wire: false,
        },
        Box::new(folio_text::WidthPartitioner::new(folio_text::FixedMeasure(1), 5)),
    );
    assert!(apply_page_data(&mut other, &records[0].bytes).is_err());
}
