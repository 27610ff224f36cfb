//! Deletions that free line slots pull content back from later pages.

mod common;

use common::{book_with, live_lines, press, type_str};
use folio_edit::{Caret, Crossing, EditCommand};
use pretty_assertions::assert_eq;

#[test]
fn boundary_backspace_merges_next_pages_first_line_back() {
    // Page 0: seven full hard lines plus one blank line (8 slots used).
    let p0 = format!("{}\n", "aaaa\n".repeat(7));
    let mut b = book_with(3, &[&p0, "bbbb\nccc\n", ""]);
    b.turn_to(2);
    let mut caret = Caret::place(&b, 1, 0);
    assert_eq!(caret.marker, Crossing::Backward);

    let applied = press(&mut b, &mut caret, EditCommand::Backspace);

    // The blank line's newline went away; page 1's first line refilled the
    // freed slot.
    assert_eq!(b.page_text(0), format!("{}bbbb\n", "aaaa\n".repeat(7)));
    assert_eq!(b.page_text(1), "ccc\n");
    assert_eq!(b.page_text(2), "");
    assert_eq!(live_lines(&b, 0), 8);
    // Caret at the deletion point: the end of page 0 as it was, now ahead
    // of the pulled content. Marker arms forward.
    assert_eq!((caret.page, caret.offset), (0, 35));
    assert_eq!(caret.marker, Crossing::Forward);
    assert_eq!(b.changes().take(), vec![1, 2]);
    // Crossing back off page 1 flips the active pair back to 1.
    assert_eq!(applied.page_turn, Some(1));
}

#[test]
fn boundary_backspace_without_armed_marker_only_arms() {
    let mut b = book_with(2, &["aaaa\n", "bbbb\n"]);
    let mut caret = Caret {
        page: 1,
        offset: 0,
        marker: Crossing::Neutral,
    };

    press(&mut b, &mut caret, EditCommand::Backspace);

    assert_eq!(b.page_text(0), "aaaa\n");
    assert_eq!(b.page_text(1), "bbbb\n");
    assert_eq!((caret.page, caret.offset), (1, 0));
    assert_eq!(caret.marker, Crossing::Backward);
    assert!(b.changes().is_empty());
}

#[test]
fn backspace_on_first_page_start_is_clamped() {
    let mut b = book_with(2, &["aa", ""]);
    let mut caret = Caret::place(&b, 0, 0);

    press(&mut b, &mut caret, EditCommand::Backspace);

    assert_eq!(b.page_text(0), "aa");
    assert_eq!((caret.page, caret.offset), (0, 0));
}

#[test]
fn cascade_round_trip_restores_pages_byte_for_byte() {
    // Insert a run that forces a forward cascade, delete exactly that run
    // from the same caret position: every page's content comes back.
    let p0 = "aaaa\n".repeat(8);
    let p1 = "bbbb\nc\n";
    let mut b = book_with(2, &[&p0, p1]);
    let mut caret = Caret::place(&b, 0, 0);

    type_str(&mut b, &mut caret, "xxxx\n");
    // The run displaced one full line onto page 1.
    assert_eq!(b.page_text(0), format!("xxxx\n{}", "aaaa\n".repeat(7)));
    assert_eq!(b.page_text(1), format!("aaaa\n{p1}"));
    assert_eq!((caret.page, caret.offset), (0, 5));

    for _ in 0..5 {
        press(&mut b, &mut caret, EditCommand::Backspace);
    }

    assert_eq!(b.page_text(0), p0);
    assert_eq!(b.page_text(1), p1);
    assert_eq!((caret.page, caret.offset), (0, 0));
}

#[test]
fn delete_at_page_end_merges_forward() {
    let mut b = book_with(2, &["aaaa\naaaa\n", "\nbb\n"]);
    let mut caret = Caret::place(&b, 0, 10);
    assert_eq!(caret.marker, Crossing::Forward);

    press(&mut b, &mut caret, EditCommand::Delete);

    // Page 1 lost its leading blank line; the caret did not move and the
    // marker flipped backward, so this keystroke's transition is spent.
    assert_eq!(b.page_text(0), "aaaa\naaaa\n");
    assert_eq!(b.page_text(1), "bb\n");
    assert_eq!((caret.page, caret.offset), (0, 10));
    assert_eq!(caret.marker, Crossing::Backward);
    assert_eq!(b.changes().take(), vec![2]);
}

#[test]
fn midpage_line_join_pulls_from_later_pages() {
    // Deleting the newline that separates two short lines frees a slot;
    // the following page's head line flows back to fill it.
    let p0 = "aaaa\n".repeat(8);
    let mut b = book_with(3, &[&p0, "zz\nyy\n", ""]);
    // Caret right after the last newline of page 0's seventh line.
    let mut caret = Caret::place(&b, 0, 35);

    press(&mut b, &mut caret, EditCommand::Backspace);

    // "aaaa" + "aaaa" joined into one wrapped region of 8 chars (two
    // wrapped lines of five and three), keeping the count at eight; no
    // pull happens because no slot was actually freed.
    assert_eq!(live_lines(&b, 0), 8);
    assert_eq!(b.page_text(1), "zz\nyy\n");

    // Deleting four more chars erases the joined region's surplus; a slot
    // frees and "zz" comes back.
    for _ in 0..4 {
        press(&mut b, &mut caret, EditCommand::Backspace);
    }
    assert_eq!(b.page_text(0), format!("{}zz\n", "aaaa\n".repeat(7)));
    assert_eq!(b.page_text(1), "yy\n");
}
