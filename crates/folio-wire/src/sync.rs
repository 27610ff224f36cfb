//! Dirty pages to wire records.
//!
//! Flushing consumes the dirty set. Each dirty page's *current* text is
//! split on line boundaries at serialization time; a split past the line
//! capacity redistributes the excess into the next page's record (marking it
//! dirty too), the same forward policy the reflow engine applies at edit
//! time. Excess on the final page is truncated and logged, and every line is
//! independently clamped to the wire byte limit. Nothing here raises to the
//! caller; loss is absorbed and logged.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use folio_store::{Book, HEADER_SLOT};
use folio_text::{LINE_WIRE_BYTES, PAGE_LINES, truncate_bytes};

use crate::records::{
    WireRecord, header_changed, header_changed_legacy, page_data, page_data_request,
};

pub struct SyncSerializer;

impl SyncSerializer {
    /// Emit records for everything dirty, clearing the dirty set. An empty
    /// dirty set yields no records, so back-to-back flushes are idempotent.
    pub fn flush(book: &mut Book) -> Vec<WireRecord> {
        let dirty = book.changes().take();
        if dirty.is_empty() {
            return Vec::new();
        }
        let mut records = Vec::new();
        let mut queue: BTreeSet<usize> = BTreeSet::new();
        for slot in dirty {
            if slot == HEADER_SLOT {
                records.push(if book.uses_legacy_wire() {
                    header_changed_legacy(book.id(), book.title(), book.author())
                } else {
                    header_changed(book.id(), book.title(), book.author())
                });
            } else {
                queue.insert(slot - 1);
            }
        }

        let mut carried: HashMap<usize, Vec<String>> = HashMap::new();
        let mut pages: Vec<(u16, Vec<String>)> = Vec::new();
        while let Some(page) = queue.pop_first() {
            let mut lines = match carried.remove(&page) {
                Some(l) => l,
                None => split_lines(book, page),
            };
            if lines.len() > PAGE_LINES {
                if page + 1 < book.page_count() {
                    let excess = lines.split_off(PAGE_LINES);
                    warn!(
                        target: "wire",
                        page,
                        lines = excess.len(),
                        "page_overflow_redistributed"
                    );
                    let mut next = carried
                        .remove(&(page + 1))
                        .unwrap_or_else(|| split_lines(book, page + 1));
                    let mut merged = excess;
                    merged.append(&mut next);
                    carried.insert(page + 1, merged);
                    queue.insert(page + 1);
                } else {
                    warn!(
                        target: "wire",
                        page,
                        lost_lines = lines.len() - PAGE_LINES,
                        "final_page_overflow_truncated"
                    );
                    lines.truncate(PAGE_LINES);
                }
            }
            for (i, line) in lines.iter_mut().enumerate() {
                if line.len() > LINE_WIRE_BYTES {
                    let kept = truncate_bytes(line, LINE_WIRE_BYTES).len();
                    warn!(
                        target: "wire",
                        page,
                        line = i,
                        lost_bytes = line.len() - kept,
                        "line_truncated"
                    );
                    line.truncate(kept);
                }
            }
            pages.push(((page + 1) as u16, lines));
        }

        if !pages.is_empty() {
            debug!(target: "wire", count = pages.len(), "page_data_flush");
            records.push(page_data(
                book.id(),
                &pages,
                book.uses_legacy_wire(),
            ));
        }
        records
    }

    /// Page-turn policy: editable documents flush their pending changes;
    /// read-only documents request any not-yet-fetched page of the newly
    /// visible leaf pair.
    pub fn on_page_turn(book: &mut Book, pair: usize) -> Vec<WireRecord> {
        let pair = book.turn_to(pair);
        if book.is_editable() {
            return Self::flush(book);
        }
        let left = (pair - 1) * 2; // 1-based wire page numbers
        let right = left + 1;
        let mut out = Vec::new();
        if left > 0 && !book.is_fetched(left - 1) {
            out.push(page_data_request(book.id(), left as u16));
        }
        if right < book.max_pair() * 2 && !book.is_fetched(right - 1) {
            out.push(page_data_request(book.id(), right as u16));
        }
        out
    }

    /// Closing the document turns back to the first pair, flushing whatever
    /// is still pending.
    pub fn close(book: &mut Book) -> Vec<WireRecord> {
        Self::on_page_turn(book, 1)
    }
}

/// Current line texts of a page, newline-free, straight from the
/// partitioner rather than the snapshot.
fn split_lines(book: &Book, page: usize) -> Vec<String> {
    let text = book.page_text(page);
    let spans = book.partitioner().partition(&text);
    spans
        .iter()
        .map(|s| {
            text.chars()
                .skip(s.start)
                .take(s.end - s.start)
                .collect::<String>()
        })
        .collect()
}
