//! Book document state.
//!
//! The whole document is one continuous `ropey::Rope` buffer. Pages are a
//! derived partition over it: `bounds` holds `page_count + 1` monotonic char
//! offsets, page `p` owning the chars in `bounds[p]..bounds[p + 1]`. The
//! reflow engine moves content between pages by moving these boundaries; it
//! never copies page text around.
//!
//! Alongside the buffer lives a per-page snapshot of wrapped display lines
//! (`page_count * PAGE_LINES` slots, hard lines keeping their `'\n'`, unused
//! slots empty). The snapshot serves three masters:
//! * the line-level read contract (`line`, `line_count`) used by rendering
//!   and by the serializer's capacity checks,
//! * dirty detection — `refresh_all` rewraps every page and marks a page
//!   dirty exactly when its slots changed, which is what makes dirty
//!   tracking complete over cascade side effects,
//! * the rebuild path for externally supplied page data (`set_line`).
//!
//! All mutation is caller-serialized; multi-page cascades are not atomic and
//! must not interleave.

use std::collections::HashSet;
use std::ops::Range;

use ropey::Rope;
use thiserror::Error;
use tracing::{debug, trace, warn};

use folio_text::{LINE_WIRE_BYTES, PAGE_LINES, PagePartitioner, truncate_bytes};

pub mod dirty;
pub use dirty::{ChangeTracker, HEADER_SLOT};

/// Hard per-page limits. Not configurable; the wire format owns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCapacity {
    pub max_lines: usize,
    pub max_line_bytes: usize,
}

pub const CAPACITY: PageCapacity = PageCapacity {
    max_lines: PAGE_LINES,
    max_line_bytes: LINE_WIRE_BYTES,
};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A caller tried to place content beyond the fixed line slots of a
    /// page. The reflow engine pre-splits content so this never fires from
    /// editing; it guards the external data path.
    #[error("page {page}: line {line} exceeds the {max} line slots of a page")]
    CapacityExceeded {
        page: usize,
        line: usize,
        max: usize,
    },
    #[error("page {page} out of range (document has {count} pages)")]
    PageOutOfRange { page: usize, count: usize },
}

/// Construction parameters, fixed for the document's lifetime.
#[derive(Debug, Clone)]
pub struct BookParams {
    /// Document identity on the wire.
    pub id: u32,
    pub page_count: usize,
    pub title: String,
    pub author: String,
    pub editable: bool,
    /// Peer speaks the legacy fixed-field formats.
    pub legacy_wire: bool,
}

/// Which side of a page boundary an ambiguous char offset resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    /// End of the earlier page.
    Before,
    /// Start of the later page.
    After,
}

pub struct Book {
    id: u32,
    page_count: usize,
    editable: bool,
    legacy_wire: bool,
    title: String,
    author: String,
    text: Rope,
    bounds: Vec<usize>,
    lines: Vec<String>,
    partitioner: Box<dyn PagePartitioner>,
    changes: ChangeTracker,
    fetched: HashSet<usize>,
    active_pair: usize,
}

impl Book {
    pub fn new(params: BookParams, partitioner: Box<dyn PagePartitioner>) -> Self {
        let BookParams {
            id,
            page_count,
            title,
            author,
            editable,
            legacy_wire,
        } = params;
        debug!(target: "store", id, page_count, editable, legacy_wire, "book_open");
        Self {
            id,
            page_count,
            editable,
            legacy_wire,
            title,
            author,
            text: Rope::new(),
            bounds: vec![0; page_count + 1],
            lines: vec![String::new(); page_count * PAGE_LINES],
            partitioner,
            changes: ChangeTracker::new(page_count),
            fetched: HashSet::new(),
            active_pair: 1,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn uses_legacy_wire(&self) -> bool {
        self.legacy_wire
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn set_title(&mut self, title: &str) {
        if self.title != title {
            self.title = title.to_string();
            self.changes.mark(HEADER_SLOT);
        }
    }

    pub fn set_author(&mut self, author: &str) {
        if self.author != author {
            self.author = author.to_string();
            self.changes.mark(HEADER_SLOT);
        }
    }

    pub fn partitioner(&self) -> &dyn PagePartitioner {
        self.partitioner.as_ref()
    }

    pub fn changes(&mut self) -> &mut ChangeTracker {
        &mut self.changes
    }

    pub fn is_dirty(&self, slot: usize) -> bool {
        self.changes.is_marked(slot)
    }

    // ---- leaf-pair geometry -------------------------------------------------

    /// Leaf pair (1-based) showing 0-based page `page`. The first page sits
    /// alone on the right leaf of pair 1.
    pub fn leaf_pair(page: usize) -> usize {
        (page + 3) / 2
    }

    pub fn max_pair(&self) -> usize {
        (self.page_count >> 1) + 1
    }

    pub fn active_pair(&self) -> usize {
        self.active_pair
    }

    /// Clamp into `1..=max_pair` and make it current. Returns the pair
    /// actually shown; crossing past either cover is a clamp, not an error.
    pub fn turn_to(&mut self, pair: usize) -> usize {
        let pair = pair.clamp(1, self.max_pair());
        if pair != self.active_pair {
            debug!(target: "store", from = self.active_pair, to = pair, "page_turn");
        }
        self.active_pair = pair;
        pair
    }

    // ---- partition geometry -------------------------------------------------

    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    pub fn page_start(&self, page: usize) -> usize {
        self.bounds[page]
    }

    pub fn page_range(&self, page: usize) -> Range<usize> {
        self.bounds[page]..self.bounds[page + 1]
    }

    pub fn page_len(&self, page: usize) -> usize {
        self.bounds[page + 1] - self.bounds[page]
    }

    pub fn page_text(&self, page: usize) -> String {
        let r = self.page_range(page);
        self.text.slice(r.start..r.end).to_string()
    }

    pub fn doc_text(&self) -> String {
        self.text.to_string()
    }

    /// Resolve a global char offset to `(page, offset_within_page)`. Offsets
    /// that sit exactly on a boundary belong to either side; `bias` picks.
    pub fn locate(&self, global: usize, bias: Bias) -> (usize, usize) {
        let global = global.min(self.len_chars());
        match bias {
            Bias::Before => {
                for p in 0..self.page_count {
                    if self.bounds[p + 1] >= global {
                        return (p, global - self.bounds[p]);
                    }
                }
                (self.page_count - 1, self.page_len(self.page_count - 1))
            }
            Bias::After => {
                for p in (0..self.page_count).rev() {
                    if self.bounds[p] <= global {
                        return (p, global - self.bounds[p]);
                    }
                }
                (0, 0)
            }
        }
    }

    // ---- buffer mutation primitives ----------------------------------------
    //
    // These keep `bounds` consistent with the rope but do not rewrap or mark
    // dirty; the reflow engine calls `refresh_all` once its cascades settle.

    /// Insert text inside page `page` at a char offset within it. The
    /// inserted chars belong to that page.
    pub fn insert_in_page(&mut self, page: usize, offset: usize, text: &str) {
        debug_assert!(offset <= self.page_len(page));
        let at = self.bounds[page] + offset;
        self.text.insert(at, text);
        let n = text.chars().count();
        for b in &mut self.bounds[page + 1..] {
            *b += n;
        }
        trace!(target: "store", page, offset, chars = n, "insert");
    }

    /// Remove a global char range, shrinking whichever pages it overlaps.
    pub fn delete_chars(&mut self, range: Range<usize>) {
        let start = range.start.min(self.len_chars());
        let end = range.end.min(self.len_chars());
        if start >= end {
            return;
        }
        self.text.remove(start..end);
        let removed = end - start;
        for b in &mut self.bounds {
            if *b > start {
                *b = if *b >= end { *b - removed } else { start };
            }
        }
        trace!(target: "store", start, chars = removed, "delete");
    }

    /// Move the boundary between pages `k - 1` and `k` to a new absolute
    /// char offset. Content between old and new position changes owner; the
    /// buffer itself is untouched.
    pub fn move_boundary(&mut self, k: usize, new_abs: usize) {
        debug_assert!((1..self.page_count).contains(&k));
        debug_assert!(self.bounds[k - 1] <= new_abs && new_abs <= self.bounds[k + 1]);
        self.bounds[k] = new_abs;
    }

    // ---- line-slot contract -------------------------------------------------

    /// Raw line slot: content plus trailing `'\n'` for hard lines; empty for
    /// unused slots.
    pub fn line(&self, page: usize, line: usize) -> &str {
        self.lines
            .get(page * PAGE_LINES + line)
            .map_or("", String::as_str)
    }

    /// Line content with any trailing newline stripped.
    pub fn line_text(&self, page: usize, line: usize) -> &str {
        let raw = self.line(page, line);
        raw.strip_suffix('\n').unwrap_or(raw)
    }

    /// Number of used line slots on a page.
    pub fn line_count(&self, page: usize) -> usize {
        let base = page * PAGE_LINES;
        self.lines[base..base + PAGE_LINES]
            .iter()
            .filter(|s| !s.is_empty())
            .count()
    }

    /// Place externally supplied line data (one wire line, newline-free)
    /// into a slot and rebuild the buffer around it. Blank lines must still
    /// be set (as empty text) so they materialize as line slots.
    ///
    /// Does not mark the page dirty: the peer already has this content.
    pub fn set_line(&mut self, page: usize, line: usize, text: &str) -> Result<(), StoreError> {
        if page >= self.page_count {
            return Err(StoreError::PageOutOfRange {
                page,
                count: self.page_count,
            });
        }
        if line >= PAGE_LINES {
            return Err(StoreError::CapacityExceeded {
                page,
                line,
                max: PAGE_LINES,
            });
        }
        let mut content: String = text.chars().filter(|c| *c != '\n').collect();
        if content.len() > LINE_WIRE_BYTES {
            let kept = truncate_bytes(&content, LINE_WIRE_BYTES).len();
            warn!(
                target: "store",
                page,
                line,
                lost_bytes = content.len() - kept,
                "line_truncated"
            );
            content.truncate(kept);
        }
        // Lines that do not fill the width (blank ones included) are hard
        // terminated, or rebuilding would merge them with the next line.
        if content.is_empty() || self.partitioner.line_has_room(&content) {
            content.push('\n');
        }
        self.lines[page * PAGE_LINES + line] = content;
        self.rebuild_from_lines();
        Ok(())
    }

    fn rebuild_from_lines(&mut self) {
        let mut text = String::new();
        let mut at = 0usize;
        for p in 0..self.page_count {
            self.bounds[p] = at;
            let base = p * PAGE_LINES;
            for slot in &self.lines[base..base + PAGE_LINES] {
                at += slot.chars().count();
                text.push_str(slot);
            }
        }
        self.bounds[self.page_count] = at;
        self.text = Rope::from_str(&text);
    }

    // ---- fetched-page tracking (non-editable documents) --------------------

    pub fn mark_fetched(&mut self, page: usize) {
        self.fetched.insert(page);
    }

    pub fn is_fetched(&self, page: usize) -> bool {
        self.editable || self.fetched.contains(&page)
    }

    // ---- rewrap + dirty detection ------------------------------------------

    /// Rewrap every page, refresh the line snapshot and mark pages whose
    /// lines changed. Called once per applied edit, after cascades settle.
    pub fn refresh_all(&mut self) {
        debug_assert!(self.partition_ok());
        for p in 0..self.page_count {
            self.refresh_page(p);
        }
    }

    fn refresh_page(&mut self, page: usize) {
        let text = self.page_text(page);
        let spans = self.partitioner.partition(&text);
        if spans.len() > PAGE_LINES {
            // Only reachable through external data; editing pre-splits.
            warn!(target: "store", page, lines = spans.len(), "page_over_capacity");
        }
        let mut changed = false;
        for i in 0..PAGE_LINES {
            let slot = match spans.get(i) {
                Some(s) => {
                    let mut owned = char_slice(&text, s.start, s.end).to_string();
                    if s.hard {
                        owned.push('\n');
                    }
                    owned
                }
                None => String::new(),
            };
            let idx = page * PAGE_LINES + i;
            if self.lines[idx] != slot {
                self.lines[idx] = slot;
                changed = true;
            }
        }
        if changed {
            self.changes.mark(page + 1);
        }
    }

    fn partition_ok(&self) -> bool {
        self.bounds[0] == 0
            && self.bounds[self.page_count] == self.len_chars()
            && self.bounds.windows(2).all(|w| w[0] <= w[1])
    }
}

/// Slice a string by char offsets.
fn char_slice(s: &str, start: usize, end: usize) -> &str {
    let mut iter = s.char_indices();
    let a = iter.nth(start).map_or(s.len(), |(i, _)| i);
    let b = if end > start {
        s.char_indices()
            .nth(end)
            .map_or(s.len(), |(i, _)| i)
    } else {
        a
    };
    &s[a..b]
}
