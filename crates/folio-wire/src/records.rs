//! Wire record builders.
//!
//! Four record shapes exist: header-changed in the current and the legacy
//! framing, page-data, and page-data-request. Page numbering on the wire is
//! 1-based; page 0 is the header, carried by its own record type.

use tracing::warn;

use crate::writer::WireWriter;

pub const HEADER_CHANGED: u8 = 0xD4;
pub const HEADER_CHANGED_LEGACY: u8 = 0x93;
/// Shared by page data and page requests; a request carries 0xFFFF where
/// data would carry a line count.
pub const PAGE_DATA: u8 = 0x66;

pub const LEGACY_TITLE_CHARS: usize = 47;
pub const LEGACY_AUTHOR_CHARS: usize = 29;
pub const LEGACY_TITLE_FIELD: usize = 60;
pub const LEGACY_AUTHOR_FIELD: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKind {
    Header,
    HeaderLegacy,
    PageData { pages: Vec<u16> },
    PageRequest { page: u16 },
}

/// One transport-ready message. Delivery is fire-and-forget; the engine
/// never waits for acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRecord {
    pub kind: RecordKind,
    pub bytes: Vec<u8>,
}

pub fn header_changed(id: u32, title: &str, author: &str) -> WireRecord {
    let mut w = WireWriter::variable(HEADER_CHANGED);
    w.write_u32_be(id);
    w.write_u8(0x00);
    w.write_u8(0x00);
    w.write_u16_be(0);
    w.write_u16_be(title.len() as u16);
    w.write_utf8(title);
    w.write_u16_be(author.len() as u16);
    w.write_utf8(author);
    WireRecord {
        kind: RecordKind::Header,
        bytes: w.finish(),
    }
}

pub fn header_changed_legacy(id: u32, title: &str, author: &str) -> WireRecord {
    let title = clamp_chars(id, "title", title, LEGACY_TITLE_CHARS);
    let author = clamp_chars(id, "author", author, LEGACY_AUTHOR_CHARS);
    let mut w = WireWriter::variable(HEADER_CHANGED_LEGACY);
    w.write_u32_be(id);
    w.write_u8(0x00);
    w.write_u8(0x01);
    w.write_u16_be(0);
    w.write_utf8_fixed(&title, LEGACY_TITLE_FIELD);
    w.write_utf8_fixed(&author, LEGACY_AUTHOR_FIELD);
    WireRecord {
        kind: RecordKind::HeaderLegacy,
        bytes: w.finish(),
    }
}

fn clamp_chars(id: u32, field: &str, s: &str, max: usize) -> String {
    let count = s.chars().count();
    if count > max {
        warn!(target: "wire", id, field, lost_chars = count - max, "header_field_truncated");
    }
    s.chars().take(max).collect()
}

/// Page-data record: every entry is `(wire page number, line texts)`. Lines
/// are newline-free; callers enforce the byte limit beforehand.
pub fn page_data(id: u32, pages: &[(u16, Vec<String>)], legacy: bool) -> WireRecord {
    let mut w = WireWriter::variable(PAGE_DATA);
    w.write_u32_be(id);
    w.write_u16_be(pages.len() as u16);
    for (page, lines) in pages {
        w.write_u16_be(*page);
        w.write_u16_be(lines.len() as u16);
        for line in lines {
            if legacy {
                w.write_ascii_fixed(line, folio_text::LINE_WIRE_BYTES);
            } else {
                w.write_utf8_nul(line);
            }
        }
    }
    w.write_u8(0x00);
    WireRecord {
        kind: RecordKind::PageData {
            pages: pages.iter().map(|(p, _)| *p).collect(),
        },
        bytes: w.finish(),
    }
}

pub fn page_data_request(id: u32, page: u16) -> WireRecord {
    let mut w = WireWriter::variable(PAGE_DATA);
    w.write_u32_be(id);
    w.write_u16_be(0x0001);
    w.write_u16_be(page);
    w.write_u16_be(0xFFFF);
    WireRecord {
        kind: RecordKind::PageRequest { page },
        bytes: w.finish(),
    }
}
