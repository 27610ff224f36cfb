//! Applying a received page-data packet to the document.
//!
//! The peer sends whole pages: 1-based page number, line count, then the
//! lines. Content lands through the store's line slots (blank-filling the
//! rest of each page) and never marks anything dirty — the peer already has
//! it. Fetched pages are recorded so page turns stop re-requesting them.

use tracing::error;

use folio_store::Book;
use folio_text::PAGE_LINES;

use crate::reader::WireReader;
use crate::records::PAGE_DATA;
use crate::WireError;

pub fn apply_page_data(book: &mut Book, packet: &[u8]) -> Result<(), WireError> {
    let mut r = WireReader::new(packet);
    let id = r.read_u8()?;
    if id != PAGE_DATA {
        return Err(WireError::UnexpectedPacket { id });
    }
    let _len = r.read_u16_be()?;
    let serial = r.read_u32_be()?;
    if serial != book.id() {
        return Err(WireError::WrongDocument {
            expected: book.id(),
            got: serial,
        });
    }
    let count = r.read_u16_be()?;
    for _ in 0..count {
        let page_num = r.read_u16_be()? as usize;
        if page_num == 0 || page_num > book.page_count() {
            error!(
                target: "wire",
                page = page_num,
                count = book.page_count(),
                "peer sent a page number beyond the document"
            );
            return Err(WireError::PageOutOfRange {
                page: page_num,
                count: book.page_count(),
            });
        }
        let page = page_num - 1;
        book.mark_fetched(page);
        let line_count = r.read_u16_be()? as usize;
        for line in 0..line_count {
            let text = if book.uses_legacy_wire() {
                r.read_ascii_fixed(folio_text::LINE_WIRE_BYTES)?
            } else {
                r.read_utf8_nul()?
            };
            if line < PAGE_LINES {
                book.set_line(page, line, &text)?;
            } else {
                error!(
                    target: "wire",
                    page = page_num,
                    line,
                    "peer sent more lines than a page holds"
                );
            }
        }
        for line in line_count..PAGE_LINES {
            book.set_line(page, line, "")?;
        }
    }
    Ok(())
}
