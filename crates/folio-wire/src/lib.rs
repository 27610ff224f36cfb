//! Wire synchronization for book documents: record building and parsing,
//! the dirty-set serializer, and application of peer-sent page data.
//!
//! Everything is synchronous and fire-and-forget: records are byte vectors
//! handed to whatever transport the embedder owns. The only externally
//! visible failure mode on the outgoing path is logged truncation; parsing
//! errors on the incoming path surface as [`WireError`].

use thiserror::Error;

pub mod incoming;
pub mod reader;
pub mod records;
pub mod sync;
pub mod writer;

pub use incoming::apply_page_data;
pub use reader::WireReader;
pub use records::{
    HEADER_CHANGED, HEADER_CHANGED_LEGACY, PAGE_DATA, RecordKind, WireRecord, header_changed,
    header_changed_legacy, page_data, page_data_request,
};
pub use sync::SyncSerializer;
pub use writer::WireWriter;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("unexpected end of packet (wanted {wanted} more bytes, {left} left)")]
    UnexpectedEof { wanted: usize, left: usize },
    #[error("unexpected packet id {id:#04x}")]
    UnexpectedPacket { id: u8 },
    #[error("packet for document {got:#010x} applied to document {expected:#010x}")]
    WrongDocument { expected: u32, got: u32 },
    #[error("page number {page} outside 1..={count}")]
    PageOutOfRange { page: usize, count: usize },
    #[error(transparent)]
    Store(#[from] folio_store::StoreError),
}
