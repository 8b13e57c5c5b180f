//! Packet model and wire framing for the sockframe protocol.
//!
//! A [`Packet`] is the unit of exchange: a [`Kind`], a [`Flags`] bitset, a
//! small text [`Headers`] map, and an opaque payload. [`frame::encode`] turns
//! a packet into wire bytes; [`decoder::Decoder`] turns a byte stream
//! (delivered in whatever chunks the transport provides) back into packets.
//!
//! Nothing in this crate performs I/O. The decoder is fed bytes by whatever
//! owns the socket and emits [`decoder::ReceiveEvent`]s for the caller to
//! react to.

mod decoder;
mod errors;
mod flags;
mod frame;
mod headers;
mod kind;
mod packet;

pub use decoder::{Decoder, ReceiveEvent};
pub use errors::{ProtocolError, Result};
pub use flags::Flags;
pub use frame::{decode, encode, DELIMITER};
pub use headers::Headers;
pub use kind::Kind;
pub use packet::Packet;

/// Reserved header keys with protocol-defined meaning.
pub mod reserved_headers {
    /// MIME-like label describing an `Object` payload's contents.
    pub const OBJECT_TYPE: &str = "object-type";
    /// Decoded payload length, redundant with the frame's length prefix.
    pub const CONTENT_LENGTH: &str = "content-length";
    /// Zero-based index of this packet within a multi-part transfer.
    pub const PART_INDEX: &str = "part-index";
    /// Total number of parts in a multi-part transfer.
    pub const PART_TOTAL: &str = "part-total";
    /// Original filename for `File`/`Directory` payloads.
    pub const FILENAME: &str = "filename";
    /// Identifier correlating parts of the same multi-part transfer.
    pub const PART_ID: &str = "part-id";
}
