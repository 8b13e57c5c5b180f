//! Errors produced while building, encoding, or decoding packets.

use thiserror::Error;

/// Convenience alias for results within this crate.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors from packet construction and wire (de)serialization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// An unrecognized packet kind byte was read from the wire.
    #[error("unknown packet kind: {0:#04x}")]
    UnknownKind(u8),

    /// A header key or value contained a forbidden byte (`=` or `\n`).
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// A reserved header was missing or malformed for its packet kind.
    #[error("invalid packet: {0}")]
    InvalidPacket(String),

    /// Header block exceeded the configured cap.
    #[error("header too large: {size} bytes, max {max}")]
    HeaderTooLarge {
        /// Declared header size.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Payload exceeded the configured cap.
    #[error("payload too large: {size} bytes, max {max}")]
    PayloadTooLarge {
        /// Declared payload size.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// The header block was not valid UTF-8.
    #[error("header block is not valid utf-8")]
    InvalidHeaderEncoding,

    /// Delimiter sentinel did not follow the payload where expected.
    #[error("missing delimiter after payload")]
    MissingDelimiter,
}
