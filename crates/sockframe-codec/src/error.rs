use thiserror::Error;

/// Errors raised by the codec primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Compression failed.
    #[error("compression failed: {0}")]
    CompressionFailed(String),

    /// Decompression failed (corrupt or truncated stream).
    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    /// Archive creation failed.
    #[error("archive failed: {0}")]
    ArchiveFailed(String),

    /// Archive extraction failed.
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    /// Decryption failed: wrong key, truncated ciphertext, or a forged tag.
    #[error("decryption failed")]
    DecryptionFailed,

    /// Ciphertext shorter than the minimum nonce+tag overhead.
    #[error("ciphertext truncated: {len} bytes, need at least {min}")]
    CiphertextTruncated {
        /// Length actually supplied.
        len: usize,
        /// Minimum valid length (nonce + AEAD tag).
        min: usize,
    },
}
