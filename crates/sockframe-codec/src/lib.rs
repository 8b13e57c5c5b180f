//! Compression and symmetric-cipher primitives used by the message pipeline.
//!
//! Every function here is a stateless, pure byte transform. None of them
//! know about packets, frames, or connections — that belongs to
//! `sockframe-proto` and `sockframe-core`. Keeping the transforms here
//! testable in isolation (no I/O, no async) mirrors how Lockframe's
//! sender-key crypto stays independent of its transport layer.

mod cipher;
mod compression;
mod error;
mod preshared;

pub use cipher::{decrypt, derive_key, encrypt, CipherKey, NONCE_LEN};
pub use compression::{compress, compress_tree, decompress, extract};
pub use error::CodecError;
pub use preshared::{digest, verify, Digest, DIGEST_LEN};
