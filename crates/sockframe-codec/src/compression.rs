//! DEFLATE compression for payload bytes and directory archives.

use std::{
    io::{Read, Write},
    path::Path,
};

use flate2::{read::DeflateDecoder, write::DeflateEncoder, Compression};

use crate::error::CodecError;

/// Compress arbitrary bytes with DEFLATE.
///
/// # Errors
///
/// `CodecError::CompressionFailed` on writer failure (out-of-memory class
/// errors only — DEFLATE itself cannot reject valid input).
pub fn compress(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(|e| CodecError::CompressionFailed(e.to_string()))?;
    encoder.finish().map_err(|e| CodecError::CompressionFailed(e.to_string()))
}

/// Decompress bytes produced by [`compress`].
///
/// # Errors
///
/// `CodecError::DecompressionFailed` if the stream is truncated or not a
/// valid DEFLATE stream.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut decoder = DeflateDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).map_err(|e| CodecError::DecompressionFailed(e.to_string()))?;
    Ok(out)
}

/// Archive a directory tree into a single DEFLATE-compressed tar stream.
///
/// # Errors
///
/// `CodecError::ArchiveFailed` if the directory cannot be walked or any
/// entry cannot be read.
pub fn compress_tree(root: &Path) -> Result<Vec<u8>, CodecError> {
    let encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder
        .append_dir_all(".", root)
        .map_err(|e| CodecError::ArchiveFailed(e.to_string()))?;
    let encoder = builder.into_inner().map_err(|e| CodecError::ArchiveFailed(e.to_string()))?;
    encoder.finish().map_err(|e| CodecError::ArchiveFailed(e.to_string()))
}

/// Extract a stream produced by [`compress_tree`] into `dest`.
///
/// # Errors
///
/// `CodecError::ExtractionFailed` if the stream is not a valid
/// DEFLATE-compressed tar archive, or if unpacking fails.
pub fn extract(data: &[u8], dest: &Path) -> Result<(), CodecError> {
    let decoder = DeflateDecoder::new(data);
    let mut archive = tar::Archive::new(decoder);
    archive.unpack(dest).map_err(|e| CodecError::ExtractionFailed(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn round_trip_empty() {
        let compressed = compress(b"").unwrap();
        assert_eq!(decompress(&compressed).unwrap(), b"");
    }

    #[test]
    fn tree_round_trip() {
        let src = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("a.txt"), b"hello").unwrap();
        std::fs::create_dir(src.path().join("sub")).unwrap();
        std::fs::write(src.path().join("sub/b.txt"), b"world").unwrap();

        let archive = compress_tree(src.path()).unwrap();

        let dest = tempfile::tempdir().unwrap();
        extract(&archive, dest.path()).unwrap();

        assert_eq!(std::fs::read(dest.path().join("a.txt")).unwrap(), b"hello");
        assert_eq!(std::fs::read(dest.path().join("sub/b.txt")).unwrap(), b"world");
    }

    proptest! {
        #[test]
        fn round_trip_arbitrary(data in prop::collection::vec(any::<u8>(), 0..8192)) {
            let compressed = compress(&data).unwrap();
            let restored = decompress(&compressed).unwrap();
            prop_assert_eq!(restored, data);
        }
    }
}
