//! The [`Packet`] type: a kind, flags, headers, payload, and optional
//! preshared-key digest.

use crate::{
    errors::{ProtocolError, Result},
    flags::Flags,
    headers::Headers,
    kind::Kind,
    reserved_headers,
};

/// A single protocol message, independent of its wire representation.
///
/// Invariants (checked by the constructors, not re-checked by callers):
/// `encrypted` implies `preshared_hash` is `Some`; `content-length` header,
/// if present, equals `payload.len()`; `partial` implies `part-index` <
/// `part-total`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    kind: Kind,
    flags: Flags,
    headers: Headers,
    payload: Vec<u8>,
    preshared_hash: Option<[u8; 32]>,
}

impl Packet {
    /// Build a packet directly, validating protocol invariants.
    ///
    /// # Errors
    ///
    /// `ProtocolError::InvalidPacket` if an invariant is violated.
    pub fn new(
        kind: Kind,
        mut flags: Flags,
        mut headers: Headers,
        payload: Vec<u8>,
        preshared_hash: Option<[u8; 32]>,
    ) -> Result<Self> {
        if flags.encrypted && preshared_hash.is_none() {
            return Err(ProtocolError::InvalidPacket(
                "encrypted packet requires a preshared-key hash".to_string(),
            ));
        }
        flags.has_preshared_key = preshared_hash.is_some();

        if let Some(declared) = headers.get(reserved_headers::CONTENT_LENGTH) {
            let declared: usize = declared.parse().map_err(|_| {
                ProtocolError::InvalidPacket(format!("content-length not a number: {declared:?}"))
            })?;
            if declared != payload.len() {
                return Err(ProtocolError::InvalidPacket(format!(
                    "content-length {declared} does not match payload length {}",
                    payload.len()
                )));
            }
        }

        if flags.partial {
            let index: u64 = headers
                .get(reserved_headers::PART_INDEX)
                .ok_or_else(|| {
                    ProtocolError::InvalidPacket("partial packet missing part-index".to_string())
                })?
                .parse()
                .map_err(|_| ProtocolError::InvalidPacket("part-index not a number".to_string()))?;
            let total: u64 = headers
                .get(reserved_headers::PART_TOTAL)
                .ok_or_else(|| {
                    ProtocolError::InvalidPacket("partial packet missing part-total".to_string())
                })?
                .parse()
                .map_err(|_| ProtocolError::InvalidPacket("part-total not a number".to_string()))?;
            if index >= total {
                return Err(ProtocolError::InvalidPacket(format!(
                    "part-index {index} must be less than part-total {total}"
                )));
            }
        }

        headers.insert(reserved_headers::CONTENT_LENGTH, payload.len().to_string())?;

        if let Some(hash) = preshared_hash {
            headers.insert("preshared-hash", encode_hex_32(&hash))?;
        }

        Ok(Self { kind, flags, headers, payload, preshared_hash })
    }

    /// Build an unencrypted, uncompressed `Message` packet from UTF-8 text.
    ///
    /// # Errors
    ///
    /// Propagates [`Packet::new`]'s invariant errors (none apply here except
    /// through malformed headers, which this constructor never produces).
    pub fn message(text: impl Into<String>) -> Result<Self> {
        Self::new(Kind::Message, Flags::default(), Headers::new(), text.into().into_bytes(), None)
    }

    /// Build an opaque `Bytes` packet.
    ///
    /// # Errors
    ///
    /// See [`Packet::new`].
    pub fn bytes(payload: Vec<u8>) -> Result<Self> {
        Self::new(Kind::Bytes, Flags::default(), Headers::new(), payload, None)
    }

    /// Build a named `Object` packet; sets the `object-type` header.
    ///
    /// # Errors
    ///
    /// See [`Packet::new`].
    pub fn object(object_type: impl Into<String>, payload: Vec<u8>) -> Result<Self> {
        let mut headers = Headers::new();
        headers.insert(reserved_headers::OBJECT_TYPE, object_type)?;
        Self::new(Kind::Object, Flags::default(), headers, payload, None)
    }

    /// Build a `File` packet; sets the `filename` header.
    ///
    /// # Errors
    ///
    /// See [`Packet::new`].
    pub fn file(filename: impl Into<String>, payload: Vec<u8>) -> Result<Self> {
        let mut headers = Headers::new();
        headers.insert(reserved_headers::FILENAME, filename)?;
        Self::new(Kind::File, Flags::default(), headers, payload, None)
    }

    /// Build a `Directory` packet from an already-archived payload; sets the
    /// `filename` header to the archive's logical name.
    ///
    /// # Errors
    ///
    /// See [`Packet::new`].
    pub fn directory(archive_name: impl Into<String>, archive: Vec<u8>) -> Result<Self> {
        let mut headers = Headers::new();
        headers.insert(reserved_headers::FILENAME, archive_name)?;
        Self::new(Kind::Directory, Flags::default(), headers, archive, None)
    }

    /// Build the initial `Auth` packet, carrying the preshared-key digest
    /// and an optional `client-id` header.
    ///
    /// # Errors
    ///
    /// See [`Packet::new`].
    pub fn auth(preshared_hash: [u8; 32], client_id: Option<&str>) -> Result<Self> {
        let mut headers = Headers::new();
        if let Some(id) = client_id {
            headers.insert("client-id", id)?;
        }
        Self::new(Kind::Auth, Flags::default(), headers, Vec::new(), Some(preshared_hash))
    }

    /// Build a `Request` packet.
    ///
    /// # Errors
    ///
    /// See [`Packet::new`].
    pub fn request(payload: Vec<u8>) -> Result<Self> {
        Self::new(Kind::Request, Flags::default(), Headers::new(), payload, None)
    }

    /// Build a `Response` packet.
    ///
    /// # Errors
    ///
    /// See [`Packet::new`].
    pub fn response(payload: Vec<u8>) -> Result<Self> {
        Self::new(Kind::Response, Flags::default(), Headers::new(), payload, None)
    }

    /// This packet's kind.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// This packet's flags.
    #[must_use]
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// This packet's headers.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// This packet's payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The preshared-key digest, if this packet carries one.
    #[must_use]
    pub fn preshared_hash(&self) -> Option<&[u8; 32]> {
        self.preshared_hash.as_ref()
    }

    /// Consume the packet, returning its owned parts.
    #[must_use]
    pub fn into_parts(self) -> (Kind, Flags, Headers, Vec<u8>, Option<[u8; 32]>) {
        (self.kind, self.flags, self.headers, self.payload, self.preshared_hash)
    }
}

fn encode_hex_32(bytes: &[u8; 32]) -> String {
    let mut out = String::with_capacity(64);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn message_round_trips_content_length() {
        let packet = Packet::message("hello").unwrap();
        assert_eq!(packet.headers().get(reserved_headers::CONTENT_LENGTH), Some("5"));
    }

    #[test]
    fn encrypted_without_hash_is_rejected() {
        let mut flags = Flags::default();
        flags.encrypted = true;
        let result = Packet::new(Kind::Bytes, flags, Headers::new(), vec![1, 2, 3], None);
        assert!(matches!(result, Err(ProtocolError::InvalidPacket(_))));
    }

    #[test]
    fn partial_requires_indices() {
        let mut flags = Flags::default();
        flags.partial = true;
        let result = Packet::new(Kind::Bytes, flags, Headers::new(), vec![1], None);
        assert!(matches!(result, Err(ProtocolError::InvalidPacket(_))));
    }

    #[test]
    fn partial_index_must_be_less_than_total() {
        let mut flags = Flags::default();
        flags.partial = true;
        let mut headers = Headers::new();
        headers.insert(reserved_headers::PART_INDEX, "2").unwrap();
        headers.insert(reserved_headers::PART_TOTAL, "2").unwrap();
        let result = Packet::new(Kind::Bytes, flags, headers, vec![1], None);
        assert!(matches!(result, Err(ProtocolError::InvalidPacket(_))));
    }
}
