//! Wire encoding for a single [`Packet`].
//!
//! Layout (all multi-byte integers big-endian):
//!
//! ```text
//! [kind : 1][header-length : 2][header-bytes][flags : 1]
//! [payload-length : 4][payload][delimiter : 4]
//! ```
//!
//! The delimiter is redundant with `payload-length` — it exists purely so a
//! desynchronized [`crate::Decoder`] can scan forward and resync. It is not
//! escaped inside the payload; length-prefixing is authoritative and the
//! delimiter is only ever consulted after the declared length has been
//! consumed.

use crate::{
    errors::{ProtocolError, Result},
    headers::Headers,
    packet::Packet,
};

/// Fixed 4-byte resync sentinel shared by every peer of this protocol.
pub const DELIMITER: [u8; 4] = *b"SOCK";

/// Encode `packet` to its wire representation.
///
/// # Errors
///
/// - `ProtocolError::HeaderTooLarge` if the encoded header block exceeds
///   `max_header_bytes`.
/// - `ProtocolError::PayloadTooLarge` if the payload exceeds
///   `max_payload_bytes`.
pub fn encode(packet: &Packet, max_header_bytes: usize, max_payload_bytes: usize) -> Result<Vec<u8>> {
    let header_bytes = packet.headers().encode();
    if header_bytes.len() > max_header_bytes {
        return Err(ProtocolError::HeaderTooLarge {
            size: header_bytes.len(),
            max: max_header_bytes,
        });
    }
    let header_len = u16::try_from(header_bytes.len())
        .map_err(|_| ProtocolError::HeaderTooLarge { size: header_bytes.len(), max: max_header_bytes })?;

    let payload = packet.payload();
    if payload.len() > max_payload_bytes {
        return Err(ProtocolError::PayloadTooLarge { size: payload.len(), max: max_payload_bytes });
    }
    let payload_len = u32::try_from(payload.len())
        .map_err(|_| ProtocolError::PayloadTooLarge { size: payload.len(), max: max_payload_bytes })?;

    let mut out = Vec::with_capacity(1 + 2 + header_bytes.len() + 1 + 4 + payload.len() + 4);
    out.push(packet.kind().to_u8());
    out.extend_from_slice(&header_len.to_be_bytes());
    out.extend_from_slice(&header_bytes);
    out.push(packet.flags().to_byte());
    out.extend_from_slice(&payload_len.to_be_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&DELIMITER);
    Ok(out)
}

/// Decode a single, complete frame from `bytes`. Returns the packet and the
/// number of bytes consumed.
///
/// This is a convenience for tests and for callers that already have a
/// complete frame in hand; the streaming receive path goes through
/// [`crate::Decoder`] instead, since a live socket never hands over frames
/// pre-assembled.
///
/// # Errors
///
/// Any [`ProtocolError`] that the field-by-field validation can raise:
/// unknown kind, oversized header/payload, truncated input, missing
/// delimiter.
pub fn decode(
    bytes: &[u8],
    max_header_bytes: usize,
    max_payload_bytes: usize,
) -> Result<(Packet, usize)> {
    let mut cursor = 0usize;

    let kind_byte = *bytes.get(cursor).ok_or(ProtocolError::MissingDelimiter)?;
    let kind = crate::kind::Kind::from_u8(kind_byte).ok_or(ProtocolError::UnknownKind(kind_byte))?;
    cursor += 1;

    let header_len_bytes: [u8; 2] = bytes
        .get(cursor..cursor + 2)
        .and_then(|s| s.try_into().ok())
        .ok_or(ProtocolError::MissingDelimiter)?;
    let header_len = u16::from_be_bytes(header_len_bytes) as usize;
    if header_len > max_header_bytes {
        return Err(ProtocolError::HeaderTooLarge { size: header_len, max: max_header_bytes });
    }
    cursor += 2;

    let header_bytes =
        bytes.get(cursor..cursor + header_len).ok_or(ProtocolError::MissingDelimiter)?;
    let headers = Headers::decode(header_bytes)?;
    cursor += header_len;

    let flags_byte = *bytes.get(cursor).ok_or(ProtocolError::MissingDelimiter)?;
    let flags = crate::flags::Flags::from_byte(flags_byte);
    cursor += 1;

    let payload_len_bytes: [u8; 4] = bytes
        .get(cursor..cursor + 4)
        .and_then(|s| s.try_into().ok())
        .ok_or(ProtocolError::MissingDelimiter)?;
    let payload_len = u32::from_be_bytes(payload_len_bytes) as usize;
    if payload_len > max_payload_bytes {
        return Err(ProtocolError::PayloadTooLarge { size: payload_len, max: max_payload_bytes });
    }
    cursor += 4;

    let payload = bytes.get(cursor..cursor + payload_len).ok_or(ProtocolError::MissingDelimiter)?;
    cursor += payload_len;

    let delimiter = bytes.get(cursor..cursor + 4).ok_or(ProtocolError::MissingDelimiter)?;
    if delimiter != DELIMITER {
        return Err(ProtocolError::MissingDelimiter);
    }
    cursor += 4;

    let preshared_hash = if flags.has_preshared_key {
        headers.get("preshared-hash").and_then(|hex| decode_hex_32(hex))
    } else {
        None
    };

    let packet = Packet::new(kind, flags, headers, payload.to_vec(), preshared_hash)?;
    Ok((packet, cursor))
}

fn decode_hex_32(hex: &str) -> Option<[u8; 32]> {
    if hex.len() != 64 {
        return None;
    }
    let mut out = [0u8; 32];
    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        let s = std::str::from_utf8(chunk).ok()?;
        out[i] = u8::from_str_radix(s, 16).ok()?;
    }
    Some(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn round_trip_message() {
        let packet = Packet::message("hello world").unwrap();
        let wire = encode(&packet, 65536, 1 << 20).unwrap();
        let (decoded, consumed) = decode(&wire, 65536, 1 << 20).unwrap();
        assert_eq!(consumed, wire.len());
        assert_eq!(decoded.payload(), packet.payload());
        assert_eq!(decoded.kind(), packet.kind());
    }

    #[test]
    fn rejects_header_over_cap() {
        let packet = Packet::message("hi").unwrap();
        let result = encode(&packet, 0, 1 << 20);
        assert!(matches!(result, Err(ProtocolError::HeaderTooLarge { .. })));
    }

    #[test]
    fn rejects_truncated_frame() {
        let packet = Packet::message("hello").unwrap();
        let wire = encode(&packet, 65536, 1 << 20).unwrap();
        let truncated = &wire[..wire.len() - 2];
        let result = decode(truncated, 65536, 1 << 20);
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn round_trip_arbitrary_bytes_payload(payload in prop::collection::vec(any::<u8>(), 0..2048)) {
            let packet = Packet::bytes(payload.clone()).unwrap();
            let wire = encode(&packet, 65536, 1 << 20).unwrap();
            let (decoded, consumed) = decode(&wire, 65536, 1 << 20).unwrap();
            prop_assert_eq!(consumed, wire.len());
            prop_assert_eq!(decoded.payload(), payload.as_slice());
        }
    }
}
