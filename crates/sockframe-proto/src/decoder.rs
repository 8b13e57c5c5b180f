//! Streaming decoder: reconstructs [`Packet`]s from an arbitrarily chunked
//! byte stream.
//!
//! Mirrors the pure, action-returning state machines elsewhere in this
//! codebase (see `sockframe_core::Connection`): [`Decoder::append`] takes
//! bytes and time, and returns events for the caller to act on — it never
//! touches a socket itself.

use crate::{frame::DELIMITER, packet::Packet};

/// What happened as a result of feeding bytes to the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiveEvent {
    /// Not enough bytes yet to complete a frame.
    NeedMore,
    /// A complete, valid packet was decoded.
    PacketReady(Packet),
    /// The stream was unparseable at the current position (an invalid kind
    /// byte, an oversized length field, a missing delimiter, or a malformed
    /// header/packet). The decoder has discarded bytes up to the next byte
    /// offset that looks like a plausible frame start and will resume
    /// framing from there.
    Desync,
}

enum ParseOutcome {
    NeedMore,
    Packet(Packet, usize),
    Desync,
}

/// Per-connection stream reassembly state.
///
/// Owns a growable buffer of bytes not yet consumed into a packet. Created
/// once per connection, cleared (implicitly, via draining) after each
/// completed packet, and dropped when the connection closes.
pub struct Decoder {
    buffer: Vec<u8>,
    desynced: bool,
    max_header_bytes: usize,
    max_payload_bytes: usize,
}

impl Decoder {
    /// Create a decoder enforcing the given per-frame caps.
    #[must_use]
    pub fn new(max_header_bytes: usize, max_payload_bytes: usize) -> Self {
        Self { buffer: Vec::new(), desynced: false, max_header_bytes, max_payload_bytes }
    }

    /// Feed newly-received bytes and drain as many events as the buffer now
    /// supports. A zero-length `bytes` is a no-op that always yields a
    /// single `NeedMore`.
    pub fn append(&mut self, bytes: &[u8]) -> Vec<ReceiveEvent> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        loop {
            if self.desynced {
                if self.scan_and_resync() {
                    self.desynced = false;
                    continue;
                }
                break;
            }

            match self.try_parse_one() {
                ParseOutcome::NeedMore => break,
                ParseOutcome::Packet(packet, consumed) => {
                    self.buffer.drain(0..consumed);
                    events.push(ReceiveEvent::PacketReady(packet));
                },
                ParseOutcome::Desync => {
                    self.desynced = true;
                    events.push(ReceiveEvent::Desync);
                },
            }
        }

        if events.is_empty() {
            events.push(ReceiveEvent::NeedMore);
        }
        events
    }

    /// Bytes currently buffered but not yet consumed into a packet.
    #[must_use]
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the decoder is currently scanning for resync.
    #[must_use]
    pub fn is_desynced(&self) -> bool {
        self.desynced
    }

    fn try_parse_one(&self) -> ParseOutcome {
        Self::parse_from(&self.buffer, self.max_header_bytes, self.max_payload_bytes)
    }

    /// Same as [`Self::try_parse_one`], but starting from `offset` into the
    /// buffer rather than from the front. Used by [`Self::scan_and_resync`]
    /// to test candidate resync points without disturbing the buffer.
    fn try_parse_at(&self, offset: usize) -> ParseOutcome {
        Self::parse_from(&self.buffer[offset..], self.max_header_bytes, self.max_payload_bytes)
    }

    fn parse_from(buf: &[u8], max_header_bytes: usize, max_payload_bytes: usize) -> ParseOutcome {
        // AwaitingKind / AwaitingHeaderLen: need kind(1) + header-length(2).
        if buf.len() < 3 {
            return ParseOutcome::NeedMore;
        }
        let kind_byte = buf[0];
        if crate::kind::Kind::from_u8(kind_byte).is_none() {
            return ParseOutcome::Desync;
        }
        let header_len = u16::from_be_bytes([buf[1], buf[2]]) as usize;
        if header_len > max_header_bytes {
            return ParseOutcome::Desync;
        }

        // AwaitingHeader.
        let headers_end = 3 + header_len;
        if buf.len() < headers_end {
            return ParseOutcome::NeedMore;
        }

        // AwaitingFlags / AwaitingPayloadLen: need flags(1) + payload-length(4).
        if buf.len() < headers_end + 1 + 4 {
            return ParseOutcome::NeedMore;
        }
        let payload_len_start = headers_end + 1;
        let payload_len = u32::from_be_bytes([
            buf[payload_len_start],
            buf[payload_len_start + 1],
            buf[payload_len_start + 2],
            buf[payload_len_start + 3],
        ]) as usize;
        if payload_len > max_payload_bytes {
            return ParseOutcome::Desync;
        }

        // AwaitingPayload / AwaitingDelimiter.
        let payload_start = payload_len_start + 4;
        let total_len = payload_start + payload_len + DELIMITER.len();
        if buf.len() < total_len {
            return ParseOutcome::NeedMore;
        }

        let delimiter_start = payload_start + payload_len;
        if buf[delimiter_start..total_len] != DELIMITER {
            return ParseOutcome::Desync;
        }

        // Complete: hand the whole frame to the single-shot decoder, which
        // re-derives payload bounds solely from `payload_len` above, never
        // from header-length arithmetic.
        match crate::frame::decode(buf, max_header_bytes, max_payload_bytes) {
            Ok((packet, consumed)) => ParseOutcome::Packet(packet, consumed),
            Err(_) => ParseOutcome::Desync,
        }
    }

    /// Scan for the earliest byte offset at which a complete, valid frame
    /// can be parsed right now, and resync there. Searching for the
    /// delimiter sentinel instead is not sufficient: when the corrupt run
    /// itself contains no delimiter, the only "SOCK" match in the buffer
    /// can belong to an untouched, already-valid frame that follows the
    /// corruption rather than marking where the corruption ends, and
    /// draining through it would discard that frame before it's ever
    /// parsed.
    ///
    /// A candidate offset that merely looks plausible (valid kind byte,
    /// header length within cap) but can't yet be confirmed because the
    /// buffer doesn't hold the rest of its claimed frame is kept, not
    /// resynced to: scanning continues past it, and a later offset that
    /// *does* fully confirm wins. This is what the case above needs — the
    /// plausible-looking byte sequence that precedes the real frame must
    /// not block the real frame from being found once its bytes arrive.
    fn scan_and_resync(&mut self) -> bool {
        let len = self.buffer.len();
        let mut pending = None;

        let mut offset = 0;
        while offset + 3 <= len {
            match self.try_parse_at(offset) {
                ParseOutcome::Packet(_, _) => {
                    self.buffer.drain(0..offset);
                    return true;
                },
                ParseOutcome::NeedMore => {
                    if pending.is_none() {
                        pending = Some(offset);
                    }
                },
                ParseOutcome::Desync => {},
            }
            offset += 1;
        }

        // A plausible-but-incomplete candidate keeps everything from it
        // onward rather than being discarded as if definitely corrupt, so
        // it can still resolve once more bytes arrive. With no candidate
        // at all, keep only the trailing bytes too short to have been
        // checked (fewer than 3) and drop the rest.
        let drain_to = pending.unwrap_or_else(|| len.saturating_sub(2));
        self.buffer.drain(0..drain_to);
        false
    }
}
