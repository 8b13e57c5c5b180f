//! Cross-cutting protocol properties that span more than one module.

use proptest::prelude::*;
use sockframe_proto::{decode, encode, Decoder, Packet, ReceiveEvent};

const MAX_HEADER: usize = 65536;
const MAX_PAYLOAD: usize = 1 << 20;

proptest! {
    #[test]
    fn encode_then_single_shot_decode_round_trips(payload in prop::collection::vec(any::<u8>(), 0..4096)) {
        let packet = Packet::bytes(payload.clone()).unwrap();
        let wire = encode(&packet, MAX_HEADER, MAX_PAYLOAD).unwrap();
        let (decoded, consumed) = decode(&wire, MAX_HEADER, MAX_PAYLOAD).unwrap();
        prop_assert_eq!(consumed, wire.len());
        prop_assert_eq!(decoded.payload(), payload.as_slice());
    }
}

#[test]
fn back_to_back_packets_emit_in_order() {
    let first = Packet::message("first").unwrap();
    let second = Packet::message("second").unwrap();

    let mut wire = encode(&first, MAX_HEADER, MAX_PAYLOAD).unwrap();
    wire.extend(encode(&second, MAX_HEADER, MAX_PAYLOAD).unwrap());

    let mut decoder = Decoder::new(MAX_HEADER, MAX_PAYLOAD);
    let events = decoder.append(&wire);

    let ready: Vec<_> = events
        .into_iter()
        .filter_map(|e| match e {
            ReceiveEvent::PacketReady(p) => Some(p),
            _ => None,
        })
        .collect();

    assert_eq!(ready.len(), 2);
    assert_eq!(ready[0].payload(), b"first");
    assert_eq!(ready[1].payload(), b"second");
}
