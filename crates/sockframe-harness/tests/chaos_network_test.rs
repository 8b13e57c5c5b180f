//! Wire-level resilience tests over a `turmoil`-simulated network: the
//! framing layer must behave identically when bytes arrive one at a time
//! over a real socket, not just when fed directly to the decoder in-process.

use sockframe_proto::{Decoder, Packet, ReceiveEvent};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use turmoil::net::{TcpListener, TcpStream};

const MAX_HEADER_BYTES: usize = 64 * 1024;
const MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

/// Small enough that a single `u16` header-length field can legitimately
/// exceed it, unlike [`MAX_HEADER_BYTES`] which already exceeds `u16::MAX`.
const SMALL_MAX_HEADER_BYTES: usize = 1024;

#[test]
fn byte_at_a_time_delivery_yields_exactly_one_packet() {
    let mut sim = turmoil::Builder::new().build();

    sim.host("server", || async {
        let listener = TcpListener::bind("0.0.0.0:7070").await?;
        let (mut stream, _) = listener.accept().await?;

        let mut decoder = Decoder::new(MAX_HEADER_BYTES, MAX_PAYLOAD_BYTES);
        let mut ready_count = 0;
        let mut byte = [0u8; 1];

        loop {
            let n = stream.read(&mut byte).await?;
            if n == 0 {
                break;
            }
            for event in decoder.append(&byte) {
                match event {
                    ReceiveEvent::PacketReady(packet) => {
                        ready_count += 1;
                        assert_eq!(packet.payload(), b"trickled in one byte at a time");
                    },
                    ReceiveEvent::NeedMore => {},
                    ReceiveEvent::Desync => panic!("well-formed frame should never desync"),
                }
            }
        }

        assert_eq!(ready_count, 1, "exactly one packet should surface from one frame's worth of bytes");
        Ok(())
    });

    sim.client("client", async {
        let mut stream = TcpStream::connect("server:7070").await?;

        let packet = Packet::message("trickled in one byte at a time").unwrap();
        let wire = sockframe_proto::encode(&packet, MAX_HEADER_BYTES, MAX_PAYLOAD_BYTES).unwrap();

        for byte in &wire {
            stream.write_all(std::slice::from_ref(byte)).await?;
        }
        stream.shutdown().await?;

        Ok(())
    });

    sim.run().expect("simulation should complete without error");
}

#[test]
fn oversized_header_is_skipped_and_the_stream_resyncs() {
    let mut sim = turmoil::Builder::new().build();

    sim.host("server", || async {
        let listener = TcpListener::bind("0.0.0.0:7070").await?;
        let (mut stream, _) = listener.accept().await?;

        let mut decoder = Decoder::new(SMALL_MAX_HEADER_BYTES, MAX_PAYLOAD_BYTES);
        let mut packets = Vec::new();
        let mut buf = [0u8; 256];

        loop {
            let n = stream.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            for event in decoder.append(&buf[..n]) {
                if let ReceiveEvent::PacketReady(packet) = event {
                    packets.push(packet);
                }
            }
        }

        assert_eq!(packets.len(), 1, "the garbage frame should be skipped, not delivered");
        assert_eq!(packets[0].payload(), b"recovered after garbage");
        Ok(())
    });

    sim.client("client", async {
        let mut stream = TcpStream::connect("server:7070").await?;

        // A frame claiming a header far larger than the cap. Never a valid
        // frame; the decoder must reject it without allocating a
        // payload-sized buffer and must resync once it finds the next
        // delimiter.
        let mut garbage = vec![1u8]; // Kind::Message
        let oversized_header_len: u16 = (SMALL_MAX_HEADER_BYTES as u16).wrapping_add(1);
        garbage.extend_from_slice(&oversized_header_len.to_be_bytes());
        garbage.extend_from_slice(b"padding-that-is-never-read-as-a-header");
        garbage.extend_from_slice(sockframe_proto::DELIMITER.as_slice());
        stream.write_all(&garbage).await?;

        let good = Packet::message("recovered after garbage").unwrap();
        let wire = sockframe_proto::encode(&good, SMALL_MAX_HEADER_BYTES, MAX_PAYLOAD_BYTES).unwrap();
        stream.write_all(&wire).await?;
        stream.shutdown().await?;

        Ok(())
    });

    sim.run().expect("simulation should complete without error");
}
