//! Per-connection driver: wires [`sockframe_core::Connection`] actions to a
//! real socket.
//!
//! One task per session. Reads are interleaved with outbound sends and
//! periodic timeout ticks via a single `select!` loop, so no write lock is
//! needed within a session — there is only ever one writer.

use sockframe_core::{connection::SessionAction, pipeline, Config, Connection, Environment, SessionState};
use sockframe_proto::{Decoder, Packet, ReceiveEvent};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;

use crate::transport::MaybeTlsStream;

/// Why a session ended.
#[derive(Debug, Clone)]
pub enum SessionOutcome {
    /// Peer or driver closed gracefully.
    Closed(String),
    /// Transport I/O failed.
    TransportError(String),
}

/// Drive one session to completion.
///
/// `inbound_tx` receives application-level packets once authenticated;
/// `outbound_rx` carries packets the application wants to send. `cancel`
/// aborts the receive loop at the next select boundary, discarding any
/// in-flight decode state. Returns once the session closes for any reason.
pub async fn drive<E: Environment>(
    stream: MaybeTlsStream,
    config: Config,
    env: E,
    tls_used: bool,
    inbound_tx: mpsc::Sender<Packet>,
    mut outbound_rx: mpsc::Receiver<Packet>,
    cancel: CancellationToken,
) -> SessionOutcome {
    let (mut read_half, mut write_half) = tokio::io::split(stream);

    let mut connection = Connection::new(env.now(), config.clone());
    if let Err(e) = connection.mark_transport_ready(env.now(), tls_used) {
        return SessionOutcome::TransportError(e.to_string());
    }
    if tls_used {
        // The TLS handshake already completed by the time `stream` was
        // handed to us (tokio-rustls performs it during `accept`/`connect`).
        if let Err(e) = connection.mark_tls_established(env.now()) {
            return SessionOutcome::TransportError(e.to_string());
        }
    }

    let mut decoder = Decoder::new(config.max_header_bytes, config.max_payload_bytes);
    let mut read_buf = vec![0u8; config.read_buffer_bytes];
    let mut tick_interval = tokio::time::interval(std::time::Duration::from_secs(5));

    loop {
        if connection.state() == SessionState::Closed {
            return SessionOutcome::Closed("session closed".to_string());
        }

        tokio::select! {
            () = cancel.cancelled() => {
                return SessionOutcome::Closed("cancelled".to_string());
            },

            read_result = read_half.read(&mut read_buf) => {
                let n = match read_result {
                    Ok(0) => return SessionOutcome::Closed("peer closed the connection".to_string()),
                    Ok(n) => n,
                    Err(e) => return SessionOutcome::TransportError(e.to_string()),
                };

                for event in decoder.append(&read_buf[..n]) {
                    match event {
                        ReceiveEvent::NeedMore => {},
                        ReceiveEvent::Desync => {
                            tracing::warn!("frame desync; resyncing on next delimiter");
                        },
                        ReceiveEvent::PacketReady(packet) => {
                            let now = env.now();
                            let parsed = match pipeline::parse(packet, &config) {
                                Ok(p) => p,
                                Err(e) => {
                                    tracing::warn!(error = %e, "dropping packet that failed the pipeline");
                                    continue;
                                },
                            };

                            let actions = match connection.handle_packet(parsed, now) {
                                Ok(actions) => actions,
                                Err(e) => {
                                    tracing::warn!(error = %e, "dropping invalid packet");
                                    continue;
                                },
                            };

                            for action in actions {
                                match action {
                                    SessionAction::Deliver(packet) => {
                                        if inbound_tx.send(packet).await.is_err() {
                                            return SessionOutcome::Closed("inbound receiver dropped".to_string());
                                        }
                                    },
                                    SessionAction::Send(packet) => {
                                        if let Err(e) = encode_and_write(&mut write_half, &packet, &config, &env).await {
                                            return SessionOutcome::TransportError(e);
                                        }
                                    },
                                    SessionAction::Close { reason } => {
                                        connection.close();
                                        return SessionOutcome::Closed(reason);
                                    },
                                }
                            }
                        },
                    }
                }
            },

            Some(packet) = outbound_rx.recv() => {
                if let Err(e) = encode_and_write(&mut write_half, &packet, &config, &env).await {
                    return SessionOutcome::TransportError(e);
                }
            },

            _ = tick_interval.tick() => {
                for action in connection.tick(env.now()) {
                    if let SessionAction::Close { reason } = action {
                        return SessionOutcome::Closed(reason);
                    }
                }
            },
        }
    }
}

async fn encode_and_write<W: AsyncWriteExt + Unpin, E: Environment>(
    write_half: &mut W,
    packet: &Packet,
    config: &Config,
    env: &E,
) -> Result<(), String> {
    let built = pipeline::build(packet.clone(), config, env.random_nonce()).map_err(|e| e.to_string())?;
    let wire = sockframe_proto::encode(&built, config.max_header_bytes, config.max_payload_bytes)
        .map_err(|e| e.to_string())?;
    write_half.write_all(&wire).await.map_err(|e| e.to_string())
}
