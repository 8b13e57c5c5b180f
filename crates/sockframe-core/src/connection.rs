//! Session-layer state machine.
//!
//! Manages connection lifecycle, the authentication handshake, and idle
//! timeouts. Uses the action pattern: methods take time (and occasionally a
//! packet) as input and return actions for the driver to execute. The state
//! machine itself performs no I/O, which keeps it trivially testable and
//! lets the same code run under real time or a simulated clock.
//!
//! # State machine
//!
//! ```text
//! Connecting -> Handshaking (TLS, optional) -> Authenticating -> Ready -> Draining -> Closed
//! ```
//!
//! `Handshaking` is skipped when the transport has no TLS layer — the
//! driver calls [`Connection::mark_transport_ready`] with `tls_used: false`
//! and goes straight to `Authenticating`.

use std::{ops::Sub, time::Duration};

use sockframe_proto::{Kind, Packet};

use crate::{config::Config, error::ConnectionError};

/// Actions returned by the session state machine for the driver to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Send this packet to the peer.
    Send(Packet),
    /// A packet has cleared protocol-level handling and should be delivered
    /// to the application callback.
    Deliver(Packet),
    /// Close the session with this reason.
    Close {
        /// Human-readable reason, logged by the driver.
        reason: String,
    },
}

/// Session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport not yet established.
    Connecting,
    /// TLS handshake in progress.
    Handshaking,
    /// Transport (and TLS, if used) ready; waiting for the `Auth` packet.
    Authenticating,
    /// Authenticated; packets flow freely.
    Ready,
    /// Graceful shutdown in progress; no new sends accepted.
    Draining,
    /// Session closed (graceful or error).
    Closed,
}

/// Per-session state machine.
///
/// Generic over `Instant` so the same logic runs under real time
/// (`std::time::Instant`) or virtual time (`turmoil`'s clock) in
/// `sockframe-harness`.
#[derive(Debug, Clone)]
pub struct Connection<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    state: SessionState,
    config: Config,
    last_activity: I,
}

impl<I> Connection<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Create a new connection in [`SessionState::Connecting`].
    pub fn new(now: I, config: Config) -> Self {
        Self { state: SessionState::Connecting, config, last_activity: now }
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Called once the underlying transport is connected.
    ///
    /// # Errors
    ///
    /// `ConnectionError::InvalidState` if not in `Connecting`.
    pub fn mark_transport_ready(
        &mut self,
        now: I,
        tls_used: bool,
    ) -> Result<(), ConnectionError> {
        if self.state != SessionState::Connecting {
            return Err(ConnectionError::InvalidState {
                state: self.state,
                operation: "mark_transport_ready".to_string(),
            });
        }
        self.state = if tls_used { SessionState::Handshaking } else { SessionState::Authenticating };
        self.last_activity = now;
        Ok(())
    }

    /// Called once the TLS handshake completes.
    ///
    /// # Errors
    ///
    /// `ConnectionError::InvalidState` if not in `Handshaking`.
    pub fn mark_tls_established(&mut self, now: I) -> Result<(), ConnectionError> {
        if self.state != SessionState::Handshaking {
            return Err(ConnectionError::InvalidState {
                state: self.state,
                operation: "mark_tls_established".to_string(),
            });
        }
        self.state = SessionState::Authenticating;
        self.last_activity = now;
        Ok(())
    }

    /// Client-side: build and send the initial `Auth` packet.
    ///
    /// # Errors
    ///
    /// `ConnectionError::InvalidState` if not in `Authenticating`.
    pub fn initiate_auth(
        &mut self,
        now: I,
        client_id: Option<&str>,
    ) -> Result<Vec<SessionAction>, ConnectionError> {
        if self.state != SessionState::Authenticating {
            return Err(ConnectionError::InvalidState {
                state: self.state,
                operation: "initiate_auth".to_string(),
            });
        }
        self.last_activity = now;

        let hash = self
            .config
            .preshared_key
            .as_deref()
            .map(sockframe_codec::digest)
            .unwrap_or_else(|| sockframe_codec::digest(b""));

        let auth =
            Packet::auth(hash, client_id).map_err(|e| ConnectionError::Fatal(e.to_string()))?;
        Ok(vec![SessionAction::Send(auth)])
    }

    /// Mark the session active (call whenever bytes arrive).
    pub fn update_activity(&mut self, now: I) {
        self.last_activity = now;
    }

    /// Elapsed idle time if the idle timeout has been exceeded, `None`
    /// otherwise. Only meaningful once `Ready`.
    #[must_use]
    pub fn check_idle_timeout(&self, now: I) -> Option<Duration> {
        if self.state != SessionState::Ready {
            return None;
        }
        let elapsed = now - self.last_activity;
        (elapsed > self.config.idle_timeout).then_some(elapsed)
    }

    /// Periodic maintenance: detect idle timeout.
    pub fn tick(&mut self, now: I) -> Vec<SessionAction> {
        if let Some(elapsed) = self.check_idle_timeout(now) {
            self.state = SessionState::Closed;
            return vec![SessionAction::Close { reason: format!("idle timeout after {elapsed:?}") }];
        }
        Vec::new()
    }

    /// Begin a graceful shutdown: stop accepting new application sends,
    /// still deliver whatever the peer already sent.
    pub fn begin_drain(&mut self) {
        if self.state == SessionState::Ready {
            self.state = SessionState::Draining;
        }
    }

    /// Mark the session closed unconditionally (transport failure, explicit
    /// close request, cancellation).
    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }

    /// Process an inbound packet (already decrypted/decompressed by
    /// [`crate::pipeline::parse`]).
    ///
    /// # Errors
    ///
    /// `ConnectionError::InvalidPacket` if an `Auth` packet is received
    /// outside `Authenticating`, or a non-`Auth` packet is received before
    /// authentication completes.
    pub fn handle_packet(
        &mut self,
        packet: Packet,
        now: I,
    ) -> Result<Vec<SessionAction>, ConnectionError> {
        self.last_activity = now;

        match (self.state, packet.kind()) {
            (SessionState::Authenticating, Kind::Auth) => {
                let expected = self
                    .config
                    .preshared_key
                    .as_deref()
                    .map(sockframe_codec::digest)
                    .unwrap_or_else(|| sockframe_codec::digest(b""));

                match packet.preshared_hash() {
                    Some(actual) if *actual == expected => {
                        self.state = SessionState::Ready;
                        Ok(Vec::new())
                    },
                    _ => {
                        self.state = SessionState::Closed;
                        Ok(vec![SessionAction::Close {
                            reason: "preshared-key digest mismatch on auth".to_string(),
                        }])
                    },
                }
            },
            (SessionState::Authenticating, _) => Err(ConnectionError::InvalidPacket(
                "expected Auth packet before authentication completes".to_string(),
            )),
            (SessionState::Ready | SessionState::Draining, _) => {
                Ok(vec![SessionAction::Deliver(packet)])
            },
            (state, kind) => Err(ConnectionError::InvalidPacket(format!(
                "packet kind {kind:?} is not valid in state {state:?}"
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Instant;

    use super::*;

    fn config() -> Config {
        Config { preshared_key: Some(b"shared-secret".to_vec()), ..Config::default() }
    }

    #[test]
    fn lifecycle_without_tls() {
        let t0 = Instant::now();
        let mut client = Connection::new(t0, config());
        client.mark_transport_ready(t0, false).unwrap();
        assert_eq!(client.state(), SessionState::Authenticating);

        let actions = client.initiate_auth(t0, Some("alice")).unwrap();
        assert_eq!(actions.len(), 1);
        let SessionAction::Send(auth_packet) = actions.into_iter().next().unwrap() else {
            panic!("expected Send action");
        };

        let mut server = Connection::new(t0, config());
        server.mark_transport_ready(t0, false).unwrap();
        let actions = server.handle_packet(auth_packet, t0).unwrap();
        assert!(actions.is_empty());
        assert_eq!(server.state(), SessionState::Ready);
    }

    #[test]
    fn lifecycle_with_tls() {
        let t0 = Instant::now();
        let mut conn = Connection::new(t0, config());
        conn.mark_transport_ready(t0, true).unwrap();
        assert_eq!(conn.state(), SessionState::Handshaking);
        conn.mark_tls_established(t0).unwrap();
        assert_eq!(conn.state(), SessionState::Authenticating);
    }

    #[test]
    fn wrong_preshared_key_closes_session() {
        let t0 = Instant::now();
        let mut server = Connection::new(t0, config());
        server.mark_transport_ready(t0, false).unwrap();

        let bad_auth = Packet::auth(sockframe_codec::digest(b"wrong"), None).unwrap();
        let actions = server.handle_packet(bad_auth, t0).unwrap();
        assert_eq!(server.state(), SessionState::Closed);
        assert!(matches!(actions.as_slice(), [SessionAction::Close { .. }]));
    }

    #[test]
    fn non_auth_before_ready_is_rejected() {
        let t0 = Instant::now();
        let mut server = Connection::new(t0, config());
        server.mark_transport_ready(t0, false).unwrap();

        let message = Packet::message("too early").unwrap();
        let result = server.handle_packet(message, t0);
        assert!(matches!(result, Err(ConnectionError::InvalidPacket(_))));
    }

    #[test]
    fn idle_timeout_closes_ready_session() {
        let t0 = Instant::now();
        let mut conn = Connection::new(t0, Config { idle_timeout: Duration::from_secs(5), ..config() });
        conn.mark_transport_ready(t0, false).unwrap();
        conn.state = SessionState::Ready;
        conn.last_activity = t0;

        let t1 = t0 + Duration::from_secs(10);
        let actions = conn.tick(t1);
        assert_eq!(conn.state(), SessionState::Closed);
        assert!(matches!(actions.as_slice(), [SessionAction::Close { .. }]));
    }

    #[test]
    fn deliver_after_ready() {
        let t0 = Instant::now();
        let mut conn = Connection::new(t0, config());
        conn.mark_transport_ready(t0, false).unwrap();
        conn.state = SessionState::Ready;

        let msg = Packet::message("hi").unwrap();
        let actions = conn.handle_packet(msg.clone(), t0).unwrap();
        assert_eq!(actions, vec![SessionAction::Deliver(msg)]);
    }
}
