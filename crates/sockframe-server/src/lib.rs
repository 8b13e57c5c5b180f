//! sockframe protocol server: a TCP listener (with optional TLS) that spawns
//! one [`driver::drive`] task per accepted connection.

pub mod driver;
pub mod error;
pub mod transport;

use std::sync::Arc;

use sockframe_core::{Config, Environment, SystemEnv};
use sockframe_proto::Packet;
use tokio::{net::TcpListener, sync::mpsc};
use tokio_rustls::TlsAcceptor;
use tokio_util::sync::CancellationToken;

pub use driver::SessionOutcome;
pub use error::ServerError;

/// A live session accepted by the server: channels to send/receive
/// application packets plus the peer's address.
pub struct Session {
    /// Address of the connected peer.
    pub peer_addr: std::net::SocketAddr,
    /// Send application packets to this peer.
    pub outbound: mpsc::Sender<Packet>,
    /// Receive application packets from this peer.
    pub inbound: mpsc::Receiver<Packet>,
    /// Completes once the session ends.
    pub join: tokio::task::JoinHandle<SessionOutcome>,
    cancel: CancellationToken,
}

impl Session {
    /// Abort this session's receive loop at the next select boundary.
    /// In-flight decode state is discarded and pending sends fail.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// Server runtime configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind_address: String,
    /// Path to a PEM certificate. `None` falls back to a self-signed one.
    pub cert_path: Option<String>,
    /// Path to the matching PEM private key.
    pub key_path: Option<String>,
    /// Maximum number of concurrent sessions.
    pub max_connections: usize,
    /// Whether to wrap accepted connections in TLS. When true without a
    /// `cert_path`/`key_path` pair, a self-signed development certificate
    /// is generated on bind.
    pub tls_enabled: bool,
    /// Session/pipeline configuration applied to every accepted connection.
    pub session: Config,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:7070".to_string(),
            cert_path: None,
            key_path: None,
            max_connections: 10_000,
            tls_enabled: false,
            session: Config::default(),
        }
    }
}

/// A bound, not-yet-accepting server.
pub struct Server {
    listener: TcpListener,
    acceptor: Option<TlsAcceptor>,
    config: ServerConfig,
}

impl Server {
    /// Bind the listening socket and prepare TLS (if configured).
    ///
    /// # Errors
    ///
    /// `ServerError::Bind` if the address cannot be bound;
    /// `ServerError::Tls` if certificate/key loading or generation fails.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let listener =
            TcpListener::bind(&config.bind_address).await.map_err(ServerError::Bind)?;

        let acceptor = if config.tls_enabled {
            let acceptor = match (&config.cert_path, &config.key_path) {
                (Some(cert), Some(key)) => transport::acceptor_from_files(cert, key)?,
                _ => transport::self_signed_acceptor()?,
            };
            Some(acceptor)
        } else {
            None
        };

        Ok(Self { listener, acceptor, config })
    }

    /// The address actually bound (useful when the configured port was 0).
    ///
    /// # Errors
    ///
    /// Propagates the underlying socket's `local_addr` error.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept the next connection and spawn its driver task.
    ///
    /// # Errors
    ///
    /// `ServerError::Accept` if accepting fails; `ServerError::Tls` if the
    /// TLS handshake fails.
    pub async fn accept(&self) -> Result<Session, ServerError> {
        let (stream, peer_addr) = self.listener.accept().await.map_err(ServerError::Accept)?;

        let (tls_used, stream) = if let Some(acceptor) = &self.acceptor {
            let tls_stream = acceptor.accept(stream).await.map_err(|e| ServerError::Tls(e.to_string()))?;
            (true, transport::MaybeTlsStream::Tls(Box::new(tls_stream)))
        } else {
            (false, transport::MaybeTlsStream::Plain(stream))
        };

        let (inbound_tx, inbound_rx) = mpsc::channel(64);
        let (outbound_tx, outbound_rx) = mpsc::channel(64);

        let session_config = self.config.session.clone();
        let env = SystemEnv;
        let cancel = CancellationToken::new();
        let driver_cancel = cancel.clone();
        let join = tokio::spawn(async move {
            driver::drive(stream, session_config, env, tls_used, inbound_tx, outbound_rx, driver_cancel).await
        });

        Ok(Session { peer_addr, outbound: outbound_tx, inbound: inbound_rx, join, cancel })
    }

    /// Accept connections until an unrecoverable error occurs, handing each
    /// session to `on_session`.
    ///
    /// # Errors
    ///
    /// `ServerError::Accept` if the listener itself fails (individual
    /// per-connection TLS failures are logged and skipped, not propagated).
    pub async fn run<F>(&self, mut on_session: F) -> Result<(), ServerError>
    where
        F: FnMut(Session),
    {
        loop {
            match self.accept().await {
                Ok(session) => on_session(session),
                Err(ServerError::Tls(reason)) => {
                    tracing::warn!(%reason, "rejected connection during TLS handshake");
                },
                Err(e) => return Err(e),
            }
        }
    }
}

/// Shared handle type for applications that want to fan sessions out across
/// tasks without holding the `Server` itself.
pub type SharedServer = Arc<Server>;
