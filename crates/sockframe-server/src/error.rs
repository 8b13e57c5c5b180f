//! Server-level errors (bind, TLS setup, accept loop).

use thiserror::Error;

/// Errors from server setup and the accept loop.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Failed to bind the listening socket.
    #[error("bind failed: {0}")]
    Bind(#[source] std::io::Error),

    /// Failed to load or generate a TLS certificate/key pair.
    #[error("tls setup failed: {0}")]
    Tls(String),

    /// Failed to accept an incoming connection.
    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),
}
