//! Client-level errors (connect, TLS setup).

use thiserror::Error;

/// Errors from client connection setup.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Failed to resolve or connect to the server address.
    #[error("connect failed: {0}")]
    Connect(#[source] std::io::Error),

    /// TLS handshake or config setup failed.
    #[error("tls error: {0}")]
    Tls(String),
}
