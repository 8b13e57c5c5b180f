//! Error types for the session layer and message pipeline.
//!
//! We avoid using `std::io::Error` for session logic to keep the recoverable
//! and fatal cases distinguishable; boundary conversions to/from `io::Error`
//! exist only where the driver touches a real socket.

use std::io;

use thiserror::Error;

use crate::connection::SessionState;

/// Errors from the message pipeline (compress/encrypt on the way out,
/// decrypt/decompress + integrity check on the way in).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Codec-level failure (compression, decompression, cipher).
    #[error("codec error: {0}")]
    Codec(#[from] sockframe_codec::CodecError),

    /// Wire-level failure (framing, invalid packet construction).
    #[error("protocol error: {0}")]
    Protocol(#[from] sockframe_proto::ProtocolError),

    /// An encrypted packet's preshared-key digest did not match ours.
    #[error("preshared-key digest mismatch")]
    WrongKey,
}

/// Errors from the per-connection session state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Attempted an operation invalid for the current session state.
    #[error("invalid state transition: cannot {operation} from {state:?}")]
    InvalidState {
        /// Current state when the error occurred.
        state: SessionState,
        /// Operation that was attempted.
        operation: String,
    },

    /// Framing-level error; the decoder will resync and continue.
    #[error("framing error: {0}")]
    FramingError(String),

    /// An encrypted/authenticated packet failed its integrity check.
    #[error("integrity failure: {0}")]
    IntegrityFailure(String),

    /// A structurally invalid packet was received.
    #[error("invalid packet: {0}")]
    InvalidPacket(String),

    /// A declared length exceeded the configured cap.
    #[error("packet too large: {0}")]
    TooLarge(String),

    /// The session was cancelled before the operation completed.
    #[error("operation cancelled")]
    Cancelled,

    /// Transport (socket) failure; the session must close.
    #[error("transport closed: {0}")]
    TransportClosed(String),

    /// An unrecoverable internal error.
    #[error("fatal error: {0}")]
    Fatal(String),
}

impl ConnectionError {
    /// Whether this error is handled by the session internally (resync,
    /// drop-and-continue) rather than surfaced to the caller.
    #[must_use]
    pub fn is_locally_recovered(&self) -> bool {
        matches!(
            self,
            Self::FramingError(_) | Self::IntegrityFailure(_) | Self::InvalidPacket(_)
        )
    }
}

impl From<PipelineError> for ConnectionError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::WrongKey => Self::IntegrityFailure("wrong preshared key".to_string()),
            PipelineError::Codec(e) => Self::IntegrityFailure(e.to_string()),
            PipelineError::Protocol(e) => Self::InvalidPacket(e.to_string()),
        }
    }
}

impl From<sockframe_proto::ProtocolError> for ConnectionError {
    fn from(err: sockframe_proto::ProtocolError) -> Self {
        Self::FramingError(err.to_string())
    }
}

impl From<io::Error> for ConnectionError {
    fn from(err: io::Error) -> Self {
        Self::TransportClosed(err.to_string())
    }
}

/// Convert to `io::Error` for compatibility with async I/O APIs at the
/// driver boundary. For internal logic, use `ConnectionError` directly.
impl From<ConnectionError> for io::Error {
    fn from(err: ConnectionError) -> Self {
        let kind = match &err {
            ConnectionError::Cancelled => io::ErrorKind::Interrupted,
            ConnectionError::TransportClosed(_) => io::ErrorKind::ConnectionReset,
            ConnectionError::FramingError(_)
            | ConnectionError::IntegrityFailure(_)
            | ConnectionError::InvalidPacket(_)
            | ConnectionError::TooLarge(_)
            | ConnectionError::InvalidState { .. } => io::ErrorKind::InvalidData,
            ConnectionError::Fatal(_) => io::ErrorKind::Other,
        };
        Self::new(kind, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framing_errors_are_locally_recovered() {
        assert!(ConnectionError::FramingError("x".into()).is_locally_recovered());
        assert!(ConnectionError::IntegrityFailure("x".into()).is_locally_recovered());
        assert!(ConnectionError::InvalidPacket("x".into()).is_locally_recovered());
    }

    #[test]
    fn transport_errors_surface_to_caller() {
        assert!(!ConnectionError::TransportClosed("x".into()).is_locally_recovered());
        assert!(!ConnectionError::TooLarge("x".into()).is_locally_recovered());
        assert!(!ConnectionError::Cancelled.is_locally_recovered());
    }
}
