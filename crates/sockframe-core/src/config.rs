//! Session and pipeline configuration.

use std::time::Duration;

/// Default cap on the header block of a single frame.
pub const DEFAULT_MAX_HEADER_BYTES: usize = 64 * 1024;

/// Default cap on the payload of a single frame.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 256 * 1024 * 1024;

/// Default size of the transport read buffer.
pub const DEFAULT_READ_BUFFER_BYTES: usize = 16 * 1024;

/// Default idle timeout before a session is closed.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration shared by the message pipeline and the session driver.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cap on a single frame's header block, in bytes.
    pub max_header_bytes: usize,
    /// Cap on a single frame's payload, in bytes.
    pub max_payload_bytes: usize,
    /// Size of the buffer used to read from the transport.
    pub read_buffer_bytes: usize,
    /// How long a session may sit idle before being closed.
    pub idle_timeout: Duration,
    /// Passphrase used to derive the per-message cipher key. `None` disables
    /// encryption.
    pub encryption_passphrase: Option<String>,
    /// Preshared secret both peers must agree on before `Ready`. `None`
    /// disables authentication (any peer is accepted).
    pub preshared_key: Option<Vec<u8>>,
    /// Whether outbound payloads are compressed before encryption.
    pub compression_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            read_buffer_bytes: DEFAULT_READ_BUFFER_BYTES,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            encryption_passphrase: None,
            preshared_key: None,
            compression_enabled: false,
        }
    }
}

impl Config {
    /// Whether outbound packets should be encrypted.
    #[must_use]
    pub fn encryption_enabled(&self) -> bool {
        self.encryption_passphrase.is_some()
    }
}
