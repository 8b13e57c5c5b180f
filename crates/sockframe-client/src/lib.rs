//! sockframe protocol client: connects to a server over TCP (with optional
//! TLS), completes the `Auth` handshake, and exposes a [`Session`] handle for
//! sending and receiving application packets.

pub mod driver;
pub mod error;
pub mod transport;

use sockframe_core::{Config, SystemEnv};
use sockframe_proto::Packet;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub use driver::SessionOutcome;
pub use error::ClientError;

/// A live client session: channels to send/receive application packets.
pub struct Session {
    /// Address of the connected server.
    pub server_addr: String,
    /// Send application packets to the server.
    pub outbound: mpsc::Sender<Packet>,
    /// Receive application packets from the server.
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

/// Connect to `addr` and start the session driver.
///
/// `client_id` is an optional identifier carried in the `Auth` packet's
/// headers; it has no bearing on whether the server accepts the connection,
/// which depends solely on the preshared-key digest matching.
///
/// # Errors
///
/// `ClientError::Connect` if the TCP connection fails;
/// `ClientError::Tls` if `tls` is set and the handshake fails.
pub async fn connect(
    addr: &str,
    config: Config,
    tls: bool,
    client_id: Option<String>,
) -> Result<Session, ClientError> {
    let stream = transport::connect(addr, tls).await?;

    let (inbound_tx, inbound_rx) = mpsc::channel(64);
    let (outbound_tx, outbound_rx) = mpsc::channel(64);

    let server_addr = addr.to_string();
    let env = SystemEnv;
    let cancel = CancellationToken::new();
    let driver_cancel = cancel.clone();
    let join = tokio::spawn(async move {
        driver::drive(stream, config, env, tls, client_id, inbound_tx, outbound_rx, driver_cancel).await
    });

    Ok(Session { server_addr, outbound: outbound_tx, inbound: inbound_rx, join, cancel })
}
