//! sockframe server binary.
//!
//! # Usage
//!
//! ```bash
//! # Start without TLS (plain TCP)
//! sockframe-server --bind 0.0.0.0:7070
//!
//! # Start with TLS using a self-signed certificate (development)
//! sockframe-server --bind 0.0.0.0:7070 --tls
//!
//! # Start with TLS using a real certificate (production)
//! sockframe-server --bind 0.0.0.0:7070 --tls --cert cert.pem --key key.pem
//! ```

use clap::Parser;
use sockframe_core::Config;
use sockframe_server::{Server, ServerConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// sockframe protocol server
#[derive(Parser, Debug)]
#[command(name = "sockframe-server")]
#[command(about = "Framed, length-delimited socket messaging server")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:7070")]
    bind: String,

    /// Wrap connections in TLS
    #[arg(long)]
    tls: bool,

    /// Path to TLS certificate (PEM format)
    #[arg(short, long)]
    cert: Option<String>,

    /// Path to TLS private key (PEM format)
    #[arg(short, long)]
    key: Option<String>,

    /// Preshared secret clients must present during the auth handshake
    #[arg(long)]
    preshared_key: Option<String>,

    /// Passphrase deriving the per-message cipher key (enables encryption)
    #[arg(long)]
    encryption_passphrase: Option<String>,

    /// Compress payloads before encryption
    #[arg(long)]
    compression: bool,

    /// Maximum concurrent connections
    #[arg(long, default_value = "10000")]
    max_connections: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("sockframe server starting");
    tracing::info!("binding to {}", args.bind);

    if args.tls && (args.cert.is_none() || args.key.is_none()) {
        tracing::warn!("TLS enabled with no certificate provided - using self-signed certificate");
        tracing::warn!("this is NOT suitable for production use!");
    }

    let config = ServerConfig {
        bind_address: args.bind,
        cert_path: args.cert,
        key_path: args.key,
        max_connections: args.max_connections,
        tls_enabled: args.tls,
        session: Config {
            preshared_key: args.preshared_key.map(String::into_bytes),
            encryption_passphrase: args.encryption_passphrase,
            compression_enabled: args.compression,
            ..Config::default()
        },
    };

    let server = Server::bind(config).await?;
    tracing::info!("listening on {}", server.local_addr()?);

    server
        .run(|session| {
            tracing::info!(peer = %session.peer_addr, "accepted connection");
            tokio::spawn(echo_session(session));
        })
        .await?;

    Ok(())
}

/// Demo application behavior: echo every received packet back to its
/// sender. Exercises the full pipeline end to end without needing a real
/// protocol on top.
async fn echo_session(mut session: sockframe_server::Session) {
    let peer = session.peer_addr;
    loop {
        tokio::select! {
            packet = session.inbound.recv() => {
                let Some(packet) = packet else { break };
                if session.outbound.send(packet).await.is_err() {
                    break;
                }
            },
            outcome = &mut session.join => {
                tracing::info!(peer = %peer, ?outcome, "session ended");
                return;
            },
        }
    }
}
