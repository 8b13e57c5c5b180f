//! sockframe client binary.
//!
//! # Usage
//!
//! ```bash
//! # Connect and send lines from stdin, one message packet per line
//! sockframe-client --server 127.0.0.1:7070
//!
//! # Connect over TLS, matching a server started with --tls
//! sockframe-client --server 127.0.0.1:7070 --tls
//! ```

use clap::Parser;
use sockframe_core::Config;
use sockframe_proto::Packet;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// sockframe protocol client
#[derive(Parser, Debug)]
#[command(name = "sockframe-client")]
#[command(about = "Framed, length-delimited socket messaging client")]
#[command(version)]
struct Args {
    /// Server address to connect to
    #[arg(short, long, default_value = "127.0.0.1:7070")]
    server: String,

    /// Wrap the connection in TLS
    #[arg(long)]
    tls: bool,

    /// Preshared secret to present during the auth handshake
    #[arg(long)]
    preshared_key: Option<String>,

    /// Passphrase deriving the per-message cipher key (enables encryption)
    #[arg(long)]
    encryption_passphrase: Option<String>,

    /// Compress payloads before encryption
    #[arg(long)]
    compression: bool,

    /// Identifier sent in the auth handshake
    #[arg(long)]
    client_id: Option<String>,

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

    if args.tls {
        tracing::warn!("TLS enabled with no trust anchor configured - server certificate is accepted unconditionally");
        tracing::warn!("this is NOT suitable for production use!");
    }

    let config = Config {
        preshared_key: args.preshared_key.map(String::into_bytes),
        encryption_passphrase: args.encryption_passphrase,
        compression_enabled: args.compression,
        ..Config::default()
    };

    tracing::info!("connecting to {}", args.server);
    let mut session =
        sockframe_client::connect(&args.server, config, args.tls, args.client_id).await?;
    tracing::info!("connected");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(text) if !text.is_empty() => {
                        let packet = Packet::message(&text)?;
                        if session.outbound.send(packet).await.is_err() {
                            break;
                        }
                    },
                    Some(_) => {},
                    None => break,
                }
            },
            packet = session.inbound.recv() => {
                match packet {
                    Some(packet) => {
                        tracing::info!(?packet, "received packet");
                    },
                    None => break,
                }
            },
            outcome = &mut session.join => {
                tracing::info!(?outcome, "session ended");
                return Ok(());
            },
        }
    }

    Ok(())
}
