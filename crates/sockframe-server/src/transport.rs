//! TLS acceptor setup and a stream type that's transparent over plain TCP
//! vs. TLS-wrapped TCP.

use std::{
    io,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio::{
    io::{AsyncRead, AsyncWrite, ReadBuf},
    net::TcpStream,
};
use tokio_rustls::{server::TlsStream, TlsAcceptor};

use crate::error::ServerError;

/// Either a plain TCP stream or a TLS-wrapped one, read/written identically
/// by the session driver.
pub enum MaybeTlsStream {
    /// No TLS: bytes flow in the clear.
    Plain(TcpStream),
    /// TLS-wrapped.
    Tls(Box<TlsStream<TcpStream>>),
}

impl AsyncRead for MaybeTlsStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(s) => Pin::new(s).poll_read(cx, buf),
            Self::Tls(s) => Pin::new(s.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for MaybeTlsStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Self::Plain(s) => Pin::new(s).poll_write(cx, buf),
            Self::Tls(s) => Pin::new(s.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(s) => Pin::new(s).poll_flush(cx),
            Self::Tls(s) => Pin::new(s.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(s) => Pin::new(s).poll_shutdown(cx),
            Self::Tls(s) => Pin::new(s.as_mut()).poll_shutdown(cx),
        }
    }
}

/// Build a TLS acceptor from a PEM certificate/key pair on disk.
///
/// # Errors
///
/// `ServerError::Tls` if the files cannot be read or parsed, or if rustls
/// rejects the resulting config.
pub fn acceptor_from_files(cert_path: &str, key_path: &str) -> Result<TlsAcceptor, ServerError> {
    let cert_bytes = std::fs::read(cert_path).map_err(|e| ServerError::Tls(e.to_string()))?;
    let key_bytes = std::fs::read(key_path).map_err(|e| ServerError::Tls(e.to_string()))?;
    build_acceptor(cert_bytes, key_bytes)
}

/// Build a TLS acceptor from a freshly generated self-signed certificate.
///
/// Development only — the certificate is not from a trusted chain and
/// exists purely so the TLS code path can be exercised end to end without
/// provisioning real certificates.
///
/// # Errors
///
/// `ServerError::Tls` if certificate generation or the rustls config build
/// fails.
pub fn self_signed_acceptor() -> Result<TlsAcceptor, ServerError> {
    let rcgen::CertifiedKey { cert, signing_key } =
        rcgen::generate_simple_self_signed(vec!["localhost".to_string()])
            .map_err(|e| ServerError::Tls(e.to_string()))?;

    let cert_der = cert.der().clone();
    let key_der = PrivateKeyDer::Pkcs8(signing_key.serialize_der().into());

    build_acceptor_from_der(vec![cert_der], key_der)
}

fn build_acceptor(cert_pem: Vec<u8>, key_pem: Vec<u8>) -> Result<TlsAcceptor, ServerError> {
    let certs: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut cert_pem.as_slice())
        .collect::<Result<_, _>>()
        .map_err(|e| ServerError::Tls(e.to_string()))?;

    let key = rustls_pemfile::private_key(&mut key_pem.as_slice())
        .map_err(|e| ServerError::Tls(e.to_string()))?
        .ok_or_else(|| ServerError::Tls("no private key found in key file".to_string()))?;

    build_acceptor_from_der(certs, key)
}

fn build_acceptor_from_der(
    certs: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
) -> Result<TlsAcceptor, ServerError> {
    let config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| ServerError::Tls(e.to_string()))?;

    Ok(TlsAcceptor::from(Arc::new(config)))
}
