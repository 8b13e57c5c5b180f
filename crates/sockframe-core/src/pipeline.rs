//! Outbound build and inbound parse halves of the message pipeline.
//!
//! Build order: compress, then encrypt. Compressing ciphertext is futile
//! (encrypted bytes look random to a compressor), and encrypting already
//! -compressed data hides size-based traffic analysis better than the
//! reverse order would. Parse reverses the order exactly.

use sockframe_codec::{decrypt, derive_key, digest, encrypt, CipherKey, NONCE_LEN};
use sockframe_proto::Packet;

use crate::{config::Config, error::PipelineError};

/// Build an outbound packet: apply compression and encryption per `config`,
/// attaching the preshared-key digest when encryption is enabled.
///
/// `nonce` must come from [`crate::env::Environment::random_nonce`] — a
/// fresh, unpredictable value per call. Reusing a nonce under the same key
/// breaks the AEAD's confidentiality guarantee.
///
/// # Errors
///
/// `PipelineError::Codec` if compression fails; `PipelineError::Protocol`
/// if the transformed packet violates a protocol invariant (should not
/// happen for packets built through `Packet`'s own constructors).
pub fn build(packet: Packet, config: &Config, nonce: [u8; NONCE_LEN]) -> Result<Packet, PipelineError> {
    let (kind, mut flags, headers, mut payload, _) = packet.into_parts();

    if config.compression_enabled {
        payload = sockframe_codec::compress(&payload)?;
        flags.compressed = true;
    }

    let preshared_hash = if let Some(passphrase) = &config.encryption_passphrase {
        let salt = config.preshared_key.as_deref().unwrap_or(&[]);
        let key = derive_key(passphrase.as_bytes(), salt);
        payload = encrypt(&key, &nonce, &payload);
        flags.encrypted = true;
        config.preshared_key.as_deref().map(digest)
    } else {
        None
    };

    Ok(Packet::new(kind, flags, headers, payload, preshared_hash)?)
}

/// Parse an inbound packet: verify the preshared-key digest (if encrypted),
/// decrypt, then decompress. Returns the packet with its original payload
/// restored.
///
/// # Errors
///
/// - `PipelineError::WrongKey` if the packet is encrypted and its
///   preshared-key digest does not match ours.
/// - `PipelineError::Codec` if decryption or decompression fails.
pub fn parse(packet: Packet, config: &Config) -> Result<Packet, PipelineError> {
    let (kind, mut flags, headers, mut payload, preshared_hash) = packet.into_parts();

    if flags.encrypted {
        let Some(ours) = &config.preshared_key else {
            return Err(PipelineError::WrongKey);
        };
        let Some(theirs) = preshared_hash else {
            return Err(PipelineError::WrongKey);
        };
        if !sockframe_codec::verify(ours, &theirs) {
            return Err(PipelineError::WrongKey);
        }

        let Some(passphrase) = &config.encryption_passphrase else {
            return Err(PipelineError::WrongKey);
        };
        let key: CipherKey = derive_key(passphrase.as_bytes(), ours);
        payload = decrypt(&key, &payload)?;
        flags.encrypted = false;
    }

    if flags.compressed {
        payload = sockframe_codec::decompress(&payload)?;
        flags.compressed = false;
    }

    Ok(Packet::new(kind, flags, headers, payload, None)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sockframe_proto::Packet;

    use super::*;

    fn config_with_cipher() -> Config {
        Config {
            encryption_passphrase: Some("hunter2".to_string()),
            preshared_key: Some(b"shared-secret".to_vec()),
            ..Config::default()
        }
    }

    #[test]
    fn round_trip_plain() {
        let config = Config::default();
        let packet = Packet::message("hello").unwrap();
        let built = build(packet.clone(), &config, [0u8; NONCE_LEN]).unwrap();
        let parsed = parse(built, &config).unwrap();
        assert_eq!(parsed.payload(), packet.payload());
    }

    #[test]
    fn round_trip_encrypted() {
        let config = config_with_cipher();
        let packet = Packet::bytes(b"top secret".to_vec()).unwrap();
        let built = build(packet.clone(), &config, [5u8; NONCE_LEN]).unwrap();
        assert!(built.flags().encrypted);
        let parsed = parse(built, &config).unwrap();
        assert_eq!(parsed.payload(), packet.payload());
    }

    #[test]
    fn wrong_key_never_yields_a_packet() {
        let sender_config = config_with_cipher();
        let mut receiver_config = config_with_cipher();
        receiver_config.encryption_passphrase = Some("wrong-passphrase".to_string());

        let packet = Packet::bytes(b"top secret".to_vec()).unwrap();
        let built = build(packet, &sender_config, [5u8; NONCE_LEN]).unwrap();

        let result = parse(built, &receiver_config);
        assert!(matches!(result, Err(PipelineError::Codec(_))));
    }

    #[test]
    fn round_trip_compressed() {
        let config = Config { compression_enabled: true, ..Config::default() };
        let packet = Packet::bytes(vec![7u8; 4096]).unwrap();
        let built = build(packet.clone(), &config, [0u8; NONCE_LEN]).unwrap();
        assert!(built.flags().compressed);
        let parsed = parse(built, &config).unwrap();
        assert_eq!(parsed.payload(), packet.payload());
    }
}
