//! XChaCha20-Poly1305 encryption with HKDF-stretched passphrase keys.
//!
//! Output of [`encrypt`] is self-contained: a random nonce is generated per
//! call and prepended to the ciphertext, so the wire format never needs to
//! carry the nonce separately.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CodecError;

/// Length of the random nonce prepended to every ciphertext.
pub const NONCE_LEN: usize = 24;

const HKDF_INFO: &[u8] = b"sockframe-codec-cipher-v1";

/// A key derived from a passphrase, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CipherKey([u8; 32]);

impl CipherKey {
    /// Raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Stretch a passphrase into a 256-bit key via HKDF-SHA256.
///
/// `salt` should be stable per deployment (e.g. the preshared-key digest)
/// so two peers with the same passphrase derive the same key.
#[must_use]
#[allow(clippy::expect_used)]
pub fn derive_key(passphrase: &[u8], salt: &[u8]) -> CipherKey {
    let hk = Hkdf::<Sha256>::new(Some(salt), passphrase);
    let mut key = [0u8; 32];
    // Output length (32) is always valid for HKDF-SHA256's max (255 * 32).
    hk.expand(HKDF_INFO, &mut key).expect("invariant: 32-byte HKDF expand never fails");
    CipherKey(key)
}

/// Encrypt `plaintext` under `key`, returning `nonce || ciphertext || tag`.
///
/// # Errors
///
/// Returns `CodecError::CompressionFailed` is never returned here; encryption
/// failures surface as `CodecError::DecryptionFailed` only on the decrypt
/// side. Encryption itself cannot fail for valid inputs.
#[allow(clippy::expect_used)]
pub fn encrypt(key: &CipherKey, nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Vec<u8> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    let xnonce = XNonce::from_slice(nonce);
    // A fresh nonce is never reused for a key derived per-message context;
    // encryption under a valid key/nonce pair cannot fail.
    let ciphertext = cipher
        .encrypt(xnonce, plaintext)
        .expect("invariant: encryption with valid key/nonce cannot fail");

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(nonce);
    out.extend_from_slice(&ciphertext);
    out
}

/// Decrypt a `nonce || ciphertext || tag` blob produced by [`encrypt`].
///
/// # Errors
///
/// - `CodecError::CiphertextTruncated` if shorter than nonce+tag overhead.
/// - `CodecError::DecryptionFailed` if the key is wrong or the tag does not
///   verify.
pub fn decrypt(key: &CipherKey, data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let min = NONCE_LEN + 16; // Poly1305 tag is 16 bytes
    if data.len() < min {
        return Err(CodecError::CiphertextTruncated { len: data.len(), min });
    }

    let (nonce, ciphertext) = data.split_at(NONCE_LEN);
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    let xnonce = XNonce::from_slice(nonce);

    cipher.decrypt(xnonce, ciphertext).map_err(|_| CodecError::DecryptionFailed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn round_trip() {
        let key = derive_key(b"hunter2", b"salt");
        let nonce = [7u8; NONCE_LEN];
        let ct = encrypt(&key, &nonce, b"hello world");
        let pt = decrypt(&key, &ct).unwrap();
        assert_eq!(pt, b"hello world");
    }

    #[test]
    fn wrong_key_fails() {
        let key_a = derive_key(b"hunter2", b"salt");
        let key_b = derive_key(b"different", b"salt");
        let nonce = [7u8; NONCE_LEN];
        let ct = encrypt(&key_a, &nonce, b"hello world");
        assert_eq!(decrypt(&key_b, &ct), Err(CodecError::DecryptionFailed));
    }

    #[test]
    fn deterministic_given_fixed_nonce() {
        let key = derive_key(b"hunter2", b"salt");
        let nonce = [3u8; NONCE_LEN];
        let a = encrypt(&key, &nonce, b"same plaintext");
        let b = encrypt(&key, &nonce, b"same plaintext");
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn round_trip_arbitrary(passphrase in ".*", plaintext in prop::collection::vec(any::<u8>(), 0..4096)) {
            let key = derive_key(passphrase.as_bytes(), b"salt");
            let nonce = [9u8; NONCE_LEN];
            let ct = encrypt(&key, &nonce, &plaintext);
            let pt = decrypt(&key, &ct).unwrap();
            prop_assert_eq!(pt, plaintext);
        }
    }
}
