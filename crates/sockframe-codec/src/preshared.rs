//! Preshared-key digest: identifies which shared secret a peer expects.
//!
//! This is an identification aid, not an integrity mechanism — integrity
//! rides on the AEAD tag in [`crate::cipher`]. A mismatched digest lets a
//! session reject a peer before ever attempting to decrypt.

use sha2::{Digest as _, Sha256};

/// Length of a preshared-key digest, in bytes.
pub const DIGEST_LEN: usize = 32;

/// A SHA-256 digest of a preshared secret.
pub type Digest = [u8; DIGEST_LEN];

/// Compute the digest of a preshared secret.
#[must_use]
pub fn digest(preshared_key: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(preshared_key);
    hasher.finalize().into()
}

/// Check whether `preshared_key` matches a previously computed `expected`
/// digest, without needing to hold the secret in both places at once.
#[must_use]
pub fn verify(preshared_key: &[u8], expected: &Digest) -> bool {
    digest(preshared_key) == *expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_matching_key() {
        let d = digest(b"shared-secret");
        assert!(verify(b"shared-secret", &d));
    }

    #[test]
    fn verify_rejects_wrong_key() {
        let d = digest(b"shared-secret");
        assert!(!verify(b"wrong-secret", &d));
    }
}
