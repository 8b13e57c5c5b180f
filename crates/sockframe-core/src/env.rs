//! Environment abstraction for deterministic testing.
//!
//! Decouples session logic from system resources (time, randomness) so the
//! same [`crate::Connection`] code can run against real Tokio I/O in
//! production and a seeded virtual clock under `sockframe-harness`'s
//! `turmoil` simulations.

use std::time::Duration;

/// Abstract environment providing time, randomness, and the one async
/// primitive session logic needs.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `now()` never goes backwards.
/// - `random_bytes()` uses cryptographically secure entropy in production.
/// - Methods are infallible except in exceptional circumstances (OS entropy
///   exhaustion, misconfigured simulation).
pub trait Environment: Clone + Send + Sync + 'static {
    /// The instant type used by this environment. Production environments
    /// use `std::time::Instant`; simulation environments use virtual time.
    type Instant: Copy + Ord + Send + Sync + std::ops::Sub<Output = Duration>;

    /// Current time (monotonic).
    fn now(&self) -> Self::Instant;

    /// Sleep for the given duration. The only async method in the trait —
    /// only driver code should call it, never pure session logic.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fill `buffer` with random bytes.
    ///
    /// Given the same RNG seed, this must produce the same sequence of
    /// bytes across runs.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generate a random nonce for [`sockframe_codec::encrypt`].
    fn random_nonce(&self) -> [u8; sockframe_codec::NONCE_LEN] {
        let mut nonce = [0u8; sockframe_codec::NONCE_LEN];
        self.random_bytes(&mut nonce);
        nonce
    }
}

/// Production environment: real monotonic time, real OS entropy, real
/// `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl Environment for SystemEnv {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer)
            .expect("invariant: OS RNG failure is unrecoverable - client/server cannot operate securely");
    }
}
