//! Deterministic [`Environment`] for reproducible tests.
//!
//! Time is left as real monotonic time — session logic only ever compares
//! and subtracts instants, it never depends on wall-clock value, and
//! `tokio::time::sleep` is virtualized by `turmoil` when a test runs inside
//! a simulation. Randomness is seeded so encrypted-packet tests can assert
//! on exact nonces and ciphertexts across runs.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sockframe_core::Environment;

/// Seeded, reproducible environment.
#[derive(Clone)]
pub struct SimEnv {
    rng: Arc<Mutex<ChaCha8Rng>>,
}

impl SimEnv {
    /// Create an environment seeded for reproducibility. The same seed
    /// always produces the same sequence of `random_bytes` calls.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self { rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))) }
    }
}

impl Environment for SimEnv {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        self.rng.lock().expect("invariant: sim rng mutex is never held across a panic").fill_bytes(buffer);
    }
}
