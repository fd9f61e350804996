//! Simulated environment with virtual time and seeded randomness.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use classline_core::Environment;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Wall-clock value of the simulation's time zero (2023-11-14T22:13:20Z).
/// Arbitrary but fixed, so assertions on `sent_at_ms` are stable.
pub const SIM_EPOCH_MS: u64 = 1_700_000_000_000;

/// Virtual instant, measured in simulated milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SimInstant(u64);

impl SimInstant {
    /// The instant at `millis` simulated milliseconds.
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Simulated milliseconds since time zero.
    pub fn as_millis(self) -> u64 {
        self.0
    }
}

impl std::ops::Sub for SimInstant {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(rhs.0))
    }
}

struct SimEnvState {
    now_ms: u64,
    rng: ChaCha8Rng,
}

/// Simulated environment: virtual clock advanced manually, ChaCha-seeded
/// RNG. The same seed produces the same run.
#[derive(Clone)]
pub struct SimEnv {
    state: Arc<Mutex<SimEnvState>>,
}

impl SimEnv {
    /// Create a simulation environment with seed 0.
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Create a simulation environment with an explicit seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimEnvState {
                now_ms: 0,
                rng: ChaCha8Rng::seed_from_u64(seed),
            })),
        }
    }

    /// Advance the virtual clock.
    pub fn advance(&self, duration: Duration) {
        self.lock().now_ms += duration.as_millis() as u64;
    }

    /// Simulated milliseconds since time zero.
    pub fn now_ms(&self) -> u64 {
        self.lock().now_ms
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimEnvState> {
        // A poisoned lock only means another test thread panicked; the
        // state itself is a counter and an RNG, both still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for SimEnv {
    type Instant = SimInstant;

    fn now(&self) -> SimInstant {
        SimInstant(self.lock().now_ms)
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        // Virtual time: sleeping IS advancing the clock.
        self.advance(duration);
        async {}
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.lock().rng.fill_bytes(buffer);
    }

    fn wall_clock_ms(&self) -> u64 {
        SIM_EPOCH_MS + self.lock().now_ms
    }
}
