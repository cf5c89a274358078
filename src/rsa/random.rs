// Random Number Sources
// Deterministic LCG used for reproducible key generation, plus an entropy-backed stand-in

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Modulus of the generator output range (2^31)
pub const RANDOM_MODULUS: u64 = 1 << 31;

const MULTIPLIER: u64 = 1_103_515_245;
const INCREMENT: u64 = 12_345;

/// A stream of integers in `[0, 2^31)` consumed by the prime search.
///
/// Instances are owned by a single key generation; never share one between threads.
pub trait RandomSource {
    fn next(&mut self) -> u64;
}

/// Linear congruential generator: `state = (state * 1103515245 + 12345) mod 2^31`.
///
/// Identical seeds produce identical streams on every platform. Not suitable for
/// keys that must stay secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleRandom {
    state: u64,
}

impl SimpleRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed % RANDOM_MODULUS,
        }
    }
}

impl RandomSource for SimpleRandom {
    fn next(&mut self) -> u64 {
        // state < 2^31, so the product stays below 2^62
        self.state = (self.state * MULTIPLIER + INCREMENT) % RANDOM_MODULUS;
        self.state
    }
}

/// Non-deterministic source with the same output range as `SimpleRandom`
pub struct EntropyRandom {
    rng: StdRng,
}

impl EntropyRandom {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for EntropyRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropyRandom {
    fn next(&mut self) -> u64 {
        self.rng.gen_range(0..RANDOM_MODULUS)
    }
}

/// Draw a fresh seed for `SimpleRandom` from the OS entropy pool
pub fn entropy_seed() -> u64 {
    rand::thread_rng().gen_range(0..RANDOM_MODULUS)
}
