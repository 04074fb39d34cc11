// Randomness capability handed to each pattern at construction. Nothing here
// is process-global: two patterns never share a stream unless the caller
// hands them the same seed.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rand_core::RngCore;

use crate::ktp_error::ConfigError;
use crate::nist_drbg::{NistDrbg, SEED_LEN};

pub trait EntropySource {
    /// Uniform real in [0, 1).
    fn next_unit(&mut self) -> f64;

    fn fill(&mut self, out: &mut [u8]);

    /// Uniform index in `0..n`; `n` must be non-zero.
    fn below(&mut self, n: usize) -> usize;
}

impl<R: RngCore> EntropySource for R {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn fill(&mut self, out: &mut [u8]) {
        self.fill_bytes(out);
    }

    fn below(&mut self, n: usize) -> usize {
        self.gen_range(0..n)
    }
}

pub type Entropy = Box<dyn EntropySource + Send>;

/// Reproducible ChaCha20 stream.
pub fn seeded(seed: u64) -> Entropy {
    Box::new(ChaCha20Rng::seed_from_u64(seed))
}

/// Reproducible NIST CTR-DRBG stream.
pub fn from_drbg_seed(seed48: &[u8; SEED_LEN]) -> Entropy {
    Box::new(NistDrbg::new(seed48))
}

/// CTR-DRBG seeded from the operating system.
pub fn os() -> Result<Entropy, ConfigError> {
    let drbg = NistDrbg::from_os_entropy().map_err(|e| ConfigError::Entropy(e.to_string()))?;
    Ok(Box::new(drbg))
}
