// Configuration
// Key generation and codec parameters, with TOML loading

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StegoError};

/// Public exponent used for every generated key
pub const PUBLIC_EXPONENT: u64 = 65537;

/// Parameters for key generation and key persistence
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StegoConfig {
    /// Modulus size in bits; each prime gets half
    pub key_bits: u32,
    /// Seed of the deterministic generator
    pub seed: u64,
    /// Miller-Rabin rounds per candidate
    pub mr_rounds: u32,
    /// Bytes per integer in a packed key buffer
    pub key_field_width: usize,
    /// Candidates tried per prime before giving up
    pub max_prime_attempts: u64,
}

impl Default for StegoConfig {
    fn default() -> Self {
        Self {
            key_bits: 1024,
            seed: 42,
            mr_rounds: 40,
            key_field_width: 256,
            max_prime_attempts: 1_000_000,
        }
    }
}

impl StegoConfig {
    pub fn with_key_bits(mut self, bits: u32) -> Self {
        self.key_bits = bits;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_mr_rounds(mut self, rounds: u32) -> Self {
        self.mr_rounds = rounds;
        self
    }

    pub fn with_key_field_width(mut self, width: usize) -> Self {
        self.key_field_width = width;
        self
    }

    pub fn with_max_prime_attempts(mut self, attempts: u64) -> Self {
        self.max_prime_attempts = attempts;
        self
    }

    /// Reject parameter combinations that cannot produce a usable key
    pub fn validate(&self) -> Result<()> {
        if self.key_bits < 8 {
            return Err(StegoError::Validation(format!(
                "key_bits must be at least 8, got {}",
                self.key_bits
            )));
        }
        if self.key_bits % 2 != 0 {
            return Err(StegoError::Validation(format!(
                "key_bits must be even, got {}",
                self.key_bits
            )));
        }
        if self.mr_rounds == 0 {
            return Err(StegoError::Validation(
                "mr_rounds must be at least 1".to_string(),
            ));
        }
        if self.max_prime_attempts == 0 {
            return Err(StegoError::Validation(
                "max_prime_attempts must be at least 1".to_string(),
            ));
        }
        let modulus_bytes = (self.key_bits as usize).div_ceil(8);
        if modulus_bytes > self.key_field_width {
            return Err(StegoError::Validation(format!(
                "key_field_width {} cannot hold a {}-bit modulus",
                self.key_field_width, self.key_bits
            )));
        }
        Ok(())
    }
}

/// Load a TOML configuration file; absent fields take their defaults
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<StegoConfig> {
    let content = fs::read_to_string(path)?;
    let config: StegoConfig =
        toml::from_str(&content).map_err(|e| StegoError::Config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}
