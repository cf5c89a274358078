// RSA Key Generation
// Derives an RSA key pair from two primes drawn from one random stream

use log::{debug, info};

use super::bigint::{from_u64, gcd, mod_inverse, random_prime, RsaBigInt};
use super::random::{RandomSource, SimpleRandom};
use crate::config::{StegoConfig, PUBLIC_EXPONENT};
use crate::error::{Result, StegoError};

/// RSA Public Key
#[derive(Debug, Clone, PartialEq)]
pub struct RsaPublicKey {
    pub e: RsaBigInt,  // Public exponent
    pub n: RsaBigInt,  // Modulus
}

/// RSA Private Key
#[derive(Debug, Clone, PartialEq)]
pub struct RsaPrivateKey {
    pub d: RsaBigInt,  // Private exponent
    pub n: RsaBigInt,  // Modulus (same as public)
}

/// RSA Key Pair (both public and private keys)
#[derive(Debug, Clone, PartialEq)]
pub struct RsaKeyPair {
    pub public_key: RsaPublicKey,
    pub private_key: RsaPrivateKey,
    pub p: RsaBigInt,
    pub q: RsaBigInt,
}

impl RsaPublicKey {
    pub fn new(e: RsaBigInt, n: RsaBigInt) -> Self {
        Self { e, n }
    }

    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }

    /// Encrypt a message using this public key
    pub fn encrypt(&self, message: &str) -> Result<RsaBigInt> {
        super::encrypt::encrypt_string(message, self)
    }
}

impl RsaPrivateKey {
    pub fn new(d: RsaBigInt, n: RsaBigInt) -> Self {
        Self { d, n }
    }

    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        self.n.bits()
    }

    /// Decrypt a cipher integer back to text
    pub fn decrypt(&self, cipher: &RsaBigInt) -> Result<String> {
        super::decrypt::decrypt_to_string(cipher, self)
    }
}

impl RsaKeyPair {
    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> u64 {
        self.public_key.bit_length()
    }
}

/// Generate an RSA key pair from `rng`.
///
/// p and q are drawn one after the other from the same stream, so a seeded
/// generator always reproduces the same key pair. e is fixed at 65537.
pub fn generate_keypair<R: RandomSource>(config: &StegoConfig, rng: &mut R) -> Result<RsaKeyPair> {
    config.validate()?;

    let half_bits = config.key_bits / 2;
    let rounds = config.mr_rounds;
    let attempts = config.max_prime_attempts;

    // Step 1: Generate two primes p and q from the shared stream
    let p = random_prime(half_bits, rounds, attempts, rng)?;
    let mut q = random_prime(half_bits, rounds, attempts, rng)?;

    let mut redraws = 0u64;
    while q == p {
        redraws += 1;
        if redraws >= attempts {
            return Err(StegoError::PrimeSearchExhausted {
                bits: half_bits,
                attempts,
            });
        }
        debug!("q collided with p, drawing again");
        q = random_prime(half_bits, rounds, attempts, rng)?;
    }

    // Step 2: Compute n = p * q
    let n = &p * &q;

    // Step 3: Compute φ(n) = (p-1)(q-1)
    let phi_n = (&p - 1u8) * (&q - 1u8);

    // Step 4: Verify e and φ(n) are coprime
    let e = from_u64(PUBLIC_EXPONENT);
    if gcd(&e, &phi_n) != from_u64(1) {
        return Err(StegoError::Arithmetic(format!(
            "e={} is not coprime with φ(n)",
            e
        )));
    }

    // Step 5: Compute d = e^(-1) mod φ(n)
    let d = mod_inverse(&e, &phi_n).ok_or_else(|| {
        StegoError::Arithmetic("Failed to compute modular inverse of e".to_string())
    })?;

    info!("generated {}-bit RSA key pair", n.bits());

    Ok(RsaKeyPair {
        public_key: RsaPublicKey::new(e, n.clone()),
        private_key: RsaPrivateKey::new(d, n),
        p,
        q,
    })
}

/// Generate a key pair from a fresh `SimpleRandom` seeded with `config.seed`
pub fn generate_seeded_keypair(config: &StegoConfig) -> Result<RsaKeyPair> {
    let mut rng = SimpleRandom::new(config.seed);
    generate_keypair(config, &mut rng)
}

/// Generate key pair with default settings (1024 bits, seed 42)
pub fn generate_default_keypair() -> Result<RsaKeyPair> {
    generate_seeded_keypair(&StegoConfig::default())
}
