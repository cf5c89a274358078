// RSA Big Integer Operations
// Wrapper around num-bigint for RSA-specific operations

use log::debug;
use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use super::random::RandomSource;
use crate::error::{Result, StegoError};

/// RSA Big Integer type alias
pub type RsaBigInt = BigUint;

/// Default number of Miller-Rabin rounds (false positive rate <= 4^-40)
pub const DEFAULT_MR_ROUNDS: u32 = 40;

/// Create a big integer from u64
pub fn from_u64(n: u64) -> RsaBigInt {
    RsaBigInt::from(n)
}

/// Create a big integer from bytes (big-endian)
pub fn from_bytes(bytes: &[u8]) -> RsaBigInt {
    RsaBigInt::from_bytes_be(bytes)
}

/// Minimal big-endian bytes; zero encodes as the empty slice
pub fn to_bytes(n: &RsaBigInt) -> Vec<u8> {
    if n.is_zero() {
        return Vec::new();
    }
    n.to_bytes_be()
}

/// Modular exponentiation: base^exp mod modulus
pub fn mod_pow(base: &RsaBigInt, exp: &RsaBigInt, modulus: &RsaBigInt) -> RsaBigInt {
    if modulus.is_one() {
        return RsaBigInt::zero();
    }

    // num-bigint switches to Montgomery multiplication for odd moduli
    base.modpow(exp, modulus)
}

/// Compute modular inverse: a^(-1) mod m
/// Returns None if inverse doesn't exist
pub fn mod_inverse(a: &RsaBigInt, m: &RsaBigInt) -> Option<RsaBigInt> {
    if m.is_zero() {
        return None;
    }

    // Iterative extended Euclid over signed integers
    let m_signed = BigInt::from_biguint(Sign::Plus, m.clone());
    let mut old_r = BigInt::from_biguint(Sign::Plus, a % m);
    let mut r = m_signed.clone();
    let mut old_s = BigInt::one();
    let mut s = BigInt::zero();

    while !r.is_zero() {
        let quotient = &old_r / &r;
        let next_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }

    if !old_r.is_one() {
        return None;
    }

    let mut result = old_s % &m_signed;
    if result.is_negative() {
        result += &m_signed;
    }
    result.to_biguint()
}

/// Greatest common divisor
pub fn gcd(a: &RsaBigInt, b: &RsaBigInt) -> RsaBigInt {
    a.gcd(b)
}

/// Miller-Rabin primality test
/// Witnesses are drawn from `rng` as `rng.next() mod (n - 2) + 2`
pub fn is_probable_prime<R: RandomSource>(n: &RsaBigInt, rounds: u32, rng: &mut R) -> bool {
    let two = RsaBigInt::from(2u8);
    if n < &two {
        return false;
    }
    if n == &two || n == &RsaBigInt::from(3u8) {
        return true;
    }
    if n.is_even() {
        return false;
    }

    // Write n-1 as s * 2^r with s odd
    let n_minus_one = n - 1u8;
    let mut s = n_minus_one.clone();
    let mut r = 0u32;
    while s.is_even() {
        s >>= 1;
        r += 1;
    }

    let n_minus_two = n - &two;

    'witness: for _ in 0..rounds {
        let a = from_u64(rng.next()) % &n_minus_two + &two;
        let mut x = mod_pow(&a, &s, n);

        if x.is_one() || x == n_minus_one {
            continue;
        }

        for _ in 1..r {
            x = mod_pow(&x, &two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }

        // Composite
        return false;
    }

    // Probably prime
    true
}

/// Search for a prime of exactly `bit_length` bits.
///
/// Each candidate is `(rng.next() mod 2^bits) | 2^(bits-1) | 1`. Gives up with
/// `PrimeSearchExhausted` after `max_attempts` rejected candidates.
pub fn random_prime<R: RandomSource>(
    bit_length: u32,
    rounds: u32,
    max_attempts: u64,
    rng: &mut R,
) -> Result<RsaBigInt> {
    if bit_length < 2 {
        return Err(StegoError::Validation(format!(
            "prime bit length must be at least 2, got {}",
            bit_length
        )));
    }

    let one = RsaBigInt::one();
    let bound = &one << bit_length;
    let top_bit = &one << (bit_length - 1);

    for attempt in 1..=max_attempts {
        let candidate = (from_u64(rng.next()) % &bound) | &top_bit | &one;

        if is_probable_prime(&candidate, rounds, rng) {
            debug!(
                "found {}-bit prime after {} candidate(s)",
                bit_length, attempt
            );
            return Ok(candidate);
        }
    }

    Err(StegoError::PrimeSearchExhausted {
        bits: bit_length,
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::random::SimpleRandom;

    #[test]
    fn test_mod_pow() {
        // 3^5 mod 7 = 243 mod 7 = 5
        let base = from_u64(3);
        let exp = from_u64(5);
        let modulus = from_u64(7);
        let result = mod_pow(&base, &exp, &modulus);
        assert_eq!(result, from_u64(5));
        assert_eq!(mod_pow(&base, &exp, &from_u64(1)), from_u64(0));
    }

    #[test]
    fn test_mod_inverse() {
        // 3 * 5 = 15 ≡ 1 mod 7, so inverse of 3 mod 7 is 5
        let a = from_u64(3);
        let m = from_u64(7);
        let inv = mod_inverse(&a, &m).unwrap();
        assert_eq!(inv, from_u64(5));

        // Verify: 3 * 5 = 15 ≡ 1 (mod 7)
        assert_eq!((a * inv) % m, from_u64(1));
    }

    #[test]
    fn test_mod_inverse_rsa_exponent() {
        let e = from_u64(65537);
        let phi = from_u64(238 * 222);
        let d = mod_inverse(&e, &phi).unwrap();
        assert_eq!((&e * &d) % &phi, from_u64(1));
        assert!(d < phi);
    }

    #[test]
    fn test_mod_inverse_missing() {
        assert_eq!(mod_inverse(&from_u64(6), &from_u64(9)), None);
        assert_eq!(mod_inverse(&from_u64(5), &from_u64(0)), None);
    }

    #[test]
    fn test_is_probable_prime_small_values() {
        let mut rng = SimpleRandom::new(42);
        assert!(!is_probable_prime(&from_u64(0), 40, &mut rng));
        assert!(!is_probable_prime(&from_u64(1), 40, &mut rng));
        assert!(is_probable_prime(&from_u64(2), 40, &mut rng));
        assert!(is_probable_prime(&from_u64(3), 40, &mut rng));
        assert!(!is_probable_prime(&from_u64(4), 40, &mut rng));
        assert!(is_probable_prime(&from_u64(5), 40, &mut rng));
    }

    #[test]
    fn test_is_probable_prime_across_seeds() {
        for seed in 0..200 {
            let mut rng = SimpleRandom::new(seed);
            assert!(is_probable_prime(&from_u64(61), DEFAULT_MR_ROUNDS, &mut rng));
            assert!(is_probable_prime(&from_u64(97), DEFAULT_MR_ROUNDS, &mut rng));
            assert!(is_probable_prime(&from_u64(7919), DEFAULT_MR_ROUNDS, &mut rng));
            assert!(!is_probable_prime(&from_u64(4), DEFAULT_MR_ROUNDS, &mut rng));
            assert!(!is_probable_prime(&from_u64(15), DEFAULT_MR_ROUNDS, &mut rng));
            // Fermat pseudoprime to base 2
            assert!(!is_probable_prime(&from_u64(341), DEFAULT_MR_ROUNDS, &mut rng));
            // Carmichael number
            assert!(!is_probable_prime(&from_u64(561), DEFAULT_MR_ROUNDS, &mut rng));
        }
    }

    #[test]
    fn test_random_prime_bit_length() {
        let mut rng = SimpleRandom::new(42);
        for bits in [8u32, 16, 32, 64, 128] {
            let p = random_prime(bits, DEFAULT_MR_ROUNDS, 100_000, &mut rng).unwrap();
            assert_eq!(p.bits(), bits as u64);
            assert!(p.is_odd());
        }
    }

    #[test]
    fn test_random_prime_known_values() {
        let mut rng = SimpleRandom::new(42);
        let p = random_prime(8, DEFAULT_MR_ROUNDS, 1000, &mut rng).unwrap();
        let q = random_prime(8, DEFAULT_MR_ROUNDS, 1000, &mut rng).unwrap();
        assert_eq!(p, from_u64(0xef));
        assert_eq!(q, from_u64(0xdf));
    }

    #[test]
    fn test_random_prime_rejects_one_bit() {
        let mut rng = SimpleRandom::new(1);
        assert!(matches!(
            random_prime(1, DEFAULT_MR_ROUNDS, 10, &mut rng),
            Err(StegoError::Validation(_))
        ));
    }

    #[test]
    fn test_random_prime_attempt_ceiling() {
        // 512-bit candidates are prime roughly once every few hundred draws
        let mut rng = SimpleRandom::new(42);
        let result = random_prime(512, DEFAULT_MR_ROUNDS, 1, &mut rng);
        assert!(matches!(
            result,
            Err(StegoError::PrimeSearchExhausted { bits: 512, attempts: 1 })
        ));
    }
}
