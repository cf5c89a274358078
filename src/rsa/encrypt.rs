// RSA Encryption Implementation
// Textbook RSA over a message read as one big-endian integer

use super::bigint::{from_bytes, mod_pow, RsaBigInt};
use super::keygen::RsaPublicKey;
use crate::error::{Result, StegoError};

/// Encrypt bytes using RSA public key
/// Returns the cipher integer c = m^e mod n
pub fn encrypt_bytes(plaintext: &[u8], public_key: &RsaPublicKey) -> Result<RsaBigInt> {
    if public_key.n < RsaBigInt::from(2u8) {
        return Err(StegoError::Validation(
            "public key modulus must be at least 2".to_string(),
        ));
    }

    let m = from_bytes(plaintext);

    // m must stay below n, otherwise the result silently wraps
    let message_bits = m.bits();
    let modulus_bits = public_key.bit_length();
    if message_bits >= modulus_bits {
        return Err(StegoError::MessageTooLarge {
            message_bits,
            modulus_bits,
        });
    }

    Ok(mod_pow(&m, &public_key.e, &public_key.n))
}

/// Encrypt a string using RSA public key
pub fn encrypt_string(plaintext: &str, public_key: &RsaPublicKey) -> Result<RsaBigInt> {
    encrypt_bytes(plaintext.as_bytes(), public_key)
}

/// Largest message, in bytes, that always fits under this key's modulus
pub fn max_message_bytes(public_key: &RsaPublicKey) -> usize {
    (public_key.bit_length().saturating_sub(1) / 8) as usize
}
