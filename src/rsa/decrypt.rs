// RSA Decryption Implementation
// Recovers the message integer and decodes it back to bytes or text

use super::bigint::{mod_pow, to_bytes, RsaBigInt};
use super::keygen::RsaPrivateKey;
use crate::error::{Result, StegoError};

/// Decrypt a cipher integer using RSA private key
/// Returns the minimal big-endian bytes of m = c^d mod n
pub fn decrypt_bytes(cipher: &RsaBigInt, private_key: &RsaPrivateKey) -> Result<Vec<u8>> {
    if private_key.n < RsaBigInt::from(2u8) {
        return Err(StegoError::Validation(
            "private key modulus must be at least 2".to_string(),
        ));
    }
    if cipher >= &private_key.n {
        return Err(StegoError::Validation(format!(
            "ciphertext ({} bits) is not below the {}-bit modulus",
            cipher.bits(),
            private_key.bit_length()
        )));
    }

    let m = mod_pow(cipher, &private_key.d, &private_key.n);
    Ok(to_bytes(&m))
}

/// Decrypt a cipher integer to a string
pub fn decrypt_to_string(cipher: &RsaBigInt, private_key: &RsaPrivateKey) -> Result<String> {
    let plaintext = decrypt_bytes(cipher, private_key)?;
    String::from_utf8(plaintext).map_err(|e| StegoError::Format(format!("Invalid UTF-8: {}", e)))
}
