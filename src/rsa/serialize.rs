// Key Serialization
// Fixed-width big-endian layout: first component || modulus, W bytes each

use super::bigint::{from_bytes, RsaBigInt};
use super::keygen::{RsaPrivateKey, RsaPublicKey};
use crate::error::{Result, StegoError};

/// Bytes per integer field (moduli up to 2048 bits)
pub const KEY_FIELD_WIDTH: usize = 256;

/// Write `value` big-endian into exactly `width` bytes
fn write_field(value: &RsaBigInt, width: usize, out: &mut Vec<u8>) -> Result<()> {
    let bytes = value.to_bytes_be();
    // to_bytes_be() yields [0] for zero
    let bytes: &[u8] = if bytes == [0] { &[] } else { &bytes };

    if bytes.len() > width {
        return Err(StegoError::Format(format!(
            "{}-byte integer does not fit a {}-byte field",
            bytes.len(),
            width
        )));
    }

    out.resize(out.len() + width - bytes.len(), 0);
    out.extend_from_slice(bytes);
    Ok(())
}

/// Pack two integers into a `2 * width` byte buffer
pub fn pack(a: &RsaBigInt, b: &RsaBigInt, width: usize) -> Result<Vec<u8>> {
    if width == 0 {
        return Err(StegoError::Validation("field width must be positive".to_string()));
    }

    let mut buffer = Vec::with_capacity(2 * width);
    write_field(a, width, &mut buffer)?;
    write_field(b, width, &mut buffer)?;
    Ok(buffer)
}

/// Split a `2 * width` byte buffer back into its two integers
pub fn unpack(buffer: &[u8], width: usize) -> Result<(RsaBigInt, RsaBigInt)> {
    if width == 0 {
        return Err(StegoError::Validation("field width must be positive".to_string()));
    }
    if buffer.len() != 2 * width {
        return Err(StegoError::Format(format!(
            "Invalid key buffer length: expected {} bytes, got {}",
            2 * width,
            buffer.len()
        )));
    }

    let (first, second) = buffer.split_at(width);
    Ok((from_bytes(first), from_bytes(second)))
}

pub fn pack_public_key(key: &RsaPublicKey, width: usize) -> Result<Vec<u8>> {
    pack(&key.e, &key.n, width)
}

pub fn pack_private_key(key: &RsaPrivateKey, width: usize) -> Result<Vec<u8>> {
    pack(&key.d, &key.n, width)
}

pub fn unpack_public_key(buffer: &[u8], width: usize) -> Result<RsaPublicKey> {
    let (e, n) = unpack(buffer, width)?;
    Ok(RsaPublicKey::new(e, n))
}

pub fn unpack_private_key(buffer: &[u8], width: usize) -> Result<RsaPrivateKey> {
    let (d, n) = unpack(buffer, width)?;
    Ok(RsaPrivateKey::new(d, n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StegoConfig;
    use crate::rsa::bigint::from_u64;
    use crate::rsa::keygen::generate_default_keypair;

    #[test]
    fn test_pack_layout() {
        let buffer = pack(&from_u64(65537), &from_u64(0xd031), 4).unwrap();
        assert_eq!(buffer, vec![0, 1, 0, 1, 0, 0, 0xd0, 0x31]);
    }

    #[test]
    fn test_pack_zero() {
        let buffer = pack(&from_u64(0), &from_u64(1), 2).unwrap();
        assert_eq!(buffer, vec![0, 0, 0, 1]);
    }

    #[test]
    fn test_pack_overflow() {
        let result = pack(&from_u64(0x1_0000), &from_u64(1), 2);
        assert!(matches!(result, Err(StegoError::Format(_))));
    }

    #[test]
    fn test_unpack_wrong_length() {
        assert!(matches!(unpack(&[0u8; 511], KEY_FIELD_WIDTH), Err(StegoError::Format(_))));
        assert!(matches!(unpack(&[0u8; 513], KEY_FIELD_WIDTH), Err(StegoError::Format(_))));
        assert!(unpack(&[0u8; 512], KEY_FIELD_WIDTH).is_ok());
    }

    #[test]
    fn test_private_key_buffer() {
        let keypair = generate_default_keypair().unwrap();
        let width = StegoConfig::default().key_field_width;

        let buffer = pack_private_key(&keypair.private_key, width).unwrap();
        assert_eq!(buffer.len(), 512);
        // 1023-bit modulus takes 128 bytes, right-aligned in its 256-byte field
        assert!(buffer[256..384].iter().all(|&b| b == 0));
        assert_eq!(buffer[384], 0x40);

        let restored = unpack_private_key(&buffer, width).unwrap();
        assert_eq!(restored, keypair.private_key);
    }

    #[test]
    fn test_public_key_buffer() {
        let keypair = generate_default_keypair().unwrap();

        let buffer = pack_public_key(&keypair.public_key, KEY_FIELD_WIDTH).unwrap();
        assert_eq!(&buffer[253..256], &[0x01, 0x00, 0x01]);
        assert!(buffer[..253].iter().all(|&b| b == 0));

        let restored = unpack_public_key(&buffer, KEY_FIELD_WIDTH).unwrap();
        assert_eq!(restored, keypair.public_key);
    }
}
