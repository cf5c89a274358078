// Message Hiding Pipeline
// Encrypts a message, hides the cipher integer in an image, and reverses both steps

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use log::{debug, info, warn};

use super::lsb;
use crate::error::{Result, StegoError};
use crate::rsa::bigint::RsaBigInt;
use crate::rsa::decrypt::decrypt_to_string;
use crate::rsa::encrypt::encrypt_string;
use crate::rsa::keygen::{RsaPrivateKey, RsaPublicKey};
use crate::util::file_ops::Progress;

/// An 8-bit RGB or RGBA pixel buffer that can carry a hidden payload
#[derive(Debug, Clone, PartialEq)]
pub enum Carrier {
    Rgb(RgbImage),
    Rgba(RgbaImage),
}

impl Carrier {
    /// Convert a decoded image, keeping its alpha channel if it has one
    pub fn from_dynamic(image: DynamicImage) -> Self {
        let color = image.color();
        if color.bytes_per_pixel() / color.channel_count() > 1 {
            warn!("{:?} image reduced to 8 bits per channel", color);
        }
        if color.has_alpha() {
            Carrier::Rgba(image.into_rgba8())
        } else {
            Carrier::Rgb(image.into_rgb8())
        }
    }

    /// Decode an image file of any supported format
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let image = image::open(&path)?;
        debug!("loaded {}", path.as_ref().display());
        Ok(Self::from_dynamic(image))
    }

    /// Decode an in-memory image of any supported format
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self::from_dynamic(image::load_from_memory(bytes)?))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Carrier::Rgb(image) => image.dimensions(),
            Carrier::Rgba(image) => image.dimensions(),
        }
    }

    /// Largest payload in bytes this image can hold
    pub fn max_payload_bytes(&self) -> usize {
        let (width, height) = self.dimensions();
        lsb::max_payload_bytes(width, height)
    }

    pub fn embed(&self, payload: &[u8], observer: &mut dyn FnMut(Progress)) -> Result<Self> {
        Ok(match self {
            Carrier::Rgb(image) => Carrier::Rgb(lsb::embed_with_progress(image, payload, observer)?),
            Carrier::Rgba(image) => Carrier::Rgba(lsb::embed_with_progress(image, payload, observer)?),
        })
    }

    pub fn extract(&self, observer: &mut dyn FnMut(Progress)) -> Result<Option<Vec<u8>>> {
        match self {
            Carrier::Rgb(image) => lsb::extract_with_progress(image, observer),
            Carrier::Rgba(image) => lsb::extract_with_progress(image, observer),
        }
    }

    /// Encode as PNG into memory
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        match self {
            Carrier::Rgb(image) => image.write_to(&mut cursor, ImageFormat::Png)?,
            Carrier::Rgba(image) => image.write_to(&mut cursor, ImageFormat::Png)?,
        }
        Ok(cursor.into_inner())
    }

    /// Save as PNG. Hidden bits only survive lossless storage, so any other
    /// extension is rejected.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let is_png = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("png"))
            .unwrap_or(false);
        if !is_png {
            return Err(StegoError::Validation(format!(
                "output {} must be a .png file",
                path.display()
            )));
        }

        match self {
            Carrier::Rgb(image) => image.save_with_format(path, ImageFormat::Png)?,
            Carrier::Rgba(image) => image.save_with_format(path, ImageFormat::Png)?,
        }
        debug!("saved {}", path.display());
        Ok(())
    }
}

/// Encrypt `message` and hide the cipher integer, as decimal digits, in a copy of `carrier`
pub fn hide_message(
    carrier: &Carrier,
    message: &str,
    public_key: &RsaPublicKey,
    observer: &mut dyn FnMut(Progress),
) -> Result<Carrier> {
    if message.is_empty() {
        return Err(StegoError::Validation("message must not be empty".to_string()));
    }

    let cipher = encrypt_string(message, public_key)?;
    let payload = cipher.to_str_radix(10).into_bytes();

    let stego = carrier.embed(&payload, observer)?;
    let (width, height) = carrier.dimensions();
    info!(
        "hid {}-digit ciphertext in {}x{} image",
        payload.len(),
        width,
        height
    );
    Ok(stego)
}

/// Recover and decrypt a message hidden by `hide_message`.
///
/// `Ok(None)` means the image carries no payload.
pub fn reveal_message(
    carrier: &Carrier,
    private_key: &RsaPrivateKey,
    observer: &mut dyn FnMut(Progress),
) -> Result<Option<String>> {
    let payload = match carrier.extract(observer)? {
        Some(payload) => payload,
        None => {
            info!("no hidden message found");
            return Ok(None);
        }
    };

    let cipher = RsaBigInt::parse_bytes(&payload, 10).ok_or_else(|| {
        StegoError::Format(format!(
            "hidden payload of {} bytes is not a decimal ciphertext",
            payload.len()
        ))
    })?;

    let message = decrypt_to_string(&cipher, private_key)?;
    info!("revealed {}-byte message", message.len());
    Ok(Some(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::keygen::{generate_default_keypair, RsaKeyPair};
    use image::{GrayImage, Luma, Rgb, Rgba};

    fn keypair() -> RsaKeyPair {
        generate_default_keypair().unwrap()
    }

    fn noisy_rgb(width: u32, height: u32) -> Carrier {
        Carrier::Rgb(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 31 + y * 17) as u8, (x * y) as u8, (x + y * 3) as u8])
        }))
    }

    #[test]
    fn test_hide_and_reveal() {
        let keypair = keypair();
        let carrier = noisy_rgb(64, 64);

        let stego = hide_message(&carrier, "Meet at dawn", &keypair.public_key, &mut |_| {}).unwrap();
        let message = reveal_message(&stego, &keypair.private_key, &mut |_| {}).unwrap();

        assert_eq!(message.as_deref(), Some("Meet at dawn"));
    }

    #[test]
    fn test_hide_and_reveal_through_png() {
        let keypair = keypair();
        let carrier = Carrier::Rgba(RgbaImage::from_pixel(48, 48, Rgba([90, 120, 150, 255])));

        let stego = hide_message(&carrier, "xin chào", &keypair.public_key, &mut |_| {}).unwrap();
        let png = stego.to_png_bytes().unwrap();
        let decoded = Carrier::from_bytes(&png).unwrap();

        assert_eq!(decoded, stego);
        let message = reveal_message(&decoded, &keypair.private_key, &mut |_| {}).unwrap();
        assert_eq!(message.as_deref(), Some("xin chào"));
    }

    #[test]
    fn test_image_too_small() {
        let keypair = keypair();
        let carrier = noisy_rgb(8, 8);

        let result = hide_message(&carrier, "hello", &keypair.public_key, &mut |_| {});
        assert!(matches!(result, Err(StegoError::Capacity { .. })));
    }

    #[test]
    fn test_message_too_large_for_key() {
        let keypair = keypair();
        let carrier = noisy_rgb(256, 256);
        let message = "x".repeat(200);

        let result = hide_message(&carrier, &message, &keypair.public_key, &mut |_| {});
        assert!(matches!(result, Err(StegoError::MessageTooLarge { .. })));
    }

    #[test]
    fn test_empty_message_rejected() {
        let keypair = keypair();
        let result = hide_message(&noisy_rgb(64, 64), "", &keypair.public_key, &mut |_| {});
        assert!(matches!(result, Err(StegoError::Validation(_))));
    }

    #[test]
    fn test_reveal_without_payload() {
        let keypair = keypair();
        let carrier = Carrier::Rgb(RgbImage::from_pixel(32, 32, Rgb([0, 0, 0])));

        let message = reveal_message(&carrier, &keypair.private_key, &mut |_| {}).unwrap();
        assert_eq!(message, None);
    }

    #[test]
    fn test_reveal_non_decimal_payload() {
        let keypair = keypair();
        let carrier = noisy_rgb(32, 32).embed(b"not digits", &mut |_| {}).unwrap();

        let result = reveal_message(&carrier, &keypair.private_key, &mut |_| {});
        assert!(matches!(result, Err(StegoError::Format(_))));
    }

    #[test]
    fn test_grayscale_source_becomes_rgb() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([77])));
        let carrier = Carrier::from_dynamic(image);

        assert!(matches!(carrier, Carrier::Rgb(_)));
        assert_eq!(carrier.dimensions(), (4, 4));
        assert_eq!(carrier.max_payload_bytes(), 4);
    }

    #[test]
    fn test_save_png_file() {
        let dir = tempfile::tempdir().unwrap();
        let keypair = keypair();
        let stego = hide_message(&noisy_rgb(64, 64), "on disk", &keypair.public_key, &mut |_| {}).unwrap();

        let path = dir.path().join("output_image_with_message.png");
        stego.save_png(&path).unwrap();
        let loaded = Carrier::open(&path).unwrap();

        let message = reveal_message(&loaded, &keypair.private_key, &mut |_| {}).unwrap();
        assert_eq!(message.as_deref(), Some("on disk"));
    }

    #[test]
    fn test_save_lossy_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let carrier = noisy_rgb(4, 4);

        let result = carrier.save_png(dir.path().join("out.jpg"));
        assert!(matches!(result, Err(StegoError::Validation(_))));
        assert!(!dir.path().join("out.jpg").exists());
    }
}
