// LSB Image Codec
// Hides a byte payload in the least significant bit of each pixel's R, G and B channels

use image::{ImageBuffer, Pixel};
use log::debug;

use crate::error::{Result, StegoError};
use crate::util::file_ops::Progress;

/// End-of-payload marker: fifteen ones followed by a zero
pub const TERMINATOR: [u8; 16] = [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0];

/// Channels per pixel that carry payload bits
pub const CARRIER_CHANNELS: usize = 3;

const TERMINATOR_WORD: u16 = 0xFFFE;

/// Expand `payload` into bits (MSB first per byte) followed by the terminator.
///
/// Each element of the result is 0 or 1.
pub fn build_bitstream(payload: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(payload.len() * 8 + TERMINATOR.len());
    for byte in payload {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1);
        }
    }
    bits.extend_from_slice(&TERMINATOR);
    bits
}

/// Number of bits an image of this size can carry
pub fn capacity_bits(width: u32, height: u32) -> usize {
    (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(CARRIER_CHANNELS)
}

/// Largest payload, in bytes, that fits together with the terminator
pub fn max_payload_bytes(width: u32, height: u32) -> usize {
    capacity_bits(width, height).saturating_sub(TERMINATOR.len()) / 8
}

fn check_channels<P: Pixel<Subpixel = u8>>() -> Result<usize> {
    let channels = P::CHANNEL_COUNT as usize;
    if channels < CARRIER_CHANNELS {
        return Err(StegoError::Validation(format!(
            "image needs at least {} channels per pixel, has {}",
            CARRIER_CHANNELS, channels
        )));
    }
    Ok(channels)
}

/// Embed `payload` into a copy of `image`
pub fn embed<P>(image: &ImageBuffer<P, Vec<u8>>, payload: &[u8]) -> Result<ImageBuffer<P, Vec<u8>>>
where
    P: Pixel<Subpixel = u8>,
{
    embed_with_progress(image, payload, &mut |_| {})
}

/// Embed `payload` into a copy of `image`, reporting each finished row.
///
/// Pixels are visited in row-major order; alpha and any channel past the
/// last payload bit keep their original values. Fails with `Capacity`
/// before touching any pixel if the bitstream does not fit.
pub fn embed_with_progress<P>(
    image: &ImageBuffer<P, Vec<u8>>,
    payload: &[u8],
    observer: &mut dyn FnMut(Progress),
) -> Result<ImageBuffer<P, Vec<u8>>>
where
    P: Pixel<Subpixel = u8>,
{
    let channels = check_channels::<P>()?;
    let (width, height) = image.dimensions();

    let bits = build_bitstream(payload);
    let available = capacity_bits(width, height);
    if bits.len() > available {
        return Err(StegoError::Capacity {
            needed: bits.len(),
            available,
        });
    }

    let mut output = image.clone();
    let row_len = width as usize * channels;
    let mut cursor = bits.iter();
    let mut remaining = bits.len();

    for (y, row) in output.chunks_mut(row_len).enumerate() {
        for pixel in row.chunks_mut(channels) {
            for (channel, &bit) in pixel[..CARRIER_CHANNELS].iter_mut().zip(cursor.by_ref()) {
                *channel = (*channel & !1) | bit;
                remaining -= 1;
            }
            if remaining == 0 {
                break;
            }
        }
        observer(Progress::new(y as u64 + 1, height as u64));
        if remaining == 0 {
            break;
        }
    }

    debug!(
        "embedded {} payload bytes ({} bits) into {}x{} image",
        payload.len(),
        bits.len(),
        width,
        height
    );
    Ok(output)
}

/// Recover a payload hidden by `embed`.
///
/// Returns `Ok(None)` when the whole image is scanned without meeting the
/// terminator. A payload whose own bits contain fifteen consecutive ones
/// followed by a zero is cut short there; UTF-8 text never does.
pub fn extract<P>(image: &ImageBuffer<P, Vec<u8>>) -> Result<Option<Vec<u8>>>
where
    P: Pixel<Subpixel = u8>,
{
    extract_with_progress(image, &mut |_| {})
}

/// `extract`, reporting each scanned row
pub fn extract_with_progress<P>(
    image: &ImageBuffer<P, Vec<u8>>,
    observer: &mut dyn FnMut(Progress),
) -> Result<Option<Vec<u8>>>
where
    P: Pixel<Subpixel = u8>,
{
    let channels = check_channels::<P>()?;
    let (width, height) = image.dimensions();
    let row_len = width as usize * channels;

    if row_len == 0 || height == 0 {
        return Ok(None);
    }

    let mut bytes: Vec<u8> = Vec::new();
    let mut current: u8 = 0;
    let mut bit_count: usize = 0;
    let mut window: u16 = 0;

    for (y, row) in image.chunks(row_len).enumerate() {
        for pixel in row.chunks(channels) {
            for channel in &pixel[..CARRIER_CHANNELS] {
                let bit = channel & 1;
                current = (current << 1) | bit;
                bit_count += 1;
                if bit_count % 8 == 0 {
                    bytes.push(current);
                    current = 0;
                }
                window = (window << 1) | bit as u16;

                if bit_count >= TERMINATOR.len() && window == TERMINATOR_WORD {
                    // Whole payload bytes only; a trailing partial byte is dropped
                    let payload_bits = bit_count - TERMINATOR.len();
                    bytes.truncate(payload_bits / 8);
                    observer(Progress::new(y as u64 + 1, height as u64));
                    debug!("terminator found after {} payload bits", payload_bits);
                    return Ok(Some(bytes));
                }
            }
        }
        observer(Progress::new(y as u64 + 1, height as u64));
    }

    debug!("no terminator in {}x{} image", width, height);
    Ok(None)
}
