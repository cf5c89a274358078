// Error Types
// Failure taxonomy shared by key generation, the cipher and the image codec

use thiserror::Error;

/// Errors produced by the library.
///
/// "No hidden message" is not an error: extraction reports it as `None`.
#[derive(Error, Debug)]
pub enum StegoError {
    /// Malformed or missing input at the boundary
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Payload does not fit into the image's LSB capacity.
    /// A message too large for the RSA modulus is `MessageTooLarge`.
    #[error("Image too small: need {needed} bits, capacity is {available} bits")]
    Capacity { needed: usize, available: usize },

    /// Message integer would wrap around the modulus; see also `Capacity`
    #[error("Message too large: {message_bits} bits does not fit a {modulus_bits}-bit modulus")]
    MessageTooLarge { message_bits: u64, modulus_bits: u64 },

    #[error("Arithmetic error: {0}")]
    Arithmetic(String),

    /// Malformed key buffer or undecodable plaintext
    #[error("Format error: {0}")]
    Format(String),

    #[error("No {bits}-bit prime found after {attempts} candidates")]
    PrimeSearchExhausted { bits: u32, attempts: u64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, StegoError>;
