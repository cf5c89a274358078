// RSA Steganography Library
// Deterministic RSA key generation and LSB hiding of encrypted messages in images

pub mod config;
pub mod error;
pub mod rsa;
pub mod stego;
pub mod util;

pub use config::{load_config, StegoConfig};
pub use error::{Result, StegoError};
