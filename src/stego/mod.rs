// Steganography Module
// LSB codec and the encrypt-then-embed pipeline built on it

pub mod lsb;
pub mod pipeline;

pub use lsb::{build_bitstream, capacity_bits, embed, extract, max_payload_bytes, TERMINATOR};
pub use pipeline::{hide_message, reveal_message, Carrier};
