// RSA Module - Main module file
// Exports all RSA-related functionality

pub mod bigint;
pub mod decrypt;
pub mod encrypt;
pub mod keygen;
pub mod random;
pub mod serialize;

pub use decrypt::{decrypt_bytes, decrypt_to_string};
pub use encrypt::{encrypt_bytes, encrypt_string, max_message_bytes};
pub use keygen::{
    generate_default_keypair, generate_keypair, generate_seeded_keypair, RsaKeyPair,
    RsaPrivateKey, RsaPublicKey,
};
pub use random::{EntropyRandom, RandomSource, SimpleRandom};
pub use serialize::{pack, unpack, KEY_FIELD_WIDTH};
