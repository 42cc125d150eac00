//! Authenticated hybrid encryption (ECIES) on NIST P-521.
//!
//! Encrypts arbitrary-length byte streams to a recipient's public key:
//! an ephemeral Diffie-Hellman exchange on P-521, HKDF-SHA-512 key
//! derivation, AES-256-CTR stream encryption, and HMAC-SHA-512 in an
//! encrypt-then-MAC construction. The wire layout is
//! `[67-byte compressed ephemeral public key][16-byte IV][ciphertext][64-byte MAC]`.
//!
//! All operations are synchronous and blocking only on the caller's
//! reader and writer; encryption and decryption both run in a bounded
//! working buffer regardless of input size.

pub mod hybrid;
pub mod kdf;
pub mod private_key;
pub mod public_key;
pub mod stream;

mod error;

pub use error::EciesError;
pub use hybrid::{decrypt, decrypt_bytes, encrypt, encrypt_bytes};
pub use private_key::PrivateKey;
pub use public_key::PublicKey;
