//! Hybrid public-key encryption over the streaming cipher core.
//!
//! Encrypting to a public key generates an ephemeral P-521 key pair,
//! writes the ephemeral public key as a 67-byte compressed header, then
//! runs the shared ECDH secret through the stream encryptor. The full
//! layout is:
//!
//! ```text
//! [67-byte compressed ephemeral public key][16-byte IV][ciphertext...][64-byte MAC]
//! ```
//!
//! The sender key is ephemeral but the recipient key is static, so the
//! construction provides sender-forward-secrecy only, and nothing
//! authenticates the recipient to the sender.

use std::io::{Read, Write};

use crate::error::EciesError;
use crate::private_key::PrivateKey;
use crate::public_key::{PublicKey, PUBLIC_KEY_LENGTH_COMPRESSED};
use crate::stream::{
    decrypt_stream_simple, encrypt_stream_simple, STREAM_IV_LENGTH, STREAM_MAC_LENGTH,
};

/// Encrypt an input stream for a public key.
///
/// # Arguments
/// * `public_key` - The recipient's key.
/// * `input` - Plaintext source.
/// * `output` - Ciphertext sink; receives the header, IV, ciphertext, and MAC.
pub fn encrypt<R: Read, W: Write>(
    public_key: &PublicKey,
    input: R,
    mut output: W,
) -> Result<(), EciesError> {
    // Fresh ephemeral key per stream; its public half rides in the header.
    let ephemeral = PrivateKey::generate()?;
    output.write_all(&ephemeral.public_key().to_compressed())?;

    // The raw shared secret seeds the stream KDF, which derives the
    // actual AES and HMAC keys.
    let shared = ephemeral.ecdh(public_key);
    encrypt_stream_simple(input, output, &shared)
}

/// Decrypt an input stream with a private key.
///
/// Plaintext reaches `output` before the MAC is verified; discard it
/// unless this returns `Ok` (see [`crate::stream::decrypt_stream`]).
///
/// # Arguments
/// * `private_key` - The recipient's key.
/// * `input` - Ciphertext source starting at the 67-byte header.
/// * `output` - Plaintext sink.
pub fn decrypt<R: Read, W: Write>(
    private_key: &PrivateKey,
    mut input: R,
    output: W,
) -> Result<(), EciesError> {
    let mut header = [0u8; PUBLIC_KEY_LENGTH_COMPRESSED];
    input
        .read_exact(&mut header)
        .map_err(EciesError::from_read_error)?;
    let ephemeral = PublicKey::from_bytes(&header)?;

    let shared = private_key.ecdh(&ephemeral);
    decrypt_stream_simple(input, output, &shared)
}

/// Encrypt a byte slice for a public key.
pub fn encrypt_bytes(public_key: &PublicKey, data: &[u8]) -> Result<Vec<u8>, EciesError> {
    let mut output = Vec::with_capacity(
        PUBLIC_KEY_LENGTH_COMPRESSED + STREAM_IV_LENGTH + data.len() + STREAM_MAC_LENGTH,
    );
    encrypt(public_key, data, &mut output)?;
    Ok(output)
}

/// Decrypt a byte slice with a private key.
pub fn decrypt_bytes(private_key: &PrivateKey, data: &[u8]) -> Result<Vec<u8>, EciesError> {
    let mut output = Vec::new();
    decrypt(private_key, data, &mut output)?;
    Ok(output)
}
