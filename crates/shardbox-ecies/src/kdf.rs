//! Key derivation from Diffie-Hellman shared secrets.
//!
//! Both functions run HKDF-SHA-512 with an empty salt and empty info, so
//! the output depends on the input keying material alone. The two keys
//! [`crypto_kdf`] returns are consecutive 32-byte slices of a single HKDF
//! output stream; that order and contiguity are part of the wire contract.

use hkdf::Hkdf;
use sha2::Sha512;
use zeroize::Zeroizing;

/// Length in bytes of each derived key.
pub const DERIVED_KEY_LENGTH: usize = 32;

/// Derive a single 32-byte key safe to use for encryption from an
/// otherwise unsafe secret, such as a raw ECDH shared key.
pub fn single_kdf(secret: &[u8]) -> Zeroizing<[u8; DERIVED_KEY_LENGTH]> {
    let kdf = Hkdf::<Sha512>::new(None, secret);
    let mut key = Zeroizing::new([0u8; DERIVED_KEY_LENGTH]);
    kdf.expand(&[], key.as_mut_slice())
        .expect("32 bytes is a valid HKDF-SHA512 output length");
    key
}

/// Derive the AES key and the HMAC key for stream encryption from one
/// secret.
///
/// Stream encryption needs two keys but only one shared secret exists, so
/// both are taken from the same HKDF stream: the first 32 bytes are the
/// AES key, the next 32 the HMAC key.
pub fn crypto_kdf(
    secret: &[u8],
) -> (
    Zeroizing<[u8; DERIVED_KEY_LENGTH]>,
    Zeroizing<[u8; DERIVED_KEY_LENGTH]>,
) {
    let kdf = Hkdf::<Sha512>::new(None, secret);
    let mut stream = Zeroizing::new([0u8; 2 * DERIVED_KEY_LENGTH]);
    kdf.expand(&[], stream.as_mut_slice())
        .expect("64 bytes is a valid HKDF-SHA512 output length");

    let mut aes_key = Zeroizing::new([0u8; DERIVED_KEY_LENGTH]);
    let mut hmac_key = Zeroizing::new([0u8; DERIVED_KEY_LENGTH]);
    aes_key.copy_from_slice(&stream[..DERIVED_KEY_LENGTH]);
    hmac_key.copy_from_slice(&stream[DERIVED_KEY_LENGTH..]);
    (aes_key, hmac_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kdf_is_deterministic() {
        let a = single_kdf(b"password123");
        let b = single_kdf(b"password123");
        assert_eq!(*a, *b);

        let c = single_kdf(b"password124");
        assert_ne!(*a, *c);
    }

    /// The single key is the prefix of the two-key stream.
    #[test]
    fn test_single_kdf_is_the_crypto_kdf_prefix() {
        let single = single_kdf(b"shared secret");
        let (aes_key, hmac_key) = crypto_kdf(b"shared secret");

        assert_eq!(*single, *aes_key);
        assert_ne!(*aes_key, *hmac_key);
    }

    /// HKDF accepts the variable-length trimmed ECDH output.
    #[test]
    fn test_kdf_accepts_any_secret_length() {
        let short = single_kdf(&[0x01]);
        let long = single_kdf(&[0x42; 66]);
        assert_ne!(*short, *long);
    }
}
