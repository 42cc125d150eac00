//! Streaming encrypt-then-MAC with AES-256-CTR and HMAC-SHA-512.
//!
//! Output layout is `IV || ciphertext || MAC`, where the MAC covers
//! `IV || ciphertext` (never any part of itself). Encryption runs in
//! constant memory; decryption buffers at most one window of
//! `STREAM_BUFFER_SIZE + STREAM_MAC_LENGTH` bytes so it can withhold the
//! trailing MAC from the plaintext without rewinding the input.

use std::io::{Read, Write};

use ctr::cipher::{KeyIvInit, StreamCipher};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::error::EciesError;
use crate::kdf::crypto_kdf;

/// Number of content bytes processed per iteration.
pub const STREAM_BUFFER_SIZE: usize = 4096;

/// Length of the AES-CTR initialization vector.
pub const STREAM_IV_LENGTH: usize = 16;

/// Length of the trailing HMAC-SHA-512 authentication tag.
pub const STREAM_MAC_LENGTH: usize = 64;

/// Decryption window: one buffer of ciphertext plus the provisional MAC.
const WINDOW_SIZE: usize = STREAM_BUFFER_SIZE + STREAM_MAC_LENGTH;

type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;
type HmacSha512 = Hmac<Sha512>;

/// Encrypt an arbitrary-length input stream, deriving the AES and HMAC
/// keys from `secret` with [`crypto_kdf`].
pub fn encrypt_stream_simple<R: Read, W: Write>(
    input: R,
    output: W,
    secret: &[u8],
) -> Result<(), EciesError> {
    let (aes_key, hmac_key) = crypto_kdf(secret);
    encrypt_stream(input, output, &aes_key, &hmac_key)
}

/// Decrypt an arbitrary-length input stream, deriving the AES and HMAC
/// keys from `secret` with [`crypto_kdf`].
pub fn decrypt_stream_simple<R: Read, W: Write>(
    input: R,
    output: W,
    secret: &[u8],
) -> Result<(), EciesError> {
    let (aes_key, hmac_key) = crypto_kdf(secret);
    decrypt_stream(input, output, &aes_key, &hmac_key)
}

/// Encrypt an input stream with AES-256-CTR, authenticated with
/// HMAC-SHA-512 over `IV || ciphertext`.
///
/// Writes the random IV, the ciphertext, and finally the 64-byte MAC.
/// Working memory is one [`STREAM_BUFFER_SIZE`] buffer regardless of
/// input length.
pub fn encrypt_stream<R: Read, W: Write>(
    mut input: R,
    mut output: W,
    aes_key: &[u8; 32],
    hmac_key: &[u8; 32],
) -> Result<(), EciesError> {
    let mut iv = [0u8; STREAM_IV_LENGTH];
    OsRng
        .try_fill_bytes(&mut iv)
        .map_err(|err| EciesError::RandomSource(err.to_string()))?;

    let mut cipher = Aes256Ctr::new(aes_key.into(), (&iv).into());
    let mut mac = HmacSha512::new_from_slice(hmac_key).expect("HMAC accepts any key length");

    // The IV goes to the output stream and into the MAC, in that order
    // everywhere below: bytes are written exactly as they are absorbed.
    output.write_all(&iv)?;
    mac.update(&iv);

    let mut buffer = Zeroizing::new([0u8; STREAM_BUFFER_SIZE]);
    loop {
        let n = input.read(&mut buffer[..])?;
        if n == 0 {
            break;
        }
        cipher.apply_keystream(&mut buffer[..n]);
        output.write_all(&buffer[..n])?;
        mac.update(&buffer[..n]);
    }

    output.write_all(&mac.finalize().into_bytes())?;
    Ok(())
}

/// Decrypt an input stream produced by [`encrypt_stream`], verifying the
/// trailing MAC.
///
/// The trailing [`STREAM_MAC_LENGTH`] bytes of the input are the MAC, not
/// ciphertext, and the input cannot be rewound. The loop therefore keeps a
/// window of [`STREAM_BUFFER_SIZE`] + [`STREAM_MAC_LENGTH`] bytes: the
/// last [`STREAM_MAC_LENGTH`] buffered bytes are provisionally the MAC and
/// are never decrypted; everything before them is ciphertext. Once the
/// input is exhausted the withheld tail is the real MAC.
///
/// Plaintext is written to `output` progressively, before the MAC has been
/// checked. On [`EciesError::InvalidMac`] the caller must discard
/// everything written; do not act on the output until this function
/// returns `Ok`.
pub fn decrypt_stream<R: Read, W: Write>(
    mut input: R,
    mut output: W,
    aes_key: &[u8; 32],
    hmac_key: &[u8; 32],
) -> Result<(), EciesError> {
    let mut iv = [0u8; STREAM_IV_LENGTH];
    input
        .read_exact(&mut iv)
        .map_err(EciesError::from_read_error)?;

    let mut cipher = Aes256Ctr::new(aes_key.into(), (&iv).into());
    let mut mac = HmacSha512::new_from_slice(hmac_key).expect("HMAC accepts any key length");
    mac.update(&iv);

    let mut window = Zeroizing::new([0u8; WINDOW_SIZE]);
    let mut filled = 0usize;
    let tag = loop {
        filled += fill_window(&mut input, &mut window[filled..])?;

        if filled == WINDOW_SIZE {
            // The window is full, so more input may follow: everything
            // ahead of the withheld tail is known ciphertext.
            let data = &mut window[..STREAM_BUFFER_SIZE];
            mac.update(data);
            cipher.apply_keystream(data);
            output.write_all(data)?;

            // Slide the provisional MAC to the front and refill behind it.
            window.copy_within(STREAM_BUFFER_SIZE.., 0);
            filled = STREAM_MAC_LENGTH;
        } else {
            // Input exhausted: the final bytes are the real MAC.
            if filled < STREAM_MAC_LENGTH {
                return Err(EciesError::UnexpectedEof);
            }
            let (data, mac_bytes) = window[..filled].split_at_mut(filled - STREAM_MAC_LENGTH);
            if !data.is_empty() {
                mac.update(data);
                cipher.apply_keystream(data);
                output.write_all(data)?;
            }
            let mut tag = [0u8; STREAM_MAC_LENGTH];
            tag.copy_from_slice(mac_bytes);
            break tag;
        }
    };

    mac.verify_slice(&tag).map_err(|_| EciesError::InvalidMac)
}

/// Read from `reader` until `buf` is full or the reader reports end of
/// input, and return how many bytes were read. A short read alone never
/// ends the fill; only a zero-length read does.
fn fill_window<R: Read>(reader: &mut R, mut buf: &mut [u8]) -> Result<usize, EciesError> {
    let mut total = 0;
    while !buf.is_empty() {
        let n = reader.read(buf)?;
        if n == 0 {
            break;
        }
        total += n;
        buf = &mut buf[n..];
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STREAM_TEXT: &[u8] = b"Hello, World!";
    const STREAM_KEY: &[u8] = b"password123";

    /// A reader that hands out one byte at a time, to exercise short reads.
    struct OneByteReader<'a>(&'a [u8]);

    impl Read for OneByteReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.0.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.0[0];
            self.0 = &self.0[1..];
            Ok(1)
        }
    }

    fn random_keys() -> ([u8; 32], [u8; 32]) {
        let mut aes_key = [0u8; 32];
        let mut hmac_key = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut aes_key);
        rand::thread_rng().fill_bytes(&mut hmac_key);
        (aes_key, hmac_key)
    }

    fn random_plaintext(len: usize) -> Vec<u8> {
        let mut plaintext = vec![0u8; len];
        rand::thread_rng().fill_bytes(&mut plaintext);
        plaintext
    }

    #[test]
    fn test_streams_simple() {
        let mut ciphertext = Vec::new();
        encrypt_stream_simple(STREAM_TEXT, &mut ciphertext, STREAM_KEY).unwrap();
        assert_eq!(
            ciphertext.len(),
            STREAM_IV_LENGTH + STREAM_TEXT.len() + STREAM_MAC_LENGTH
        );

        let mut plaintext = Vec::new();
        decrypt_stream_simple(ciphertext.as_slice(), &mut plaintext, STREAM_KEY).unwrap();
        assert_eq!(plaintext, STREAM_TEXT);
    }

    #[test]
    fn test_streams_with_explicit_keys() {
        let (aes_key, hmac_key) = random_keys();

        let mut ciphertext = Vec::new();
        encrypt_stream(STREAM_TEXT, &mut ciphertext, &aes_key, &hmac_key).unwrap();

        let mut plaintext = Vec::new();
        decrypt_stream(ciphertext.as_slice(), &mut plaintext, &aes_key, &hmac_key).unwrap();
        assert_eq!(plaintext, STREAM_TEXT);
    }

    /// Lengths straddling every window boundary the decryptor cares about.
    #[test]
    fn test_round_trip_at_window_boundaries() {
        let sizes = [
            0,
            1,
            STREAM_MAC_LENGTH,
            STREAM_BUFFER_SIZE - 1,
            STREAM_BUFFER_SIZE,
            STREAM_BUFFER_SIZE + 1,
            WINDOW_SIZE - 1,
            WINDOW_SIZE,
            WINDOW_SIZE + 1,
            3 * STREAM_BUFFER_SIZE + 17,
        ];
        for size in sizes {
            let plaintext = random_plaintext(size);

            let mut ciphertext = Vec::new();
            encrypt_stream_simple(plaintext.as_slice(), &mut ciphertext, STREAM_KEY).unwrap();
            assert_eq!(
                ciphertext.len(),
                STREAM_IV_LENGTH + size + STREAM_MAC_LENGTH,
                "size={size}"
            );

            let mut recovered = Vec::new();
            decrypt_stream_simple(ciphertext.as_slice(), &mut recovered, STREAM_KEY).unwrap();
            assert_eq!(recovered, plaintext, "size={size}");
        }
    }

    #[test]
    fn test_round_trip_one_mebibyte() {
        let plaintext = random_plaintext(1 << 20);

        let mut ciphertext = Vec::new();
        encrypt_stream_simple(plaintext.as_slice(), &mut ciphertext, STREAM_KEY).unwrap();

        let mut recovered = Vec::new();
        decrypt_stream_simple(ciphertext.as_slice(), &mut recovered, STREAM_KEY).unwrap();
        assert_eq!(recovered, plaintext);
    }

    /// Short reads from the input must not be mistaken for end of stream.
    #[test]
    fn test_decrypt_survives_one_byte_reads() {
        let plaintext = random_plaintext(STREAM_BUFFER_SIZE + 5);

        let mut ciphertext = Vec::new();
        encrypt_stream_simple(plaintext.as_slice(), &mut ciphertext, STREAM_KEY).unwrap();

        let mut recovered = Vec::new();
        decrypt_stream_simple(OneByteReader(&ciphertext), &mut recovered, STREAM_KEY).unwrap();
        assert_eq!(recovered, plaintext);
    }

    /// Flipping any bit in the IV, body, or MAC region breaks the MAC.
    #[test]
    fn test_tampering_is_detected() {
        let plaintext = random_plaintext(256);
        let mut ciphertext = Vec::new();
        encrypt_stream_simple(plaintext.as_slice(), &mut ciphertext, STREAM_KEY).unwrap();

        let positions = [
            0,                    // first IV byte
            STREAM_IV_LENGTH,     // first ciphertext byte
            STREAM_IV_LENGTH + 255,
            ciphertext.len() - STREAM_MAC_LENGTH, // first MAC byte
            ciphertext.len() - 1,                 // last MAC byte
        ];
        for position in positions {
            let mut tampered = ciphertext.clone();
            tampered[position] ^= 0x01;

            let mut sink = Vec::new();
            let err = decrypt_stream_simple(tampered.as_slice(), &mut sink, STREAM_KEY)
                .expect_err("tampered ciphertext must not verify");
            assert!(matches!(err, EciesError::InvalidMac), "position={position}");
        }
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let mut ciphertext = Vec::new();
        encrypt_stream_simple(STREAM_TEXT, &mut ciphertext, STREAM_KEY).unwrap();

        let mut sink = Vec::new();
        let err = decrypt_stream_simple(ciphertext.as_slice(), &mut sink, b"password124")
            .expect_err("wrong secret must not verify");
        assert!(matches!(err, EciesError::InvalidMac));
    }

    /// Anything shorter than IV + MAC can never be a valid stream.
    #[test]
    fn test_truncated_streams_are_unexpected_eof() {
        let mut ciphertext = Vec::new();
        encrypt_stream_simple(STREAM_TEXT, &mut ciphertext, STREAM_KEY).unwrap();

        for len in [0, 1, STREAM_IV_LENGTH - 1, STREAM_IV_LENGTH, STREAM_IV_LENGTH + STREAM_MAC_LENGTH - 1] {
            let mut sink = Vec::new();
            let err = decrypt_stream_simple(&ciphertext[..len], &mut sink, STREAM_KEY)
                .expect_err("truncated ciphertext must not verify");
            assert!(matches!(err, EciesError::UnexpectedEof), "len={len}");
        }
    }

    /// Truncating whole trailing chunks still fails, even though the
    /// remaining length is plausible.
    #[test]
    fn test_truncated_tail_is_detected() {
        let plaintext = random_plaintext(2 * STREAM_BUFFER_SIZE);
        let mut ciphertext = Vec::new();
        encrypt_stream_simple(plaintext.as_slice(), &mut ciphertext, STREAM_KEY).unwrap();

        let truncated = &ciphertext[..ciphertext.len() - STREAM_BUFFER_SIZE];
        let mut sink = Vec::new();
        let err = decrypt_stream_simple(truncated, &mut sink, STREAM_KEY)
            .expect_err("truncated ciphertext must not verify");
        assert!(matches!(err, EciesError::InvalidMac));
    }
}
