//! P-521 public key parsing, encoding, and key agreement.
//!
//! Supports the SEC1 compressed (67-byte) and uncompressed (133-byte)
//! encodings. Parsing validates that the point lies on the curve.

use std::fmt;

use p521::elliptic_curve::sec1::ToEncodedPoint;
use p521::ProjectivePoint;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::EciesError;
use crate::private_key::PrivateKey;

/// Length of a compressed public key: a parity tag byte plus the 66-byte
/// X coordinate.
pub const PUBLIC_KEY_LENGTH_COMPRESSED: usize = 67;

/// Length of an uncompressed public key: the 0x04 tag byte plus the
/// 66-byte X and Y coordinates.
pub const PUBLIC_KEY_LENGTH_UNCOMPRESSED: usize = 133;

/// A P-521 public key.
///
/// Wraps a validated curve point and provides compressed/uncompressed
/// serialization and Diffie-Hellman key agreement.
#[derive(Clone, Debug)]
pub struct PublicKey {
    inner: p521::PublicKey,
}

impl PublicKey {
    /// Parse a public key from SEC1 bytes.
    ///
    /// Accepts both compressed (67-byte) and uncompressed (133-byte)
    /// encodings; the point is validated against the curve equation.
    ///
    /// # Arguments
    /// * `bytes` - SEC1-encoded public key bytes.
    ///
    /// # Returns
    /// `Ok(PublicKey)` on success, or [`EciesError::InvalidPublicKey`] if
    /// the length is wrong or the point is not on P-521.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EciesError> {
        if bytes.len() != PUBLIC_KEY_LENGTH_COMPRESSED
            && bytes.len() != PUBLIC_KEY_LENGTH_UNCOMPRESSED
        {
            return Err(EciesError::InvalidPublicKey(format!(
                "expected {PUBLIC_KEY_LENGTH_COMPRESSED} or {PUBLIC_KEY_LENGTH_UNCOMPRESSED} bytes, got {}",
                bytes.len()
            )));
        }
        let inner = p521::PublicKey::from_sec1_bytes(bytes)
            .map_err(|_| EciesError::InvalidPublicKey("point is not on the curve".to_string()))?;
        Ok(PublicKey { inner })
    }

    /// Parse a public key from a hex-encoded SEC1 string.
    ///
    /// # Arguments
    /// * `hex_str` - Hex of a compressed (134 chars) or uncompressed
    ///   (266 chars) key.
    ///
    /// # Returns
    /// `Ok(PublicKey)` on success, or an error if the hex or point is invalid.
    pub fn from_hex(hex_str: &str) -> Result<Self, EciesError> {
        let bytes =
            hex::decode(hex_str).map_err(|e| EciesError::InvalidPublicKey(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Serialize in compressed SEC1 format (67 bytes).
    ///
    /// The first byte is 0x02 (even Y) or 0x03 (odd Y), followed by the
    /// 66-byte X coordinate.
    pub fn to_compressed(&self) -> [u8; PUBLIC_KEY_LENGTH_COMPRESSED] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; PUBLIC_KEY_LENGTH_COMPRESSED];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize in uncompressed SEC1 format (133 bytes).
    ///
    /// The first byte is 0x04, followed by the 66-byte X and Y coordinates.
    pub fn to_uncompressed(&self) -> [u8; PUBLIC_KEY_LENGTH_UNCOMPRESSED] {
        let point = self.inner.to_encoded_point(false);
        let mut out = [0u8; PUBLIC_KEY_LENGTH_UNCOMPRESSED];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize as a lowercase hex string of the compressed encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// Compute the Diffie-Hellman shared secret with a private key.
    ///
    /// Returns the big-endian X coordinate of the shared point with
    /// leading zero bytes trimmed. The trimming is part of the wire
    /// contract; pass the result through [`Self::derive_key`] or the
    /// stream KDF before using it as an encryption key.
    pub fn ecdh(&self, private_key: &PrivateKey) -> Zeroizing<Vec<u8>> {
        private_key.ecdh(self)
    }

    /// Derive a 32-byte encryption key from the shared secret with a
    /// private key, by passing [`Self::ecdh`] through the KDF.
    pub fn derive_key(&self, private_key: &PrivateKey) -> Zeroizing<[u8; 32]> {
        private_key.derive_key(self)
    }

    /// Wrap an already-validated curve key.
    pub(crate) fn from_inner(inner: p521::PublicKey) -> Self {
        PublicKey { inner }
    }

    /// Convert to a projective point for scalar multiplication.
    pub(crate) fn as_projective(&self) -> ProjectivePoint {
        ProjectivePoint::from(*self.inner.as_affine())
    }
}

impl PartialEq for PublicKey {
    /// Constant-time comparison over the uncompressed (X, Y) encoding.
    fn eq(&self, other: &Self) -> bool {
        self.to_uncompressed()
            .as_slice()
            .ct_eq(other.to_uncompressed().as_slice())
            .into()
    }
}

impl Eq for PublicKey {}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
