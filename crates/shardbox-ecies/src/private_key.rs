//! P-521 private key generation, parsing, and key agreement.

use std::fmt;

use p521::elliptic_curve::sec1::ToEncodedPoint;
use p521::elliptic_curve::{Field, PrimeField};
use p521::{FieldBytes, NonZeroScalar, Scalar};
use rand::rngs::OsRng;
use rand::RngCore;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use crate::error::EciesError;
use crate::kdf;
use crate::public_key::PublicKey;

/// Length of the fixed-width scalar encoding in bytes.
pub const PRIVATE_KEY_LENGTH: usize = 66;

/// A P-521 private key with its embedded public key.
///
/// The scalar `d` lies in `[1, n-1]` where `n` is the group order. The
/// public key `dG` is computed once at construction and carried along.
#[derive(Clone)]
pub struct PrivateKey {
    /// The private scalar.
    d: NonZeroScalar,
    /// The public point `dG`.
    public_key: PublicKey,
}

impl PrivateKey {
    /// Generate a new random P-521 key pair from the OS CSPRNG.
    ///
    /// Candidate scalars are drawn by rejection sampling: 66 random bytes
    /// masked down to 521 bits, retried until the value lands in
    /// `[1, n-1]`.
    ///
    /// # Returns
    /// `Ok(PrivateKey)`, or [`EciesError::RandomSource`] if the CSPRNG fails.
    pub fn generate() -> Result<Self, EciesError> {
        let mut bytes = FieldBytes::default();
        loop {
            OsRng
                .try_fill_bytes(bytes.as_mut_slice())
                .map_err(|err| EciesError::RandomSource(err.to_string()))?;
            // P-521 scalars are 521 bits; drop the excess 7 bits.
            bytes[0] &= 0x01;
            if let Some(d) = Option::<NonZeroScalar>::from(NonZeroScalar::from_repr(bytes.clone()))
            {
                bytes.as_mut_slice().zeroize();
                return Ok(Self::from_scalar(d));
            }
        }
    }

    /// Interpret big-endian bytes as the scalar `d` and derive `dG`.
    ///
    /// Any input length is accepted, and out-of-range values are reduced
    /// modulo the group order rather than rejected, so bytes produced by
    /// [`Self::to_bytes`] always round-trip. Inputs congruent to zero are
    /// the one exception: they cannot form a usable key.
    ///
    /// # Arguments
    /// * `bytes` - Big-endian scalar bytes, normally from [`Self::to_bytes`].
    ///
    /// # Returns
    /// `Ok(PrivateKey)`, or [`EciesError::InvalidPrivateKey`] if the
    /// scalar reduces to zero.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EciesError> {
        // Fold the bytes into the scalar field: d = d * 256 + b reduces
        // arbitrary-length big-endian input modulo the group order.
        let radix = Scalar::from(256u64);
        let mut d = Scalar::ZERO;
        for &byte in bytes {
            d = d * radix + Scalar::from(byte as u64);
        }
        let d = Option::<NonZeroScalar>::from(NonZeroScalar::new(d)).ok_or_else(|| {
            EciesError::InvalidPrivateKey("scalar reduces to zero".to_string())
        })?;
        Ok(Self::from_scalar(d))
    }

    /// Parse a private key from a hexadecimal string.
    pub fn from_hex(hex_str: &str) -> Result<Self, EciesError> {
        if hex_str.is_empty() {
            return Err(EciesError::InvalidPrivateKey(
                "private key hex is empty".to_string(),
            ));
        }
        let bytes =
            hex::decode(hex_str).map_err(|e| EciesError::InvalidPrivateKey(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Serialize the scalar as big-endian bytes, leading zeros trimmed.
    ///
    /// The trimmed big-integer form is the wire convention throughout this
    /// crate; the result is at most [`PRIVATE_KEY_LENGTH`] bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let repr = self.scalar().to_repr();
        trim_leading_zeros(repr.as_slice()).to_vec()
    }

    /// Serialize the scalar as a lowercase hexadecimal string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// The public key `dG` embedded in this key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Compute the Diffie-Hellman shared secret with a public key.
    ///
    /// Returns the big-endian X coordinate of `d * P` with leading zero
    /// bytes trimmed, never left-padded to 66 bytes. The trimming is part
    /// of the wire contract; use [`Self::derive_key`] before using the
    /// result as an encryption key.
    pub fn ecdh(&self, public_key: &PublicKey) -> Zeroizing<Vec<u8>> {
        let shared = (public_key.as_projective() * *self.scalar()).to_affine();
        let encoded = shared.to_encoded_point(false);
        // A valid public key times a non-zero scalar is never the
        // identity, so the X coordinate is always present.
        let x = encoded.x().map_or(&[] as &[u8], |x| x.as_slice());
        Zeroizing::new(trim_leading_zeros(x).to_vec())
    }

    /// Derive a 32-byte encryption key from the shared secret with a
    /// public key, by passing [`Self::ecdh`] through the KDF.
    pub fn derive_key(&self, public_key: &PublicKey) -> Zeroizing<[u8; 32]> {
        kdf::single_kdf(&self.ecdh(public_key))
    }

    fn from_scalar(d: NonZeroScalar) -> Self {
        let inner = p521::PublicKey::from_secret_scalar(&d);
        PrivateKey {
            d,
            public_key: PublicKey::from_inner(inner),
        }
    }

    /// View the private scalar as a plain field element.
    fn scalar(&self) -> &Scalar {
        self.d.as_ref()
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        // Overwrite the scalar's byte representation with zeros.
        let mut bytes = self.scalar().to_repr();
        bytes.as_mut_slice().zeroize();
    }
}

impl PartialEq for PrivateKey {
    /// Constant-time comparison over the fixed-width scalar encoding.
    fn eq(&self, other: &Self) -> bool {
        let a = self.scalar().to_repr();
        let b = other.scalar().to_repr();
        a.as_slice().ct_eq(b.as_slice()).into()
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the scalar.
        f.debug_struct("PrivateKey")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Strip the leading zero bytes off a big-endian integer encoding.
fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}
