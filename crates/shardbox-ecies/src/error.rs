/// Unified error type for all hybrid encryption operations.
#[derive(Debug, thiserror::Error)]
pub enum EciesError {
    /// The bytes do not decode to a point on P-521.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// The bytes do not yield a usable private scalar.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// The authentication tag did not match the ciphertext. Any plaintext
    /// already written by the decryptor must be discarded.
    #[error("invalid mac")]
    InvalidMac,

    /// The ciphertext ended before the IV and MAC could be read in full.
    #[error("unexpected end of stream")]
    UnexpectedEof,

    /// The OS random source failed.
    #[error("random source failure: {0}")]
    RandomSource(String),

    /// The underlying reader or writer failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl EciesError {
    /// Fold the EOF flavor of a read error into the stable taxonomy; other
    /// I/O failures pass through untouched.
    pub(crate) fn from_read_error(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            EciesError::UnexpectedEof
        } else {
            EciesError::Io(err)
        }
    }
}
