/// Unified error type for all primitives operations.
///
/// Covers key parsing, point decoding, signing and recovery, encoding, and
/// the randomness source.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PrimitivesError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("point not on curve")]
    InvalidPoint,

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid recovery id: {0}, expected 0..=3")]
    InvalidRecoveryId(u8),

    #[error("header byte out of range: {0}")]
    InvalidHeaderByte(u8),

    #[error("could not recover public key from signature")]
    RecoveryFailed,

    #[error("could not construct a recoverable key: no recovery id matches the signing key")]
    SignatureConsistency,

    #[error("invalid key length: expected {expected}, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("random source failure: {0}")]
    RandomSource(String),
}

impl From<hex::FromHexError> for PrimitivesError {
    fn from(e: hex::FromHexError) -> Self {
        PrimitivesError::InvalidHex(e.to_string())
    }
}
