//! secp256k1 private key.
//!
//! Wraps a k256 signing key; the scalar is always in [1, n − 1]. Fresh keys
//! are drawn from an injected [`RandomSource`] by rejection sampling.

use k256::ecdsa::SigningKey;
use k256::Scalar;
use zeroize::Zeroizing;

use crate::ec::curve;
use crate::ec::public_key::PublicKey;
use crate::ec::signature::Signature;
use crate::random::{OsRandom, RandomSource};
use crate::PrimitivesError;

/// Length of a serialized private key in bytes.
pub const PRIVATE_KEY_BYTES_LEN: usize = 32;

/// A secp256k1 private key.
///
/// Equality compares the 32-byte big-endian encoding.
#[derive(Clone)]
pub struct PrivateKey {
    inner: SigningKey,
}

impl PrivateKey {
    /// Generate a new random private key from operating system entropy.
    ///
    /// # Returns
    /// A new randomly generated `PrivateKey`, or an error if the OS source fails.
    pub fn new() -> Result<Self, PrimitivesError> {
        Self::generate(&mut OsRandom)
    }

    /// Draw a uniformly random private key from `rng`.
    ///
    /// Candidates outside [1, n − 1] are discarded and redrawn.
    ///
    /// # Arguments
    /// * `rng` - The randomness source to draw from.
    ///
    /// # Returns
    /// `Ok(PrivateKey)`, or the source's error.
    pub fn generate<R: RandomSource + ?Sized>(rng: &mut R) -> Result<Self, PrimitivesError> {
        let mut candidate = Zeroizing::new([0u8; PRIVATE_KEY_BYTES_LEN]);
        loop {
            rng.fill_bytes(&mut candidate[..])?;
            if curve::is_valid_scalar(&candidate) {
                return Self::from_bytes(&candidate[..]);
            }
        }
    }

    /// Create a private key from a raw 32-byte scalar.
    ///
    /// # Arguments
    /// * `bytes` - A 32-byte big-endian scalar.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` if the bytes encode a value in [1, n − 1], or an error
    /// for a wrong length, zero, or a value not below n.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != PRIVATE_KEY_BYTES_LEN {
            return Err(PrimitivesError::InvalidKeyLength {
                expected: PRIVATE_KEY_BYTES_LEN,
                got: bytes.len(),
            });
        }
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|_| PrimitivesError::InvalidPrivateKey("scalar not in [1, n-1]".to_string()))?;
        Ok(PrivateKey { inner: signing_key })
    }

    /// Create a private key from a hexadecimal string.
    ///
    /// # Arguments
    /// * `hex_str` - A 64-character hex string.
    ///
    /// # Returns
    /// `Ok(PrivateKey)` on success, or an error if the hex or the scalar is invalid.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        if hex_str.is_empty() {
            return Err(PrimitivesError::InvalidPrivateKey(
                "private key hex is empty".to_string(),
            ));
        }
        let bytes = Zeroizing::new(hex::decode(hex_str)?);
        Self::from_bytes(&bytes)
    }

    /// Create a private key from a non-zero k256 scalar.
    pub fn from_scalar(scalar: &Scalar) -> Result<Self, PrimitivesError> {
        let bytes = Zeroizing::new(curve::scalar_to_bytes(scalar));
        Self::from_bytes(&bytes[..])
    }

    /// Serialize the private key as a 32-byte big-endian array.
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_BYTES_LEN] {
        self.inner.to_bytes().into()
    }

    /// Serialize the private key as a lowercase hexadecimal string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Derive the public key scalar·G.
    pub fn pub_key(&self) -> PublicKey {
        PublicKey::from_k256_verifying_key(self.inner.verifying_key())
    }

    /// Sign a 32-byte message hash with a deterministic nonce.
    ///
    /// The result is in canonical low-s form.
    pub fn sign(&self, hash: &[u8; 32]) -> Result<Signature, PrimitivesError> {
        Signature::sign(hash, self)
    }

    /// The private scalar, for curve arithmetic.
    pub fn to_scalar(&self) -> Scalar {
        *self.inner.as_nonzero_scalar().as_ref()
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.inner
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PrivateKey {}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.pub_key().to_hex())
            .finish_non_exhaustive()
    }
}
