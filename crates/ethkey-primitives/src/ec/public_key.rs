//! secp256k1 public key and account address.
//!
//! The canonical form of a public point is its 64-byte raw encoding (x ‖ y,
//! no SEC1 prefix). The account address is the last 20 bytes of the
//! Keccak-256 hash of that raw encoding.

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{self, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::ProjectivePoint;
use std::fmt;

use crate::ec::curve::{PREFIX_EVEN, PREFIX_ODD, PREFIX_UNCOMPRESSED};
use crate::ec::signature::Signature;
use crate::hash::keccak256;
use crate::PrimitivesError;

/// Length of a compressed public key (prefix + 32-byte x).
pub const COMPRESSED_LEN: usize = 33;

/// Length of an uncompressed public key (prefix + 32-byte x + 32-byte y).
pub const UNCOMPRESSED_LEN: usize = 65;

/// Length of the raw public key encoding (x ‖ y).
pub const RAW_LEN: usize = 64;

/// Length of an account address.
pub const ADDRESS_LEN: usize = 20;

/// A secp256k1 public key. Never the point at infinity.
///
/// Equality compares the compressed encoding.
#[derive(Clone, Copy, Debug)]
pub struct PublicKey {
    inner: VerifyingKey,
}

impl PublicKey {
    /// Create a public key from SEC1 bytes, compressed (33) or uncompressed (65).
    ///
    /// # Returns
    /// `Ok(PublicKey)` on success, or an error if the encoding is malformed or
    /// the point is not on the curve.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.is_empty() {
            return Err(PrimitivesError::InvalidPublicKey(
                "pubkey bytes are empty".to_string(),
            ));
        }
        let vk = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|_| PrimitivesError::InvalidPublicKey("malformed SEC1 point".to_string()))?;
        Ok(PublicKey { inner: vk })
    }

    /// Create a public key from its 64-byte raw encoding (x ‖ y, no prefix).
    pub fn from_raw(raw: &[u8]) -> Result<Self, PrimitivesError> {
        if raw.len() != RAW_LEN {
            return Err(PrimitivesError::InvalidKeyLength {
                expected: RAW_LEN,
                got: raw.len(),
            });
        }
        let mut sec1 = [0u8; UNCOMPRESSED_LEN];
        sec1[0] = PREFIX_UNCOMPRESSED;
        sec1[1..].copy_from_slice(raw);
        VerifyingKey::from_sec1_bytes(&sec1)
            .map(|inner| PublicKey { inner })
            .map_err(|_| PrimitivesError::InvalidPoint)
    }

    /// Recover the full point from a 33-byte compressed encoding.
    ///
    /// # Returns
    /// `PrimitivesError::InvalidPublicKey` for a bad length or prefix, or
    /// `PrimitivesError::InvalidPoint` if x has no matching y on the curve.
    pub fn decompress(compressed: &[u8]) -> Result<Self, PrimitivesError> {
        if compressed.len() != COMPRESSED_LEN {
            return Err(PrimitivesError::InvalidPublicKey(format!(
                "compressed key must be {} bytes, got {}",
                COMPRESSED_LEN,
                compressed.len()
            )));
        }
        if compressed[0] != PREFIX_EVEN && compressed[0] != PREFIX_ODD {
            return Err(PrimitivesError::InvalidPublicKey(format!(
                "bad compressed prefix 0x{:02x}",
                compressed[0]
            )));
        }
        VerifyingKey::from_sec1_bytes(compressed)
            .map(|inner| PublicKey { inner })
            .map_err(|_| PrimitivesError::InvalidPoint)
    }

    /// Create a public key from a hex-encoded SEC1 string.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitivesError> {
        let bytes = hex::decode(hex_str)?;
        Self::from_bytes(&bytes)
    }

    /// Create a public key from a curve point.
    ///
    /// # Returns
    /// `PrimitivesError::InvalidPoint` for the point at infinity.
    pub fn from_point(point: &ProjectivePoint) -> Result<Self, PrimitivesError> {
        VerifyingKey::from_affine(point.to_affine())
            .map(|inner| PublicKey { inner })
            .map_err(|_| PrimitivesError::InvalidPoint)
    }

    /// The key as a curve point, for group arithmetic.
    pub fn to_point(&self) -> ProjectivePoint {
        ProjectivePoint::from(*self.inner.as_affine())
    }

    /// Serialize in compressed SEC1 form: 0x02 (even y) or 0x03 (odd y), then x.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(true);
        let mut out = [0u8; COMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize in uncompressed SEC1 form: 0x04 ‖ x ‖ y.
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_LEN] {
        let point = self.inner.to_encoded_point(false);
        let mut out = [0u8; UNCOMPRESSED_LEN];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Serialize as the 64-byte raw encoding x ‖ y.
    pub fn to_raw(&self) -> [u8; RAW_LEN] {
        let mut out = [0u8; RAW_LEN];
        out.copy_from_slice(&self.to_uncompressed()[1..]);
        out
    }

    /// Serialize as lowercase hex of the compressed form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_compressed())
    }

    /// The 20-byte account address: Keccak-256 of the raw encoding, last 20 bytes.
    pub fn address(&self) -> [u8; ADDRESS_LEN] {
        address_of_raw(&self.to_raw())
    }

    /// The account address as `0x`-prefixed lowercase hex.
    pub fn address_hex(&self) -> String {
        format!("0x{}", hex::encode(self.address()))
    }

    /// Verify an ECDSA signature over a 32-byte message hash.
    ///
    /// # Returns
    /// `true` if the signature is valid for this key, `false` otherwise.
    pub fn verify(&self, hash: &[u8; 32], sig: &Signature) -> bool {
        let k256_sig = match ecdsa::Signature::from_scalars(
            k256::FieldBytes::from(*sig.r()),
            k256::FieldBytes::from(*sig.s()),
        ) {
            Ok(sig) => sig,
            Err(_) => return false,
        };
        self.inner.verify_prehash(hash, &k256_sig).is_ok()
    }

    pub(crate) fn from_k256_verifying_key(vk: &VerifyingKey) -> Self {
        PublicKey { inner: *vk }
    }
}

/// Address of a 64-byte raw public key encoding.
pub(crate) fn address_of_raw(raw: &[u8; RAW_LEN]) -> [u8; ADDRESS_LEN] {
    let digest = keccak256(raw);
    let mut out = [0u8; ADDRESS_LEN];
    out.copy_from_slice(&digest[32 - ADDRESS_LEN..]);
    out
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_compressed() == other.to_compressed()
    }
}

impl Eq for PublicKey {}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
