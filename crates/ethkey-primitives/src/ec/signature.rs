//! ECDSA signing with RFC6979 deterministic nonces and SEC1 public-key
//! recovery.
//!
//! Signatures are always produced in low-s form. A [`RecoverableSignature`]
//! carries the recovery id that selects which of the (up to) four candidate
//! public keys produced it; externally the id travels as a header byte
//! `id + 27`.

use k256::{ProjectivePoint, Scalar};

use crate::ec::curve;
use crate::ec::key_pair::KeyPair;
use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::PublicKey;
use crate::hash::keccak256;
use crate::PrimitivesError;

/// Offset added to the recovery id to form the header byte.
pub const HEADER_BYTE_BASE: u8 = 27;

/// Largest accepted header byte (the compressed-key convention adds 4).
pub const HEADER_BYTE_MAX: u8 = 34;

/// Length of the compact recoverable form: header ‖ r ‖ s.
pub const COMPACT_LEN: usize = 65;

/// An ECDSA signature (r, s), each a 32-byte big-endian integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    r: [u8; 32],
    s: [u8; 32],
}

impl Signature {
    /// Create a signature from raw R and S values.
    pub fn new(r: [u8; 32], s: [u8; 32]) -> Self {
        Signature { r, s }
    }

    /// Create a signature from R and S slices.
    ///
    /// # Returns
    /// `PrimitivesError::InvalidSignature` unless both are exactly 32 bytes.
    pub fn from_slices(r: &[u8], s: &[u8]) -> Result<Self, PrimitivesError> {
        let r: [u8; 32] = r.try_into().map_err(|_| {
            PrimitivesError::InvalidSignature(format!("r must be 32 bytes, got {}", r.len()))
        })?;
        let s: [u8; 32] = s.try_into().map_err(|_| {
            PrimitivesError::InvalidSignature(format!("s must be 32 bytes, got {}", s.len()))
        })?;
        Ok(Signature { r, s })
    }

    /// The R component.
    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    /// The S component.
    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// True if s ≤ n/2.
    pub fn is_low_s(&self) -> bool {
        !curve::is_greater_than(&self.s, &curve::HALF_ORDER)
    }

    /// Sign a 32-byte message hash.
    ///
    /// The nonce is derived per RFC6979 from the key and the hash, so the same
    /// inputs always give the same signature. If s > n/2 it is replaced by n − s.
    ///
    /// # Returns
    /// `Ok(Signature)` in low-s form, or an error if signing fails.
    pub fn sign(hash: &[u8; 32], priv_key: &PrivateKey) -> Result<Self, PrimitivesError> {
        let (k256_sig, _recovery_id) = priv_key
            .signing_key()
            .sign_prehash_recoverable(hash)
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))?;

        let (r_bytes, s_bytes) = k256_sig.split_bytes();
        let r: [u8; 32] = r_bytes.into();
        let mut s: [u8; 32] = s_bytes.into();

        if curve::is_greater_than(&s, &curve::HALF_ORDER) {
            s = curve::subtract_from_order(&s);
        }

        Ok(Signature { r, s })
    }

    /// Verify this signature against a message hash and public key.
    pub fn verify(&self, hash: &[u8; 32], pub_key: &PublicKey) -> bool {
        pub_key.verify(hash, self)
    }
}

/// A 2-bit selector among the candidate public keys of a signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RecoveryId(u8);

impl RecoveryId {
    /// Create a recovery id.
    ///
    /// # Returns
    /// `PrimitivesError::InvalidRecoveryId` unless `id` is in 0..=3.
    pub fn new(id: u8) -> Result<Self, PrimitivesError> {
        if id > 3 {
            return Err(PrimitivesError::InvalidRecoveryId(id));
        }
        Ok(RecoveryId(id))
    }

    /// Decode a header byte in 27..=34; 31..=34 map to the same four ids.
    pub fn from_header_byte(header: u8) -> Result<Self, PrimitivesError> {
        if !(HEADER_BYTE_BASE..=HEADER_BYTE_MAX).contains(&header) {
            return Err(PrimitivesError::InvalidHeaderByte(header));
        }
        Ok(RecoveryId((header - HEADER_BYTE_BASE) & 3))
    }

    /// The header byte, id + 27.
    pub fn to_header_byte(self) -> u8 {
        self.0 + HEADER_BYTE_BASE
    }

    /// The raw id in 0..=3.
    pub fn to_byte(self) -> u8 {
        self.0
    }

    /// Whether the x-coordinate of R is r + n rather than r.
    pub fn is_x_reduced(self) -> bool {
        self.0 & 2 != 0
    }

    /// Whether the y-coordinate of R is odd.
    pub fn is_y_odd(self) -> bool {
        self.0 & 1 != 0
    }
}

/// Recover the public key that produced `sig` over `hash`, for one recovery id.
///
/// SEC1 §4.1.6: x = r (+ n for ids 2 and 3); R is the point with that
/// x-coordinate and the id's y parity; n·R must be the identity;
/// Q = r⁻¹·(s·R − e·G).
///
/// # Returns
/// The candidate key, or `None` if any step fails for this id.
pub fn recover(recovery_id: RecoveryId, sig: &Signature, hash: &[u8; 32]) -> Option<PublicKey> {
    if !curve::is_valid_scalar(&sig.r) || !curve::is_valid_scalar(&sig.s) {
        return None;
    }
    let r = curve::scalar_from_bytes(&sig.r)?;
    let s = curve::scalar_from_bytes(&sig.s)?;

    let x = if recovery_id.is_x_reduced() {
        curve::add_order(&sig.r)?
    } else {
        sig.r
    };
    let big_r = curve::point_from_x(&x, recovery_id.is_y_odd())?;
    if !curve::has_curve_order(&big_r) {
        return None;
    }

    let e = curve::reduce_scalar(hash);
    let r_inv: Scalar = Option::from(r.invert())?;
    let q = big_r * (r_inv * s) + ProjectivePoint::GENERATOR * (r_inv * -e);
    PublicKey::from_point(&q).ok()
}

/// A signature together with the recovery id that reproduces its signer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RecoverableSignature {
    /// The (r, s) pair.
    pub signature: Signature,
    /// Selects the signer among the candidate keys.
    pub recovery_id: RecoveryId,
}

impl RecoverableSignature {
    /// The header byte, recovery id + 27.
    pub fn header_byte(&self) -> u8 {
        self.recovery_id.to_header_byte()
    }

    /// Serialize as 65 bytes: header ‖ r ‖ s.
    pub fn to_compact(&self) -> [u8; COMPACT_LEN] {
        let mut out = [0u8; COMPACT_LEN];
        out[0] = self.header_byte();
        out[1..33].copy_from_slice(self.signature.r());
        out[33..].copy_from_slice(self.signature.s());
        out
    }

    /// Parse the 65-byte compact form.
    pub fn from_compact(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        if bytes.len() != COMPACT_LEN {
            return Err(PrimitivesError::InvalidSignature(format!(
                "compact signature must be {} bytes, got {}",
                COMPACT_LEN,
                bytes.len()
            )));
        }
        Ok(RecoverableSignature {
            recovery_id: RecoveryId::from_header_byte(bytes[0])?,
            signature: Signature::from_slices(&bytes[1..33], &bytes[33..])?,
        })
    }

    /// Recover the signer of `message`, hashing it with Keccak-256.
    pub fn recover_signer(&self, message: &[u8]) -> Result<PublicKey, PrimitivesError> {
        recover(self.recovery_id, &self.signature, &keccak256(message))
            .ok_or(PrimitivesError::RecoveryFailed)
    }
}

/// Sign `message` and attach the recovery id that reproduces the signer.
///
/// With `hash_first` the message is hashed with Keccak-256; otherwise it must
/// already be a 32-byte hash. All four recovery ids are tried and the one
/// whose recovered key equals the pair's public key is kept.
///
/// # Returns
/// The recoverable signature, `PrimitivesError::InvalidPrivateKey` for a
/// public-only pair, or `PrimitivesError::SignatureConsistency` if no id
/// recovers the signing key.
pub fn sign_message(
    message: &[u8],
    key_pair: &KeyPair,
    hash_first: bool,
) -> Result<RecoverableSignature, PrimitivesError> {
    let private_key = key_pair.private_key().ok_or_else(|| {
        PrimitivesError::InvalidPrivateKey("key pair has no private key".to_string())
    })?;
    let hash: [u8; 32] = if hash_first {
        keccak256(message)
    } else {
        message.try_into().map_err(|_| {
            PrimitivesError::InvalidSignature(format!(
                "message hash must be 32 bytes, got {}",
                message.len()
            ))
        })?
    };

    let signature = Signature::sign(&hash, private_key)?;

    for id in 0..4u8 {
        let recovery_id = RecoveryId(id);
        if recover(recovery_id, &signature, &hash).as_ref() == Some(key_pair.public_key()) {
            return Ok(RecoverableSignature {
                signature,
                recovery_id,
            });
        }
    }
    Err(PrimitivesError::SignatureConsistency)
}

/// Recover the signer of `message` from a header byte and raw r, s bytes.
///
/// # Returns
/// The signer's public key; `PrimitivesError::InvalidSignature` if r or s is
/// not 32 bytes, `PrimitivesError::InvalidHeaderByte` outside 27..=34, or
/// `PrimitivesError::RecoveryFailed` if no key can be recovered.
pub fn recover_from_header_byte(
    message: &[u8],
    header: u8,
    r: &[u8],
    s: &[u8],
) -> Result<PublicKey, PrimitivesError> {
    let signature = Signature::from_slices(r, s)?;
    let recovery_id = RecoveryId::from_header_byte(header)?;
    recover(recovery_id, &signature, &keccak256(message)).ok_or(PrimitivesError::RecoveryFailed)
}
