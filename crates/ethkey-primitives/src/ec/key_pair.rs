//! Key pairs that may or may not hold private material, and the free
//! key/address derivation functions.

use k256::{ProjectivePoint, Scalar};

use crate::ec::curve;
use crate::ec::private_key::PrivateKey;
use crate::ec::public_key::{address_of_raw, PublicKey, ADDRESS_LEN, COMPRESSED_LEN, RAW_LEN};
use crate::random::RandomSource;
use crate::PrimitivesError;

/// A public key, optionally accompanied by the private key it was derived from.
///
/// The `Private` variant always satisfies `public_key == private_key·G`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyPair {
    /// Full key pair, able to sign and to derive hardened children.
    Private {
        /// The private scalar.
        private_key: PrivateKey,
        /// The matching public point.
        public_key: PublicKey,
    },
    /// Watch-only key: no private material.
    PublicOnly(PublicKey),
}

impl KeyPair {
    /// Build a full key pair from a private key.
    pub fn from_private(private_key: PrivateKey) -> Self {
        let public_key = private_key.pub_key();
        KeyPair::Private {
            private_key,
            public_key,
        }
    }

    /// Build a watch-only key pair.
    pub fn from_public(public_key: PublicKey) -> Self {
        KeyPair::PublicOnly(public_key)
    }

    /// Generate a fresh key pair from `rng`.
    pub fn generate<R: RandomSource + ?Sized>(rng: &mut R) -> Result<Self, PrimitivesError> {
        Ok(Self::from_private(PrivateKey::generate(rng)?))
    }

    /// The public key.
    pub fn public_key(&self) -> &PublicKey {
        match self {
            KeyPair::Private { public_key, .. } => public_key,
            KeyPair::PublicOnly(public_key) => public_key,
        }
    }

    /// The private key, if this pair holds one.
    pub fn private_key(&self) -> Option<&PrivateKey> {
        match self {
            KeyPair::Private { private_key, .. } => Some(private_key),
            KeyPair::PublicOnly(_) => None,
        }
    }

    /// True if the pair can sign.
    pub fn has_private_key(&self) -> bool {
        matches!(self, KeyPair::Private { .. })
    }

    /// Drop any private material.
    pub fn to_public_only(&self) -> Self {
        KeyPair::PublicOnly(*self.public_key())
    }

    /// The 33-byte compressed public key.
    pub fn compress(&self) -> [u8; COMPRESSED_LEN] {
        self.public_key().to_compressed()
    }

    /// The 20-byte account address.
    pub fn address(&self) -> [u8; ADDRESS_LEN] {
        self.public_key().address()
    }
}

impl From<PrivateKey> for KeyPair {
    fn from(private_key: PrivateKey) -> Self {
        KeyPair::from_private(private_key)
    }
}

impl From<PublicKey> for KeyPair {
    fn from(public_key: PublicKey) -> Self {
        KeyPair::PublicOnly(public_key)
    }
}

/// Compute scalar·G for a big-endian scalar of any length.
///
/// The scalar is reduced modulo n first, so inputs wider than 256 bits are
/// accepted.
///
/// # Returns
/// The public key, or `PrimitivesError::InvalidPrivateKey` if the scalar is
/// zero modulo n.
pub fn public_key_from_private(scalar: &[u8]) -> Result<PublicKey, PrimitivesError> {
    let start = scalar.iter().position(|&b| b != 0).unwrap_or(scalar.len());
    let significant = &scalar[start..];

    let reduced = if significant.len() <= 32 {
        let mut padded = [0u8; 32];
        padded[32 - significant.len()..].copy_from_slice(significant);
        curve::reduce_scalar(&padded)
    } else {
        let radix = Scalar::from(256u64);
        significant
            .iter()
            .fold(Scalar::ZERO, |acc, &b| acc * radix + Scalar::from(b as u64))
    };

    if bool::from(reduced.is_zero()) {
        return Err(PrimitivesError::InvalidPrivateKey(
            "scalar is zero modulo the curve order".to_string(),
        ));
    }
    PublicKey::from_point(&(ProjectivePoint::GENERATOR * reduced))
}

/// Account address of a raw public key given as a big-endian number.
///
/// Encodings shorter than 64 bytes are left-padded with zeros before hashing.
///
/// # Returns
/// The 20-byte address, or `PrimitivesError::InvalidKeyLength` if the input
/// is longer than 64 bytes.
pub fn address_from_raw(raw: &[u8]) -> Result<[u8; ADDRESS_LEN], PrimitivesError> {
    if raw.len() > RAW_LEN {
        return Err(PrimitivesError::InvalidKeyLength {
            expected: RAW_LEN,
            got: raw.len(),
        });
    }
    let mut padded = [0u8; RAW_LEN];
    padded[RAW_LEN - raw.len()..].copy_from_slice(raw);
    Ok(address_of_raw(&padded))
}
