//! Hash function primitives.
//!
//! Provides Keccak-256 (account addresses and message hashes), SHA-256,
//! double SHA-256 (Base58Check checksums), RIPEMD-160, Hash160 (BIP-32
//! fingerprints) and HMAC-SHA512 (BIP-32 key derivation).

use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256, Sha512};
use tiny_keccak::{Hasher, Keccak};

/// Compute the Keccak-256 hash of the input data.
///
/// This is the original Keccak submission (pre-NIST padding), as used for
/// account addresses and message hashes, not FIPS-202 SHA3-256.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 32-byte Keccak-256 digest.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Compute SHA-256 hash of the input data.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 32-byte SHA-256 digest.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute double SHA-256: SHA-256(SHA-256(data)).
///
/// Used for the 4-byte Base58Check checksum.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Compute RIPEMD-160 hash of the input data.
///
/// # Arguments
/// * `data` - Byte slice to hash.
///
/// # Returns
/// A 20-byte RIPEMD-160 digest.
pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 20];
    output.copy_from_slice(&result);
    output
}

/// Compute Hash160: RIPEMD-160(SHA-256(data)).
///
/// The first four bytes of the Hash160 of a compressed public key form the
/// BIP-32 key fingerprint.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    ripemd160(&sha256(data))
}

/// Compute HMAC-SHA512 of the input data with the given key.
///
/// # Arguments
/// * `key` - The HMAC key bytes.
/// * `data` - The message bytes to authenticate.
///
/// # Returns
/// A 64-byte HMAC-SHA512 tag.
pub fn sha512_hmac(key: &[u8], data: &[u8]) -> [u8; 64] {
    type HmacSha512 = Hmac<Sha512>;
    let mut mac = HmacSha512::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    let result = mac.finalize();
    let mut output = [0u8; 64];
    output.copy_from_slice(&result.into_bytes());
    output
}
