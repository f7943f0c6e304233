/// Key primitives for account-based chains on secp256k1.
///
/// This crate provides the building blocks the HD wallet layer sits on:
/// - Hash functions (Keccak-256, SHA-256, SHA-256d, RIPEMD-160, Hash160, HMAC-SHA512)
/// - Base58 and Base58Check encoding
/// - An injectable randomness source
/// - secp256k1 keys, key pairs and 20-byte account addresses
/// - Deterministic ECDSA signing with public-key recovery

pub mod hash;
pub mod base58;
pub mod random;
pub mod ec;

mod error;
pub use error::PrimitivesError;
