/// Hierarchical deterministic keys for account-based chains.
///
/// Implements BIP-32 master and child key derivation over secp256k1, the
/// 78-byte extended key encoding with its Base58Check text form, and
/// BIP-44 style derivation paths that walk the tree from a seed.

pub mod extended_key;
pub mod path;

mod error;
pub use error::HdError;

pub use extended_key::{ExtendedKey, KeyVersions, EXTENDED_KEY_LEN, HARDENED_FLAG};
pub use path::{derive_from_seed, generate_key, Bip44Path, PathElement};
