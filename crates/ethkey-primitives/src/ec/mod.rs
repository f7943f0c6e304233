/// Elliptic curve cryptography on secp256k1.
///
/// Provides the curve helpers, private and public keys, key pairs with
/// account addresses, and recoverable ECDSA signatures.

pub mod curve;
pub mod key_pair;
pub mod private_key;
pub mod public_key;
pub mod signature;

pub use key_pair::{address_from_raw, public_key_from_private, KeyPair};
pub use private_key::PrivateKey;
pub use public_key::PublicKey;
pub use signature::{
    recover, recover_from_header_byte, sign_message, RecoverableSignature, RecoveryId, Signature,
};
