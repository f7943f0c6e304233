#![deny(missing_docs)]

//! Key management SDK for account-based chains.
//!
//! Re-exports the key primitives and the HD wallet layer for convenient
//! single-crate usage.

pub use ethkey_primitives as primitives;
pub use ethkey_hd as hd;
