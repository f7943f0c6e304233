/// Error types for HD key derivation, extended key encoding, and paths.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HdError {
    /// The seed produced a master key outside [1, n − 1]; retry with another seed.
    #[error("seed does not produce a usable master key")]
    InvalidSeed,

    /// The child at this index is unusable; the caller may try the next index.
    #[error("key derivation failed at index {index:#010x}: {reason}")]
    KeyDerivation {
        /// The wire index (hardened flag included) that failed.
        index: u32,
        /// What made the child unusable.
        reason: &'static str,
    },

    /// A hardened child was requested from a public-only node.
    #[error("hardened derivation requires a private key")]
    HardenedWithoutPrivateKey,

    /// A child of a depth-255 node was requested.
    #[error("maximum derivation depth of 255 reached")]
    DepthOverflow,

    /// Serialized extended key is malformed.
    #[error("invalid extended key: {0}")]
    InvalidExtendedKey(String),

    /// Derivation path text is malformed.
    #[error("invalid derivation path: {0}")]
    PathFormat(String),

    /// Incrementing the path's last index would leave the 31-bit range.
    #[error("path index {0} cannot be incremented without leaving the 31-bit range")]
    IndexOverflow(u32),

    /// An underlying primitives error (forwarded from `ethkey-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] ethkey_primitives::PrimitivesError),
}
