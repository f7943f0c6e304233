//! BIP-32 extended keys.
//!
//! An [`ExtendedKey`] is an immutable HD node: a key pair, a chain code and
//! its position in the tree. Children are derived with HMAC-SHA512 keyed by
//! the parent's chain code. Nodes serialize to a fixed 78-byte layout,
//!
//! ```text
//! version(4) ‖ depth(1) ‖ parent fingerprint(4) ‖ child number(4) ‖ chain code(32) ‖ key(33)
//! ```
//!
//! which is Base58Check-encoded for display (`xprv…` / `xpub…` on mainnet).

use std::fmt;
use std::str::FromStr;

use ethkey_primitives::base58;
use ethkey_primitives::ec::curve;
use ethkey_primitives::ec::{KeyPair, PrivateKey, PublicKey};
use ethkey_primitives::hash::{hash160, sha512_hmac};
use k256::ProjectivePoint;
use zeroize::Zeroizing;

use crate::HdError;

/// Top bit of a child number: set for hardened derivation.
pub const HARDENED_FLAG: u32 = 0x8000_0000;

/// Length of a serialized extended key.
pub const EXTENDED_KEY_LEN: usize = 78;

/// HMAC key for master node generation.
const MASTER_SEED_KEY: &[u8] = b"Bitcoin seed";

const PRIVATE_MATERIAL_PREFIX: u8 = 0x00;

/// Version bytes that prefix a serialized extended key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyVersions {
    /// Prefix for nodes serialized with private material.
    pub private: [u8; 4],
    /// Prefix for public-only serializations.
    pub public: [u8; 4],
}

impl KeyVersions {
    /// Mainnet: `xprv` / `xpub`.
    pub const MAINNET: KeyVersions = KeyVersions {
        private: [0x04, 0x88, 0xAD, 0xE4],
        public: [0x04, 0x88, 0xB2, 0x1E],
    };

    /// Testnet: `tprv` / `tpub`.
    pub const TESTNET: KeyVersions = KeyVersions {
        private: [0x04, 0x35, 0x83, 0x94],
        public: [0x04, 0x35, 0x87, 0xCF],
    };
}

impl Default for KeyVersions {
    fn default() -> Self {
        KeyVersions::MAINNET
    }
}

/// A node in a BIP-32 key tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedKey {
    key_pair: KeyPair,
    chain_code: [u8; 32],
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: u32,
}

impl ExtendedKey {
    /// Derive the master node from a seed.
    ///
    /// `(IL, IR) = HMAC-SHA512("Bitcoin seed", seed)`; IL is the master
    /// private key and IR the chain code.
    ///
    /// # Returns
    /// The depth-0 master node, or `HdError::InvalidSeed` if IL is zero or not
    /// below n. The caller is expected to pick another seed.
    pub fn master_from_seed(seed: &[u8]) -> Result<Self, HdError> {
        let lr = Zeroizing::new(sha512_hmac(MASTER_SEED_KEY, seed));
        let (il, ir) = split_hmac(&lr);
        if !curve::is_valid_scalar(&il) {
            return Err(HdError::InvalidSeed);
        }
        let private_key = PrivateKey::from_bytes(&il[..])?;
        Ok(ExtendedKey {
            key_pair: KeyPair::from_private(private_key),
            chain_code: ir,
            depth: 0,
            parent_fingerprint: [0; 4],
            child_number: 0,
        })
    }

    /// Derive the child at `index`; the top bit selects hardened derivation.
    ///
    /// # Returns
    /// The child node, or:
    /// - `HdError::HardenedWithoutPrivateKey` for a hardened index on a
    ///   public-only node,
    /// - `HdError::DepthOverflow` if this node is at depth 255,
    /// - `HdError::KeyDerivation` if the index yields an unusable key. The
    ///   caller may move on to the next index.
    pub fn derive_child(&self, index: u32) -> Result<Self, HdError> {
        let hardened = index & HARDENED_FLAG != 0;
        let depth = self.depth.checked_add(1).ok_or(HdError::DepthOverflow)?;

        let mut data = Zeroizing::new(Vec::with_capacity(37));
        if hardened {
            let private_key = self
                .key_pair
                .private_key()
                .ok_or(HdError::HardenedWithoutPrivateKey)?;
            data.push(PRIVATE_MATERIAL_PREFIX);
            data.extend_from_slice(&private_key.to_bytes());
        } else {
            data.extend_from_slice(&self.key_pair.compress());
        }
        data.extend_from_slice(&index.to_be_bytes());

        let lr = Zeroizing::new(sha512_hmac(&self.chain_code, &data));
        let (il, ir) = split_hmac(&lr);
        let tweak = curve::scalar_from_bytes(&il).ok_or(HdError::KeyDerivation {
            index,
            reason: "IL is not below the curve order",
        })?;

        let key_pair = match &self.key_pair {
            KeyPair::Private { private_key, .. } => {
                let child = tweak + private_key.to_scalar();
                if bool::from(child.is_zero()) {
                    return Err(HdError::KeyDerivation {
                        index,
                        reason: "child private key is zero",
                    });
                }
                KeyPair::from_private(PrivateKey::from_scalar(&child)?)
            }
            KeyPair::PublicOnly(public_key) => {
                let point = ProjectivePoint::GENERATOR * tweak + public_key.to_point();
                let child = PublicKey::from_point(&point).map_err(|_| HdError::KeyDerivation {
                    index,
                    reason: "child public key is the point at infinity",
                })?;
                KeyPair::PublicOnly(child)
            }
        };

        Ok(ExtendedKey {
            key_pair,
            chain_code: ir,
            depth,
            parent_fingerprint: self.fingerprint(),
            child_number: index,
        })
    }

    /// Derive through a sequence of wire indices, stopping at the first failure.
    pub fn derive_path(&self, indices: &[u32]) -> Result<Self, HdError> {
        let mut node = self.clone();
        for &index in indices {
            node = node.derive_child(index)?;
        }
        Ok(node)
    }

    /// The same node without private material.
    pub fn neuter(&self) -> Self {
        ExtendedKey {
            key_pair: self.key_pair.to_public_only(),
            ..self.clone()
        }
    }

    /// First four bytes of Hash160 of the compressed public key.
    pub fn fingerprint(&self) -> [u8; 4] {
        let digest = hash160(&self.key_pair.compress());
        let mut out = [0u8; 4];
        out.copy_from_slice(&digest[..4]);
        out
    }

    /// The node's key pair.
    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// The 32-byte chain code.
    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// Distance from the master node.
    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Fingerprint of the parent node; zero for the master.
    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    /// The wire index this node was derived with; zero for the master.
    pub fn child_number(&self) -> u32 {
        self.child_number
    }

    /// True if this node was derived with a hardened index.
    pub fn is_hardened(&self) -> bool {
        self.child_number & HARDENED_FLAG != 0
    }

    /// True if the node holds a private key.
    pub fn is_private(&self) -> bool {
        self.key_pair.has_private_key()
    }

    /// Serialize to 78 bytes with mainnet version bytes.
    ///
    /// The public form is used when `public_only` is set or the node has no
    /// private key.
    pub fn serialize(&self, public_only: bool) -> Zeroizing<[u8; EXTENDED_KEY_LEN]> {
        self.serialize_with(&KeyVersions::MAINNET, public_only)
    }

    /// Serialize to 78 bytes with the given version bytes.
    pub fn serialize_with(
        &self,
        versions: &KeyVersions,
        public_only: bool,
    ) -> Zeroizing<[u8; EXTENDED_KEY_LEN]> {
        let mut out = Zeroizing::new([0u8; EXTENDED_KEY_LEN]);
        let private_key = if public_only {
            None
        } else {
            self.key_pair.private_key()
        };

        out[0..4].copy_from_slice(match private_key {
            Some(_) => &versions.private,
            None => &versions.public,
        });
        out[4] = self.depth;
        out[5..9].copy_from_slice(&self.parent_fingerprint);
        out[9..13].copy_from_slice(&self.child_number.to_be_bytes());
        out[13..45].copy_from_slice(&self.chain_code);
        match private_key {
            Some(private_key) => {
                out[45] = PRIVATE_MATERIAL_PREFIX;
                out[46..].copy_from_slice(&private_key.to_bytes());
            }
            None => out[45..].copy_from_slice(&self.key_pair.compress()),
        }
        out
    }

    /// Base58Check text form with mainnet version bytes.
    pub fn to_base58(&self, public_only: bool) -> String {
        base58::check_encode(&self.serialize(public_only)[..])
    }

    /// Base58Check text form with the given version bytes.
    pub fn to_base58_with(&self, versions: &KeyVersions, public_only: bool) -> String {
        base58::check_encode(&self.serialize_with(versions, public_only)[..])
    }

    /// Parse a mainnet Base58Check extended key.
    pub fn from_base58(text: &str) -> Result<Self, HdError> {
        Self::from_base58_with(text, &KeyVersions::MAINNET)
    }

    /// Parse a Base58Check extended key with the given version bytes.
    ///
    /// # Returns
    /// The node, or `HdError::InvalidExtendedKey` for a bad checksum or any
    /// malformed field (see [`ExtendedKey::from_bytes_with`]).
    pub fn from_base58_with(text: &str, versions: &KeyVersions) -> Result<Self, HdError> {
        let data = Zeroizing::new(
            base58::check_decode(text).map_err(|e| HdError::InvalidExtendedKey(e.to_string()))?,
        );
        Self::from_bytes_with(&data, versions)
    }

    /// Parse 78 serialized bytes with mainnet version bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, HdError> {
        Self::from_bytes_with(data, &KeyVersions::MAINNET)
    }

    /// Parse 78 serialized bytes with the given version bytes.
    ///
    /// # Returns
    /// `HdError::InvalidExtendedKey` if the length is not 78, the version is
    /// unknown, private material is not `0x00 ‖ k` with k in [1, n − 1],
    /// public material is not a valid compressed point, or a depth-0 node has
    /// a non-zero parent fingerprint or child number.
    pub fn from_bytes_with(data: &[u8], versions: &KeyVersions) -> Result<Self, HdError> {
        if data.len() != EXTENDED_KEY_LEN {
            return Err(HdError::InvalidExtendedKey(format!(
                "expected {} bytes, got {}",
                EXTENDED_KEY_LEN,
                data.len()
            )));
        }

        let version = &data[0..4];
        let has_private = if version == versions.private {
            true
        } else if version == versions.public {
            false
        } else {
            return Err(HdError::InvalidExtendedKey(format!(
                "unknown version bytes {}",
                hex::encode(version)
            )));
        };

        let depth = data[4];
        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&data[5..9]);
        let mut child_number_bytes = [0u8; 4];
        child_number_bytes.copy_from_slice(&data[9..13]);
        let child_number = u32::from_be_bytes(child_number_bytes);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&data[13..45]);

        if depth == 0 && parent_fingerprint != [0u8; 4] {
            return Err(HdError::InvalidExtendedKey(
                "zero depth with non-zero parent fingerprint".to_string(),
            ));
        }
        if depth == 0 && child_number != 0 {
            return Err(HdError::InvalidExtendedKey(
                "zero depth with non-zero child number".to_string(),
            ));
        }

        let material = &data[45..];
        let key_pair = if has_private {
            if material[0] != PRIVATE_MATERIAL_PREFIX {
                return Err(HdError::InvalidExtendedKey(format!(
                    "private key material must start with 0x00, got 0x{:02x}",
                    material[0]
                )));
            }
            let private_key = PrivateKey::from_bytes(&material[1..])
                .map_err(|e| HdError::InvalidExtendedKey(e.to_string()))?;
            KeyPair::from_private(private_key)
        } else {
            let public_key = PublicKey::decompress(material)
                .map_err(|e| HdError::InvalidExtendedKey(e.to_string()))?;
            KeyPair::PublicOnly(public_key)
        };

        Ok(ExtendedKey {
            key_pair,
            chain_code,
            depth,
            parent_fingerprint,
            child_number,
        })
    }
}

impl fmt::Display for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58(false))
    }
}

impl FromStr for ExtendedKey {
    type Err = HdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExtendedKey::from_base58(s)
    }
}

/// Split an HMAC-SHA512 output into (IL, IR).
fn split_hmac(lr: &[u8; 64]) -> (Zeroizing<[u8; 32]>, [u8; 32]) {
    let mut il = Zeroizing::new([0u8; 32]);
    let mut ir = [0u8; 32];
    il.copy_from_slice(&lr[..32]);
    ir.copy_from_slice(&lr[32..]);
    (il, ir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::Bip44Path;
    use serde::Deserialize;

    const SEED_1: &str = "000102030405060708090a0b0c0d0e0f";

    fn master() -> ExtendedKey {
        ExtendedKey::master_from_seed(&hex::decode(SEED_1).unwrap()).unwrap()
    }

    #[derive(Deserialize)]
    struct Vectors {
        valid: Vec<SeedVector>,
        invalid: Vec<InvalidKey>,
    }

    #[derive(Deserialize)]
    struct SeedVector {
        seed: String,
        chains: Vec<Chain>,
    }

    #[derive(Deserialize)]
    struct Chain {
        path: String,
        xprv: String,
        xpub: String,
    }

    #[derive(Deserialize)]
    struct InvalidKey {
        key: String,
        reason: String,
    }

    fn vectors() -> Vectors {
        serde_json::from_str(include_str!("testdata/bip32.vectors.json")).unwrap()
    }

    #[test]
    fn test_master_key_fields() {
        let m = master();
        assert_eq!(
            hex::encode(m.chain_code()),
            "873dff81c02f525623fd1fe5167eac3a55a049de3d314bb42ee227ffed37d508"
        );
        assert_eq!(
            m.key_pair().private_key().unwrap().to_hex(),
            "e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b35"
        );
        assert_eq!(
            hex::encode(m.key_pair().compress()),
            "0339a36013301597daef41fbe593a02cc513d0b55527ec2df1050e2e8ff49c85c2"
        );
        assert_eq!(m.depth(), 0);
        assert_eq!(m.parent_fingerprint(), [0; 4]);
        assert_eq!(m.child_number(), 0);
        assert!(m.is_private());
        assert_eq!(hex::encode(m.fingerprint()), "3442193e");
    }

    #[test]
    fn test_hardened_child_fields() {
        let m = master();
        let child = m.derive_child(HARDENED_FLAG).unwrap();
        assert_eq!(
            hex::encode(child.chain_code()),
            "47fdacbd0f1097043b78c63c20c34ef4ed9a111d980047ad16282c7ae6236141"
        );
        assert_eq!(
            child.key_pair().private_key().unwrap().to_hex(),
            "edb2e14f9ee77d26dd93b4ecede8d16ed408ce149b6cd80b0715a2d911a0afea"
        );
        assert_eq!(
            hex::encode(child.key_pair().compress()),
            "035a784662a4a20a65bf6aab9ae98a6c068a81c52e4b032c0fb5400c706cfccc56"
        );
        assert_eq!(child.depth(), 1);
        assert_eq!(child.parent_fingerprint(), m.fingerprint());
        assert_eq!(child.child_number(), HARDENED_FLAG);
        assert!(child.is_hardened());
    }

    #[test]
    fn test_bip32_vectors() {
        for (i, vector) in vectors().valid.iter().enumerate() {
            let seed = hex::decode(&vector.seed).unwrap();
            let master = ExtendedKey::master_from_seed(&seed).unwrap();
            for chain in &vector.chains {
                let node = if chain.path == "m" {
                    master.clone()
                } else {
                    let path = Bip44Path::parse(&chain.path)
                        .unwrap_or_else(|e| panic!("vector #{} {}: {}", i + 1, chain.path, e));
                    master.derive_path(&path.to_wire_indices()).unwrap()
                };
                assert_eq!(
                    node.to_base58(false),
                    chain.xprv,
                    "vector #{} {}: xprv mismatch",
                    i + 1,
                    chain.path
                );
                assert_eq!(
                    node.to_base58(true),
                    chain.xpub,
                    "vector #{} {}: xpub mismatch",
                    i + 1,
                    chain.path
                );
                assert_eq!(ExtendedKey::from_base58(&chain.xprv).unwrap(), node);
                assert_eq!(
                    ExtendedKey::from_base58(&chain.xpub).unwrap(),
                    node.neuter()
                );
            }
        }
    }

    #[test]
    fn test_bip32_invalid_keys() {
        for case in vectors().invalid {
            let result = ExtendedKey::from_base58(&case.key);
            assert!(
                matches!(result, Err(HdError::InvalidExtendedKey(_))),
                "{} ({}): expected InvalidExtendedKey, got {:?}",
                case.key,
                case.reason,
                result
            );
        }
    }

    #[test]
    fn test_hardened_from_public_only_fails() {
        let public = master().neuter();
        assert!(!public.is_private());
        assert_eq!(
            public.derive_child(HARDENED_FLAG | 1),
            Err(HdError::HardenedWithoutPrivateKey)
        );
    }

    #[test]
    fn test_public_derivation_matches_private() {
        let m = master();
        let private_child = m.derive_child(7).unwrap();
        let public_child = m.neuter().derive_child(7).unwrap();
        assert_eq!(public_child, private_child.neuter());
    }

    #[test]
    fn test_hardened_and_normal_children_differ() {
        let m = master();
        let normal = m.derive_child(3).unwrap();
        let hardened = m.derive_child(HARDENED_FLAG | 3).unwrap();
        assert_ne!(normal.key_pair(), hardened.key_pair());
        assert_ne!(normal.chain_code(), hardened.chain_code());
    }

    #[test]
    fn test_depth_overflow() {
        let deep = ExtendedKey {
            depth: u8::MAX,
            ..master()
        };
        assert_eq!(deep.derive_child(0), Err(HdError::DepthOverflow));

        let almost = ExtendedKey {
            depth: u8::MAX - 1,
            ..master()
        };
        assert_eq!(almost.derive_child(0).unwrap().depth(), u8::MAX);
    }

    #[test]
    fn test_serialize_layout() {
        let m = master();
        let data = m.serialize(false);
        assert_eq!(&data[0..4], &KeyVersions::MAINNET.private);
        assert_eq!(data[4], 0);
        assert_eq!(&data[5..13], &[0u8; 8]);
        assert_eq!(&data[13..45], m.chain_code());
        assert_eq!(data[45], 0x00);

        let public = m.serialize(true);
        assert_eq!(&public[0..4], &KeyVersions::MAINNET.public);
        assert_eq!(&public[45..], &m.key_pair().compress());

        // a public-only node serializes publicly even when asked for private
        assert_eq!(m.neuter().serialize(false), public);
    }

    #[test]
    fn test_testnet_versions_roundtrip() {
        let child = master().derive_child(HARDENED_FLAG | 44).unwrap();
        let text = child.to_base58_with(&KeyVersions::TESTNET, false);
        assert!(text.starts_with("tprv"));
        assert_eq!(
            ExtendedKey::from_base58_with(&text, &KeyVersions::TESTNET).unwrap(),
            child
        );
        assert!(matches!(
            ExtendedKey::from_base58(&text),
            Err(HdError::InvalidExtendedKey(_))
        ));
        assert!(child
            .to_base58_with(&KeyVersions::TESTNET, true)
            .starts_with("tpub"));
    }

    #[test]
    fn test_from_bytes_rejects_bad_length() {
        let data = master().serialize(false);
        assert!(matches!(
            ExtendedKey::from_bytes(&data[..77]),
            Err(HdError::InvalidExtendedKey(_))
        ));
    }

    #[test]
    fn test_display_and_from_str() {
        let m = master();
        let text = m.to_string();
        assert_eq!(text, m.to_base58(false));
        assert_eq!(text.parse::<ExtendedKey>().unwrap(), m);
    }
}
