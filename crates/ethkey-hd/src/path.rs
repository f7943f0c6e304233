//! BIP-44 style derivation paths.
//!
//! Text form is `m/` followed by `/`-separated decimal indices, each with an
//! optional trailing `'` for hardened derivation, e.g. `m/44'/60'/0'/0/0`.
//! Parsing tolerates whitespace around the text and around each segment,
//! and skips empty segments.

use std::fmt;
use std::str::FromStr;

use crate::extended_key::{ExtendedKey, HARDENED_FLAG};
use crate::HdError;

const PATH_PREFIX: &str = "m/";
const HARDENED_MARKER: char = '\'';

/// One step of a derivation path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PathElement {
    index: u32,
    hardened: bool,
}

impl PathElement {
    /// Create an element.
    ///
    /// # Returns
    /// `HdError::PathFormat` if `index` does not fit in 31 bits.
    pub fn new(index: u32, hardened: bool) -> Result<Self, HdError> {
        if index & HARDENED_FLAG != 0 {
            return Err(HdError::PathFormat(format!(
                "index {} does not fit in 31 bits",
                index
            )));
        }
        Ok(PathElement { index, hardened })
    }

    /// Decode an on-wire child number.
    pub fn from_wire_index(wire: u32) -> Self {
        PathElement {
            index: wire & !HARDENED_FLAG,
            hardened: wire & HARDENED_FLAG != 0,
        }
    }

    /// The on-wire child number: the index, with the top bit set if hardened.
    pub fn to_wire_index(self) -> u32 {
        if self.hardened {
            self.index | HARDENED_FLAG
        } else {
            self.index
        }
    }

    /// The 31-bit index.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Whether this step uses hardened derivation.
    pub fn is_hardened(self) -> bool {
        self.hardened
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index)?;
        if self.hardened {
            write!(f, "{}", HARDENED_MARKER)?;
        }
        Ok(())
    }
}

impl FromStr for PathElement {
    type Err = HdError;

    fn from_str(segment: &str) -> Result<Self, Self::Err> {
        let segment = segment.trim();
        let (digits, hardened) = match segment.strip_suffix(HARDENED_MARKER) {
            Some(rest) => (rest.trim(), true),
            None => (segment, false),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(HdError::PathFormat(format!(
                "segment {:?} is not a decimal index",
                segment
            )));
        }
        let index: u32 = digits.parse().map_err(|_| {
            HdError::PathFormat(format!("index {} does not fit in 31 bits", digits))
        })?;
        PathElement::new(index, hardened)
    }
}

/// A non-empty sequence of derivation steps below the master node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bip44Path {
    elements: Vec<PathElement>,
}

impl Bip44Path {
    /// Create a path from its elements.
    ///
    /// # Returns
    /// `HdError::PathFormat` if `elements` is empty.
    pub fn new(elements: Vec<PathElement>) -> Result<Self, HdError> {
        if elements.is_empty() {
            return Err(HdError::PathFormat("path has no elements".to_string()));
        }
        Ok(Bip44Path { elements })
    }

    /// Parse the text form, e.g. `m/44'/60'/0'/0/0`.
    ///
    /// # Returns
    /// `HdError::PathFormat` if the text does not start with `m/`, a segment
    /// is not a decimal index below 2^31 (with optional `'`), or no segment
    /// remains.
    pub fn parse(text: &str) -> Result<Self, HdError> {
        let rest = text.trim().strip_prefix(PATH_PREFIX).ok_or_else(|| {
            HdError::PathFormat(format!("path {:?} must start with {}", text, PATH_PREFIX))
        })?;
        let elements = rest
            .split('/')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(PathElement::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Bip44Path::new(elements)
    }

    /// The path's elements, master side first.
    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    /// On-wire child numbers, hardened flag included.
    pub fn to_wire_indices(&self) -> Vec<u32> {
        self.elements.iter().map(|e| e.to_wire_index()).collect()
    }

    /// The same path with the last index incremented, hardened flag kept.
    ///
    /// # Returns
    /// `HdError::IndexOverflow` if the last index is already 2^31 − 1.
    pub fn next_element(&self) -> Result<Self, HdError> {
        let mut elements = self.elements.clone();
        // never empty
        if let Some(last) = elements.last_mut() {
            let next = last.index + 1;
            if next & HARDENED_FLAG != 0 {
                return Err(HdError::IndexOverflow(last.index));
            }
            last.index = next;
        }
        Ok(Bip44Path { elements })
    }

    /// Walk this path from `node`.
    pub fn derive_from(&self, node: &ExtendedKey) -> Result<ExtendedKey, HdError> {
        node.derive_path(&self.to_wire_indices())
    }

    /// Derive the master node from `seed`, then walk this path.
    pub fn derive_from_seed(&self, seed: &[u8]) -> Result<ExtendedKey, HdError> {
        self.derive_from(&ExtendedKey::master_from_seed(seed)?)
    }
}

impl fmt::Display for Bip44Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for element in &self.elements {
            write!(f, "/{}", element)?;
        }
        Ok(())
    }
}

impl FromStr for Bip44Path {
    type Err = HdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Bip44Path::parse(s)
    }
}

/// Derive the node at `path` below the master node of `seed`.
pub fn derive_from_seed(seed: &[u8], path: &Bip44Path) -> Result<ExtendedKey, HdError> {
    path.derive_from_seed(seed)
}

/// Parse `path` and derive the node it names below the master node of `seed`.
pub fn generate_key(seed: &[u8], path: &str) -> Result<ExtendedKey, HdError> {
    Bip44Path::parse(path)?.derive_from_seed(seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED_1: &str = "000102030405060708090a0b0c0d0e0f";

    fn element(index: u32, hardened: bool) -> PathElement {
        PathElement::new(index, hardened).unwrap()
    }

    #[test]
    fn test_parse_to_wire_indices() {
        let path = Bip44Path::parse("m/44'/1").unwrap();
        assert_eq!(path.to_wire_indices(), vec![0x8000_002C, 1]);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for text in ["", "abc", "m", "m/", "m/x", "m/1/-2", "m/1''", "n/0", "m/2147483648"] {
            assert!(
                matches!(Bip44Path::parse(text), Err(HdError::PathFormat(_))),
                "{:?} should not parse",
                text
            );
        }
    }

    #[test]
    fn test_parse_dirty_paths() {
        assert_eq!(
            Bip44Path::parse("m/44 ' ").unwrap().elements(),
            &[element(44, true)]
        );
        assert_eq!(
            Bip44Path::parse("m/0 /1 ' ").unwrap().elements(),
            &[element(0, false), element(1, true)]
        );
        assert_eq!(
            Bip44Path::parse("  m/0//1/ ").unwrap().elements(),
            &[element(0, false), element(1, false)]
        );
    }

    #[test]
    fn test_display_roundtrip() {
        for text in ["m/0", "m/0'", "m/0/1", "m/44'", "m/44'/60'/0'/0/0"] {
            let path: Bip44Path = text.parse().unwrap();
            assert_eq!(path.to_string(), text);
        }
    }

    #[test]
    fn test_max_index() {
        let path = Bip44Path::parse("m/2147483647'").unwrap();
        assert_eq!(path.to_wire_indices(), vec![u32::MAX]);
        assert_eq!(
            PathElement::from_wire_index(u32::MAX),
            element(0x7FFF_FFFF, true)
        );
        assert!(matches!(
            PathElement::new(HARDENED_FLAG, false),
            Err(HdError::PathFormat(_))
        ));
    }

    #[test]
    fn test_next_element() {
        let path = Bip44Path::parse("m/0/1/2").unwrap();
        assert_eq!(path.next_element().unwrap().to_string(), "m/0/1/3");

        let hardened = Bip44Path::parse("m/44'/60'").unwrap();
        assert_eq!(hardened.next_element().unwrap().to_string(), "m/44'/61'");
    }

    #[test]
    fn test_next_element_overflow() {
        let path = Bip44Path::parse("m/0/2147483647").unwrap();
        assert_eq!(path.next_element(), Err(HdError::IndexOverflow(0x7FFF_FFFF)));
    }

    #[test]
    fn test_empty_path_rejected() {
        assert!(matches!(Bip44Path::new(vec![]), Err(HdError::PathFormat(_))));
    }

    #[test]
    fn test_generate_key_matches_manual_walk() {
        let seed = hex::decode(SEED_1).unwrap();
        let by_text = generate_key(&seed, "m/0'/1/2'").unwrap();

        let master = ExtendedKey::master_from_seed(&seed).unwrap();
        let by_hand = master
            .derive_child(HARDENED_FLAG)
            .and_then(|n| n.derive_child(1))
            .and_then(|n| n.derive_child(HARDENED_FLAG | 2))
            .unwrap();
        assert_eq!(by_text, by_hand);

        let path = Bip44Path::parse("m/0'/1/2'").unwrap();
        assert_eq!(derive_from_seed(&seed, &path).unwrap(), by_hand);
        assert_eq!(by_hand.depth(), 3);
    }

    #[test]
    fn test_derive_from_public_only_stops_at_hardened_step() {
        let seed = hex::decode(SEED_1).unwrap();
        let watch = ExtendedKey::master_from_seed(&seed).unwrap().neuter();
        let path = Bip44Path::parse("m/0/1'").unwrap();
        assert_eq!(
            path.derive_from(&watch),
            Err(HdError::HardenedWithoutPrivateKey)
        );
        assert!(Bip44Path::parse("m/0/1").unwrap().derive_from(&watch).is_ok());
    }

    #[test]
    fn test_generate_key_propagates_parse_error() {
        let seed = hex::decode(SEED_1).unwrap();
        assert!(matches!(
            generate_key(&seed, "44'/0"),
            Err(HdError::PathFormat(_))
        ));
    }
}
