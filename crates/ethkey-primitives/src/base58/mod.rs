//! Base58 and Base58Check text encoding.
//!
//! Base58Check appends the first four bytes of SHA-256d(payload) before
//! encoding; it is the text form of serialized extended keys.

use crate::hash::sha256d;
use crate::PrimitivesError;

/// Length of the Base58Check checksum suffix.
const CHECKSUM_LEN: usize = 4;

/// Encode bytes with the Bitcoin Base58 alphabet.
///
/// Leading zero bytes become leading '1' characters.
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_string()
}

/// Decode a Base58 string.
///
/// # Returns
/// `Ok(Vec<u8>)` on success, or an error for characters outside the alphabet.
pub fn decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    bs58::decode(s)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| PrimitivesError::InvalidBase58(e.to_string()))
}

/// Encode `data || sha256d(data)[..4]` as Base58.
pub fn check_encode(data: &[u8]) -> String {
    let checksum = sha256d(data);
    let mut payload = Vec::with_capacity(data.len() + CHECKSUM_LEN);
    payload.extend_from_slice(data);
    payload.extend_from_slice(&checksum[..CHECKSUM_LEN]);
    encode(&payload)
}

/// Decode a Base58Check string and strip its checksum.
///
/// # Returns
/// The payload without the checksum, `PrimitivesError::ChecksumMismatch` if
/// the trailing four bytes do not match, or `InvalidBase58` for bad input.
pub fn check_decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    let decoded = decode(s)?;
    if decoded.len() < CHECKSUM_LEN {
        return Err(PrimitivesError::InvalidBase58(
            "data too short for checksum".to_string(),
        ));
    }
    let (payload, checksum) = decoded.split_at(decoded.len() - CHECKSUM_LEN);
    let expected = sha256d(payload);
    if checksum != &expected[..CHECKSUM_LEN] {
        return Err(PrimitivesError::ChecksumMismatch);
    }
    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base58_empty() {
        assert_eq!(encode(&[]), "");
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_base58_leading_zeros() {
        let input = hex::decode("000000287FB4CD").unwrap();
        assert_eq!(encode(&input), "111233QC4");
        assert_eq!(decode("111233QC4").unwrap(), input);
    }

    #[test]
    fn test_base58_decoded_address() {
        let input = hex::decode("00010966776006953D5567439E5E39F86A0D273BEED61967F6").unwrap();
        assert_eq!(encode(&input), "16UwLL9Risc3QfPqBUvKofHmBQ7wMtjvM");
    }

    #[test]
    fn test_base58_decode_invalid_character() {
        assert!(matches!(
            decode("0OIl"),
            Err(PrimitivesError::InvalidBase58(_))
        ));
    }

    #[test]
    fn test_base58_check_roundtrip() {
        let payload = hex::decode("0488b21e000000000000000000").unwrap();
        let encoded = check_encode(&payload);
        assert_eq!(check_decode(&encoded).unwrap(), payload);
    }

    #[test]
    fn test_base58_check_bad_checksum() {
        let mut encoded = check_encode(&[0x04, 0x88, 0xad, 0xe4]);
        let last = encoded.pop().unwrap();
        encoded.push(if last == '1' { '2' } else { '1' });
        assert_eq!(check_decode(&encoded), Err(PrimitivesError::ChecksumMismatch));
    }

    #[test]
    fn test_base58_check_too_short() {
        assert!(matches!(
            check_decode("1"),
            Err(PrimitivesError::InvalidBase58(_))
        ));
    }
}
