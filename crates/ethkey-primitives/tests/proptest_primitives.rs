use proptest::prelude::*;

use ethkey_primitives::base58;
use ethkey_primitives::ec::curve::HALF_ORDER;
use ethkey_primitives::ec::{
    public_key_from_private, recover, recover_from_header_byte, sign_message, KeyPair, PrivateKey,
    PublicKey, RecoverableSignature, RecoveryId,
};
use ethkey_primitives::hash::keccak256;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn public_key_from_private_matches_key_pair(seed in prop::array::uniform32(any::<u8>())) {
        // Not every 32-byte array is a valid scalar (must be nonzero and < n).
        if let Ok(pk) = PrivateKey::from_bytes(&seed) {
            let pub_key = public_key_from_private(&seed).unwrap();
            prop_assert_eq!(&pub_key, &pk.pub_key());
            prop_assert_eq!(pub_key.address().len(), 20);
            prop_assert_eq!(PublicKey::from_raw(&pub_key.to_raw()).unwrap(), pub_key);
            prop_assert_eq!(PublicKey::decompress(&pub_key.to_compressed()).unwrap(), pub_key);
        }
    }

    #[test]
    fn sign_then_recover_returns_signer(
        seed in prop::array::uniform32(any::<u8>()),
        msg in prop::collection::vec(any::<u8>(), 0..256)
    ) {
        if let Ok(pk) = PrivateKey::from_bytes(&seed) {
            let pair = KeyPair::from_private(pk);
            let sig = sign_message(&msg, &pair, true).unwrap();
            let hash = keccak256(&msg);

            let recovered = recover(sig.recovery_id, &sig.signature, &hash).unwrap();
            prop_assert_eq!(&recovered, pair.public_key());

            let from_header = recover_from_header_byte(
                &msg,
                sig.header_byte(),
                sig.signature.r(),
                sig.signature.s(),
            )
            .unwrap();
            prop_assert_eq!(&from_header, pair.public_key());
            prop_assert!(pair.public_key().verify(&hash, &sig.signature));
        }
    }

    #[test]
    fn signatures_are_low_s(
        seed in prop::array::uniform32(any::<u8>()),
        hash in prop::array::uniform32(any::<u8>())
    ) {
        if let Ok(pk) = PrivateKey::from_bytes(&seed) {
            let sig = pk.sign(&hash).unwrap();
            prop_assert!(sig.s() <= &HALF_ORDER);
            prop_assert!(sig.is_low_s());
        }
    }

    #[test]
    fn other_recovery_ids_never_yield_signer(
        seed in prop::array::uniform32(any::<u8>()),
        hash in prop::array::uniform32(any::<u8>())
    ) {
        if let Ok(pk) = PrivateKey::from_bytes(&seed) {
            let pair = KeyPair::from_private(pk);
            let sig = sign_message(&hash, &pair, false).unwrap();
            for id in 0..4u8 {
                let candidate = recover(RecoveryId::new(id).unwrap(), &sig.signature, &hash);
                if id == sig.recovery_id.to_byte() {
                    prop_assert_eq!(candidate.as_ref(), Some(pair.public_key()));
                } else {
                    prop_assert_ne!(candidate.as_ref(), Some(pair.public_key()));
                }
            }
            let compact = sig.to_compact();
            prop_assert_eq!(RecoverableSignature::from_compact(&compact).unwrap(), sig);
        }
    }

    #[test]
    fn base58_check_roundtrip(data in prop::collection::vec(any::<u8>(), 0..100)) {
        let encoded = base58::check_encode(&data);
        prop_assert_eq!(base58::check_decode(&encoded).unwrap(), data);
    }
}
