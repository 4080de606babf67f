#![allow(clippy::unwrap_used)] // unwrap() is idiomatic in property tests

use proptest::prelude::*;
use signet_pq::*;

// ============================================================================
// Property: Digest determinism and distinctness
// ============================================================================

proptest! {
    #[test]
    fn prop_digest_deterministic(content in prop::collection::vec(any::<u8>(), 0..4096)) {
        let d1 = hash_document(&content);
        let d2 = hash_document(&content);
        prop_assert_eq!(&d1, &d2);
        prop_assert_eq!(d1.bytes.len(), DIGEST_SIZE);
        prop_assert_eq!(d1.algorithm.as_str(), HASH_ALG);
    }
}

proptest! {
    #[test]
    fn prop_digest_distinct_inputs(
        a in prop::collection::vec(any::<u8>(), 0..2048),
        b in prop::collection::vec(any::<u8>(), 0..2048),
    ) {
        prop_assume!(a != b);
        prop_assert_ne!(hash_document(&a).bytes, hash_document(&b).bytes);
    }
}

proptest! {
    #[test]
    fn prop_digest_single_bit_avalanche(
        content in prop::collection::vec(any::<u8>(), 1..1024),
        byte in 0usize..1024,
        bit in 0u32..8,
    ) {
        let byte = byte % content.len();
        let mut flipped = content.clone();
        flipped[byte] ^= 1 << bit;
        prop_assert_ne!(hash_document(&content).bytes, hash_document(&flipped).bytes);
    }
}

// ============================================================================
// Property: Sign/verify round trip
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]
    #[test]
    fn prop_sign_verify_roundtrip(content in prop::collection::vec(any::<u8>(), 0..2048)) {
        let keypair = generate_signing_keypair().unwrap();
        let digest = hash_document(&content);
        let signature = sign_digest(&digest, &keypair.private).unwrap();

        prop_assert_eq!(signature.len(), SIGNATURE_SIZE);
        prop_assert!(verify_digest(&digest, &signature, &keypair.public).unwrap());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]
    #[test]
    fn prop_digest_bitflip_rejected(
        content in prop::collection::vec(any::<u8>(), 1..1024),
        byte in 0usize..32,
        bit in 0u32..8,
    ) {
        let keypair = generate_signing_keypair().unwrap();
        let digest = hash_document(&content);
        let signature = sign_digest(&digest, &keypair.private).unwrap();

        let mut flipped = digest.clone();
        flipped.bytes[byte] ^= 1 << bit;
        prop_assert!(!verify_digest(&flipped, &signature, &keypair.public).unwrap());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]
    #[test]
    fn prop_signature_bitflip_rejected(
        content in prop::collection::vec(any::<u8>(), 1..1024),
        byte in 0usize..4096,
        bit in 0u32..8,
    ) {
        let keypair = generate_signing_keypair().unwrap();
        let digest = hash_document(&content);
        let mut signature = sign_digest(&digest, &keypair.private).unwrap();

        let byte = byte % signature.len();
        signature[byte] ^= 1 << bit;
        prop_assert!(!verify_digest(&digest, &signature, &keypair.public).unwrap());
    }
}

// ============================================================================
// Property: Guest-link descriptor round trip
// ============================================================================

fn descriptor_strategy() -> impl Strategy<Value = SessionDescriptor> {
    (
        "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
        "[A-Za-z0-9_-]{1,40}",
        "[A-Za-z0-9_@.-]{1,40}",
        0i64..2_000_000_000,
        0i64..2_000_000_000,
    )
        .prop_map(
            |(session_id, document_id, created_by, created_at_unix, expires_at_unix)| {
                SessionDescriptor {
                    session_id,
                    document_id,
                    created_by,
                    created_at_unix,
                    expires_at_unix,
                }
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]
    #[test]
    fn prop_descriptor_roundtrip(descriptor in descriptor_strategy()) {
        let crypto = SessionCrypto::new().unwrap();
        let link = crypto.encapsulate_session(&descriptor).unwrap();

        prop_assert_eq!(link.encapsulated_key.len(), KEM_CIPHERTEXT_SIZE);
        let opened = crypto.decapsulate_session(&link).unwrap();
        prop_assert_eq!(opened, descriptor);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10))]
    #[test]
    fn prop_unrelated_keypair_rejected(descriptor in descriptor_strategy()) {
        let crypto = SessionCrypto::new().unwrap();
        let stranger = SessionCrypto::new().unwrap();

        let link = crypto.encapsulate_session(&descriptor).unwrap();
        let result = stranger.decapsulate_session(&link);
        prop_assert_eq!(result, Err(SignetError::DecryptionFailed));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]
    #[test]
    fn prop_link_tamper_rejected(
        descriptor in descriptor_strategy(),
        corruption_pos in 0usize..10000,
    ) {
        let crypto = SessionCrypto::new().unwrap();
        let mut link = crypto.encapsulate_session(&descriptor).unwrap();

        let pos = corruption_pos % link.ciphertext.len();
        link.ciphertext[pos] ^= 0xFF;

        let result = crypto.decapsulate_session(&link);
        prop_assert_eq!(result, Err(SignetError::DecryptionFailed));
    }
}

// ============================================================================
// Property: Link string encoding round trip
// ============================================================================

proptest! {
    #[test]
    fn prop_link_encoding_roundtrip(
        ciphertext in prop::collection::vec(any::<u8>(), 1..512),
        encapsulated_key in prop::collection::vec(any::<u8>(), 1..512),
    ) {
        let link = EncryptedSessionLink { ciphertext, encapsulated_key };
        let encoded = link.encode();

        // URL-safe: one separator, no padding, no characters outside the alphabet
        prop_assert_eq!(encoded.matches(':').count(), 1);
        prop_assert!(encoded
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':'));

        let decoded = EncryptedSessionLink::decode(&encoded).unwrap();
        prop_assert_eq!(decoded, link);
    }
}
