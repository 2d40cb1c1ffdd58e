//! SM2DSA tests.

use gm_sm2::{
    ContextConfig, Error, PrivateKey, PublicKey, SignMode, Sm2Context,
    dsa::{
        Signature, SigningKey, VerifyingKey,
        signature::{RandomizedSigner, Verifier},
    },
};
use hex_literal::hex;
use proptest::prelude::*;
use rand_chacha::{ChaCha20Rng, rand_core::SeedableRng};

const PUBLIC_KEY: [u8; 65] = hex!(
    "0408D77AE04C01CC4C1104360DD8AF6B6F7DF334283D7C1A6AFD5652407B87BEE5014E2A57C36C150D16324DC664E31E6432359609C4E79847A5B161C8C7364C8A"
);
const IDENTITY: &[u8] = b"example@rustcrypto.org";
const MSG: &[u8] = b"testing";

// Created using:
// $ openssl pkeyutl -sign -in - -inkey pkcs8-private-key.pem -out sig -digest sm3 -pkeyopt distid:example@rustcrypto.org
const SIG: [u8; 64] = hex!(
    "d1dcccedd9fb785e0f67c16b7c52901625c0b69de9bca2144acc7be713cad2fc" // r
    "f7d1eae6e3a157b36c65f672f738ca8b46298bf149a6510072c431b49cd88b1c" // s
);

const SIG_DER: [u8; 71] = hex!(
    "304502201d09df0f021b8c9aa7a437c713f11f9bc5ef49b5f053de912d6a3a8b68d49688022100c8acda282cb69bd4734b9c164925772f8f5cb23b273c222d69a4a49bb40a8701"
);

fn context() -> Sm2Context {
    Sm2Context::with_config(&ContextConfig::new().seed([7; 32])).unwrap()
}

fn public_key() -> PublicKey {
    PublicKey::from_sec1_bytes(&PUBLIC_KEY).unwrap()
}

#[test]
fn verify_test_vector() {
    let ctx = context();
    assert!(ctx.verify(MSG, IDENTITY, &SIG, &public_key(), SignMode::Rs).unwrap());
}

#[test]
fn verify_test_vector_der() {
    let ctx = context();
    let der = Signature::from_bytes(&SIG).unwrap().encode(SignMode::RsAsn1).unwrap();
    assert!(ctx.verify(MSG, IDENTITY, &der, &public_key(), SignMode::RsAsn1).unwrap());
}

#[test]
fn verify_test_vector_with_verifying_key() {
    let vk = VerifyingKey::from_sec1_bytes(IDENTITY, &PUBLIC_KEY).unwrap();
    let sig = Signature::from_bytes(&SIG).expect("decoded Signature failed");
    assert!(vk.verify(MSG, &sig).is_ok());
}

#[test]
fn reject_wrong_identity_and_message() {
    let ctx = context();
    let pk = public_key();
    assert!(!ctx.verify(MSG, b"other@rustcrypto.org", &SIG, &pk, SignMode::Rs).unwrap());
    assert!(!ctx.verify(b"testinG", IDENTITY, &SIG, &pk, SignMode::Rs).unwrap());
}

#[test]
fn malformed_signature_is_not_an_error() {
    let ctx = context();
    let pk = public_key();
    assert!(!ctx.verify(MSG, IDENTITY, &SIG[..63], &pk, SignMode::Rs).unwrap());
    assert!(!ctx.verify(MSG, IDENTITY, &SIG, &pk, SignMode::RsAsn1).unwrap());
    assert!(!ctx.verify(MSG, IDENTITY, &[0u8; 64], &pk, SignMode::Rs).unwrap());
}

#[test]
fn oversized_identity_is_rejected() {
    let ctx = context();
    let id = vec![b'a'; gm_sm2::MAX_ID_LEN + 1];
    assert_eq!(
        ctx.verify(MSG, &id, &SIG, &public_key(), SignMode::Rs),
        Err(Error::InvalidParameter)
    );
}

#[test]
fn signature_der_decoding() {
    let sig = Signature::decode(&SIG_DER, SignMode::RsAsn1).expect("decoded Signature failed");
    assert_eq!(sig.r().to_bytes().to_vec(), SIG_DER[4..36].to_vec());
    assert_eq!(sig.s().to_bytes().to_vec(), SIG_DER[39..71].to_vec());
    assert_eq!(sig.encode(SignMode::RsAsn1).unwrap(), SIG_DER);
}

#[test]
fn sign_into_reports_required_capacity() {
    let mut ctx = context();
    let key_pair = ctx.generate_key_pair().unwrap();
    let mut out = [0u8; 63];
    let result = ctx.sign_into(
        MSG,
        IDENTITY,
        key_pair.public_key(),
        key_pair.private_key(),
        SignMode::Rs,
        &mut out,
    );
    assert_eq!(
        result,
        Err(Error::BufferTooSmall {
            required: 64,
            capacity: 63
        })
    );

    let mut out = [0u8; gm_sm2::MAX_SIGNATURE_LEN];
    let len = ctx
        .sign_into(
            MSG,
            IDENTITY,
            key_pair.public_key(),
            key_pair.private_key(),
            SignMode::RsAsn1,
            &mut out,
        )
        .unwrap();
    assert!(
        ctx.verify(MSG, IDENTITY, &out[..len], key_pair.public_key(), SignMode::RsAsn1)
            .unwrap()
    );
}

#[test]
fn varying_message_lengths() {
    let mut ctx = context();
    let key_pair = ctx.generate_key_pair().unwrap();
    for msg in [vec![], vec![1u8; 1], vec![2u8; 32], vec![3u8; 1024]] {
        let sig = ctx
            .sign(&msg, b"", key_pair.public_key(), key_pair.private_key(), SignMode::Rs)
            .unwrap();
        assert!(ctx.verify(&msg, b"", &sig, key_pair.public_key(), SignMode::Rs).unwrap());
    }
}

#[test]
fn empty_identity_selects_default() {
    let mut ctx = context();
    let key_pair = ctx.generate_key_pair().unwrap();
    let sig = ctx
        .sign(MSG, b"", key_pair.public_key(), key_pair.private_key(), SignMode::RsAsn1)
        .unwrap();
    assert!(
        ctx.verify(MSG, gm_sm2::DEFAULT_ID, &sig, key_pair.public_key(), SignMode::RsAsn1)
            .unwrap()
    );
}

#[test]
fn signing_key_matches_context() {
    let mut ctx = context();
    let key_pair = ctx.generate_key_pair().unwrap();
    let sk = SigningKey::new(IDENTITY, key_pair.private_key()).unwrap();
    let mut rng = ChaCha20Rng::from_seed([9; 32]);

    let sig = sk.sign_with_rng(&mut rng, MSG);
    assert!(
        ctx.verify(MSG, IDENTITY, &sig.to_bytes(), key_pair.public_key(), SignMode::Rs)
            .unwrap()
    );
}

prop_compose! {
    fn private_key()(bytes in any::<[u8; 32]>()) -> PrivateKey {
        let mut bytes = bytes;
        loop {
            if let Ok(key) = PrivateKey::from_bytes(&bytes) {
                return key;
            }
            bytes = gm_symm::hash(&bytes);
        }
    }
}

proptest! {
    #[test]
    fn sign_and_verify(sk in private_key(), mode in prop_oneof![Just(SignMode::Rs), Just(SignMode::RsAsn1)]) {
        let mut ctx = context();
        let pk = sk.public_key();
        let sig = ctx.sign(MSG, IDENTITY, &pk, &sk, mode).unwrap();
        prop_assert!(ctx.verify(MSG, IDENTITY, &sig, &pk, mode).unwrap());
    }

    #[test]
    fn reject_invalid_signature(sk in private_key(), byte in 0usize..64, bit in 0usize..8) {
        let mut ctx = context();
        let pk = sk.public_key();
        let mut sig = ctx.sign(MSG, IDENTITY, &pk, &sk, SignMode::Rs).unwrap();

        // tweak signature to make it invalid
        sig[byte] ^= 1 << bit;

        prop_assert!(!ctx.verify(MSG, IDENTITY, &sig, &pk, SignMode::Rs).unwrap());
    }

    #[test]
    fn reject_flipped_message_bit(
        sk in private_key(),
        msg in proptest::collection::vec(any::<u8>(), 1..96),
        index in any::<prop::sample::Index>(),
        bit in 0usize..8,
    ) {
        let mut ctx = context();
        let pk = sk.public_key();
        let mut tampered = msg.clone();
        tampered[index.index(msg.len())] ^= 1 << bit;

        for mode in [SignMode::Rs, SignMode::RsAsn1] {
            let sig = ctx.sign(&msg, IDENTITY, &pk, &sk, mode).unwrap();
            prop_assert_eq!(ctx.verify(&tampered, IDENTITY, &sig, &pk, mode), Ok(false));
        }
    }
}
