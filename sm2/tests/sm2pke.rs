//! SM2 public key encryption tests.

use gm_sm2::{
    CipherMode, Ciphertext, ContextConfig, Error, PrivateKey, Sm2Context,
    ciphertext_len_upper_bound,
};
use hex_literal::hex;
use proptest::prelude::*;

// private key bytes
const PRIVATE_KEY: [u8; 32] =
    hex!("3DDD2A3679BF6F1DFC3B49D3E99114718E48EC170EB4E4D3A82052DAB19E8B50");
const MSG: &[u8] = b"plaintext";

// starts with 04, ciphertext
const CIPHER: [u8; 106] = hex!("041ed68db303f5bc6bce516d5a62e1cd16781d3007df6864d970a56d46a6cecca0e0d33bfc71e78c440ae6afeef1a18cce473b3e27002189a058ddadc9182c80a3f13be66476ba6ef66d95a7fb11f30de441b3b66d566e48348bd830e584e7ec37f9b704ef32eba9055c");
// asn.1: openssl pkeyutl -encrypt -pubin -in plaintext -inkey sm2.pub -out cipher
const ASN1_CIPHER: [u8; 116] = hex!("307202206ba17ad462a75beeb2caf8a1282687ab7e2f248b776a481612d89425a519ce6002210083e1de8c57dae995137227839d3880eaf9fe82a885a750be29ebe58193c8e31a0420d513a555087c2b17a88dd62749435133d325a4afca675284c85d754ba35670f80409bd3a294a6d50184b37");

fn context() -> Sm2Context {
    Sm2Context::with_config(&ContextConfig::new().seed([3; 32])).unwrap()
}

fn private_key() -> PrivateKey {
    PrivateKey::from_bytes(&PRIVATE_KEY).unwrap()
}

#[test]
fn decrypt_verify() {
    let ctx = context();
    let pt = ctx
        .decrypt(&CIPHER, &private_key(), CipherMode::Prefixed04C1C3C2)
        .unwrap();
    assert_eq!(pt, MSG);
}

#[test]
fn decrypt_der_verify() {
    let ctx = context();
    let pt = ctx
        .decrypt(&ASN1_CIPHER, &private_key(), CipherMode::C1C3C2Asn1)
        .unwrap();
    assert_eq!(pt, MSG);
}

#[test]
fn decrypt_after_relayout() {
    let ctx = context();
    let ct = Ciphertext::from_bytes(&CIPHER, CipherMode::Prefixed04C1C3C2).unwrap();
    for mode in CipherMode::ALL {
        let encoded = ct.to_vec(mode).unwrap();
        assert_eq!(ctx.decrypt(&encoded, &private_key(), mode).unwrap(), MSG);
    }
}

#[test]
fn tampered_c3_fails_integrity_check() {
    let ctx = context();
    let mut ct = CIPHER;
    // C3 follows the 65-byte C1
    ct[70] ^= 0x01;
    assert_eq!(
        ctx.decrypt(&ct, &private_key(), CipherMode::Prefixed04C1C3C2),
        Err(Error::IntegrityCheckFailed)
    );
}

#[test]
fn tampered_c2_fails_integrity_check() {
    let ctx = context();
    let mut ct = CIPHER;
    let last = ct.len() - 1;
    ct[last] ^= 0x80;
    assert_eq!(
        ctx.decrypt(&ct, &private_key(), CipherMode::Prefixed04C1C3C2),
        Err(Error::IntegrityCheckFailed)
    );
}

#[test]
fn wrong_key_fails_integrity_check() {
    let mut ctx = context();
    let other = ctx.generate_private_key();
    assert_eq!(
        ctx.decrypt(&CIPHER, &other, CipherMode::Prefixed04C1C3C2),
        Err(Error::IntegrityCheckFailed)
    );
}

#[test]
fn truncated_ciphertext_is_rejected() {
    let ctx = context();
    assert!(
        ctx.decrypt(&CIPHER[..97], &private_key(), CipherMode::Prefixed04C1C3C2)
            .is_err()
    );
    assert!(
        ctx.decrypt(&ASN1_CIPHER[..100], &private_key(), CipherMode::C1C3C2Asn1)
            .is_err()
    );
}

#[test]
fn empty_plaintext_is_rejected() {
    let mut ctx = context();
    let pk = private_key().public_key();
    assert_eq!(
        ctx.encrypt(b"", &pk, CipherMode::C1C3C2),
        Err(Error::InvalidParameter)
    );
}

#[test]
fn decrypt_into_checks_capacity() {
    let ctx = context();
    let mut out = [0u8; 8];
    assert_eq!(
        ctx.decrypt_into(&CIPHER, &private_key(), CipherMode::Prefixed04C1C3C2, &mut out),
        Err(Error::BufferTooSmall {
            required: MSG.len(),
            capacity: 8
        })
    );

    let mut out = [0u8; 16];
    let len = ctx
        .decrypt_into(&CIPHER, &private_key(), CipherMode::Prefixed04C1C3C2, &mut out)
        .unwrap();
    assert_eq!(&out[..len], MSG);
}

#[test]
fn encrypt_into_checks_capacity() {
    let mut ctx = context();
    let pk = private_key().public_key();
    let mut out = [0u8; 32];
    assert!(matches!(
        ctx.encrypt_into(MSG, &pk, CipherMode::C1C3C2, &mut out),
        Err(Error::BufferTooSmall { capacity: 32, .. })
    ));

    let mut out = vec![0u8; ciphertext_len_upper_bound(MSG.len(), CipherMode::C1C3C2Asn1)];
    let len = ctx
        .encrypt_into(MSG, &pk, CipherMode::C1C3C2Asn1, &mut out)
        .unwrap();
    assert_eq!(
        ctx.decrypt(&out[..len], &private_key(), CipherMode::C1C3C2Asn1)
            .unwrap(),
        MSG
    );
}

#[test]
fn ciphertexts_are_randomized() {
    let mut ctx = context();
    let pk = private_key().public_key();
    let a = ctx.encrypt(MSG, &pk, CipherMode::C1C3C2).unwrap();
    let b = ctx.encrypt(MSG, &pk, CipherMode::C1C3C2).unwrap();
    assert_ne!(a, b);
}

prop_compose! {
    fn decrypting_key()(bytes in any::<[u8; 32]>()) -> PrivateKey {
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
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn encrypt_and_decrypt(
        sk in decrypting_key(),
        msg in proptest::collection::vec(any::<u8>(), 1..300),
        mode in proptest::sample::select(CipherMode::ALL.to_vec()),
    ) {
        let mut ctx = context();
        let pk = sk.public_key();
        let ct = ctx.encrypt(&msg, &pk, mode).unwrap();
        prop_assert!(ct.len() <= ciphertext_len_upper_bound(msg.len(), mode));
        prop_assert_eq!(ctx.decrypt(&ct, &sk, mode).unwrap(), msg);
    }
}
