//! Request, issuance and chain verification tests.

use der::Decode;
use gm_cert::{
    CertItem, CertItemValue, CertManager, CertManagerConfig, CertUsage, CsrParams, Error,
    ITEM_COMMON_NAME, ITEM_DESCRIPTION, ITEM_ISSUER_COMMON_NAME, ITEM_NOT_AFTER, ITEM_NOT_BEFORE,
    ITEM_PUBLIC_KEY, ITEM_SERIAL, SubjectFields,
    asn1::Certificate,
    csr_challenge_password, csr_public_key, csr_temp_public_key,
    extensions::{
        ID_CE_BASIC_CONSTRAINTS, ID_CE_KEY_USAGE, KeyUsage, parse_basic_constraints,
        parse_key_usage,
    },
};
use gm_sm2::{ContextConfig, KeyPair, Sm2Context};

fn manager_with(config: CertManagerConfig) -> CertManager {
    let ctx = Sm2Context::with_config(&ContextConfig::new().seed([9; 32])).unwrap();
    CertManager::with_context(config, ctx).unwrap()
}

fn manager() -> CertManager {
    manager_with(CertManagerConfig::new())
}

fn subject(cn: &str) -> SubjectFields {
    SubjectFields {
        country: Some("CN".into()),
        organization: Some("Example".into()),
        common_name: Some(cn.into()),
        ..Default::default()
    }
}

fn csr_for(manager: &mut CertManager, cn: &str, keys: &KeyPair) -> Vec<u8> {
    let params = CsrParams::new(subject(cn), keys.public_key(), keys.private_key());
    manager.generate_csr(&params).unwrap()
}

struct Pki {
    root_keys: KeyPair,
    root: Vec<u8>,
    leaf_keys: KeyPair,
    leaf: Vec<u8>,
}

fn issue_pki(manager: &mut CertManager) -> Pki {
    let root_keys = manager.context_mut().generate_key_pair().unwrap();
    let csr = csr_for(manager, "root", &root_keys);
    let root = manager
        .generate_certificate(&csr, None, "01", root_keys.private_key(), 3650, CertUsage::Both)
        .unwrap();

    let leaf_keys = manager.context_mut().generate_key_pair().unwrap();
    let csr = csr_for(manager, "leaf", &leaf_keys);
    let leaf = manager
        .generate_certificate(&csr, Some(&root), "02", root_keys.private_key(), 365, CertUsage::Sign)
        .unwrap();

    Pki {
        root_keys,
        root,
        leaf_keys,
        leaf,
    }
}

#[test]
fn root_and_leaf_verify() {
    let mut manager = manager();
    let pki = issue_pki(&mut manager);
    let root_id = manager.import_certificate(&pki.root).unwrap();
    let leaf_id = manager.import_certificate(&pki.leaf).unwrap();

    manager.verify_chain(&root_id).unwrap();
    manager.verify_chain(&leaf_id).unwrap();
    assert!(manager.is_root(&root_id).unwrap());
    assert!(!manager.is_root(&leaf_id).unwrap());

    assert_eq!(&manager.read_public_key(&leaf_id).unwrap(), pki.leaf_keys.public_key());
    assert_eq!(&manager.read_public_key(&root_id).unwrap(), pki.root_keys.public_key());
}

#[test]
fn corrupted_leaf_signature() {
    let mut manager = manager();
    let pki = issue_pki(&mut manager);
    manager.import_certificate(&pki.root).unwrap();

    let mut leaf = pki.leaf.clone();
    *leaf.last_mut().unwrap() ^= 0x01;
    let leaf_id = manager.import_certificate(&leaf).unwrap();
    assert!(matches!(
        manager.verify_chain(&leaf_id),
        Err(Error::ChainVerificationFailed)
    ));
}

#[test]
fn missing_issuer() {
    let mut manager = manager();
    let pki = issue_pki(&mut manager);
    let leaf_id = manager.import_certificate(&pki.leaf).unwrap();
    assert!(matches!(
        manager.verify_chain(&leaf_id),
        Err(Error::ChainVerificationFailed)
    ));
}

#[test]
fn chain_depth_limit() {
    let mut manager = manager_with(CertManagerConfig::new().max_chain_depth(1));
    let pki = issue_pki(&mut manager);
    let root_id = manager.import_certificate(&pki.root).unwrap();
    let leaf_id = manager.import_certificate(&pki.leaf).unwrap();

    manager.verify_chain(&root_id).unwrap();
    assert!(matches!(
        manager.verify_chain(&leaf_id),
        Err(Error::ChainVerificationFailed)
    ));
}

#[test]
fn extensions_follow_usage() {
    let mut manager = manager();
    let pki = issue_pki(&mut manager);

    let root = Certificate::from_der(&pki.root).unwrap().tbs_certificate;
    let bc = parse_basic_constraints(root.extension(ID_CE_BASIC_CONSTRAINTS).unwrap()).unwrap();
    let ku = parse_key_usage(root.extension(ID_CE_KEY_USAGE).unwrap()).unwrap();
    assert!(bc.ca);
    assert!(ku.contains(KeyUsage::KEY_CERT_SIGN | KeyUsage::KEY_AGREEMENT));

    let leaf = Certificate::from_der(&pki.leaf).unwrap().tbs_certificate;
    let bc = parse_basic_constraints(leaf.extension(ID_CE_BASIC_CONSTRAINTS).unwrap()).unwrap();
    let ku = parse_key_usage(leaf.extension(ID_CE_KEY_USAGE).unwrap()).unwrap();
    assert!(!bc.ca);
    assert_eq!(ku, KeyUsage::DIGITAL_SIGNATURE | KeyUsage::NON_REPUDIATION);
    assert_eq!(leaf.issuer, root.subject);
}

#[test]
fn ca_key_must_match() {
    let mut manager = manager();
    let pki = issue_pki(&mut manager);
    let csr = csr_for(&mut manager, "other", &pki.leaf_keys);

    // self-signed with a key other than the requested one
    let result =
        manager.generate_certificate(&csr, None, "03", pki.root_keys.private_key(), 1, CertUsage::Sign);
    assert!(matches!(result, Err(Error::Sm2(gm_sm2::Error::InvalidKey))));

    // CA-signed with a key other than the CA's
    let result = manager.generate_certificate(
        &csr,
        Some(&pki.root),
        "03",
        pki.leaf_keys.private_key(),
        1,
        CertUsage::Sign,
    );
    assert!(matches!(result, Err(Error::Sm2(gm_sm2::Error::InvalidKey))));
}

#[test]
fn bad_issuance_parameters() {
    let mut manager = manager();
    let keys = manager.context_mut().generate_key_pair().unwrap();
    let csr = csr_for(&mut manager, "root", &keys);
    let sk = keys.private_key();

    for (serial, days) in [("", 1), ("zz", 1), ("00", 1), ("01", 0)] {
        let result = manager.generate_certificate(&csr, None, serial, sk, days, CertUsage::Sign);
        assert!(matches!(result, Err(Error::InvalidParameter)), "{serial} {days}");
    }

    let long_serial = "11".repeat(21);
    let result = manager.generate_certificate(&csr, None, &long_serial, sk, 1, CertUsage::Sign);
    assert!(matches!(result, Err(Error::InvalidParameter)));

    let result = manager.generate_certificate(b"\x30\x00", None, "01", sk, 1, CertUsage::Sign);
    assert!(matches!(result, Err(Error::EncodingError)));
}

#[test]
fn request_signed_under_other_id_rejected() {
    let mut requester = manager_with(CertManagerConfig::new().distid(b"alice@example.com".to_vec()));
    let keys = requester.context_mut().generate_key_pair().unwrap();
    let csr = csr_for(&mut requester, "alice", &keys);
    assert_eq!(&requester.verify_csr(&csr).unwrap(), keys.public_key());

    let mut ca = manager();
    assert!(matches!(
        ca.verify_csr(&csr),
        Err(Error::Sm2(gm_sm2::Error::SignatureInvalid))
    ));
    let result = ca.generate_certificate(&csr, None, "01", keys.private_key(), 1, CertUsage::Sign);
    assert!(matches!(result, Err(Error::Sm2(gm_sm2::Error::SignatureInvalid))));
}

#[test]
fn request_attributes() {
    let mut manager = manager();
    let keys = manager.context_mut().generate_key_pair().unwrap();
    let temp = manager.context_mut().generate_key_pair().unwrap();

    let params = CsrParams::new(subject("alice"), keys.public_key(), keys.private_key())
        .challenge_password("secret")
        .double(temp.public_key());
    let csr = manager.generate_csr(&params).unwrap();

    assert_eq!(&csr_public_key(&csr).unwrap(), keys.public_key());
    assert_eq!(csr_temp_public_key(&csr).unwrap().as_ref(), Some(temp.public_key()));
    assert_eq!(csr_challenge_password(&csr).unwrap().as_deref(), Some("secret"));

    let single = csr_for(&mut manager, "bob", &keys);
    assert_eq!(csr_temp_public_key(&single).unwrap(), None);
    assert_eq!(csr_challenge_password(&single).unwrap(), None);
}

#[test]
fn double_mode_requires_temp_key() {
    let mut manager = manager();
    let keys = manager.context_mut().generate_key_pair().unwrap();
    let mut params = CsrParams::new(subject("alice"), keys.public_key(), keys.private_key());
    params.mode = gm_cert::CsrMode::Double;
    assert!(matches!(manager.generate_csr(&params), Err(Error::InvalidParameter)));
}

#[test]
fn request_key_mismatch() {
    let mut manager = manager();
    let a = manager.context_mut().generate_key_pair().unwrap();
    let b = manager.context_mut().generate_key_pair().unwrap();
    let params = CsrParams::new(subject("alice"), a.public_key(), b.private_key());
    assert!(matches!(
        manager.generate_csr(&params),
        Err(Error::Sm2(gm_sm2::Error::InvalidKey))
    ));
}

#[test]
fn empty_subject_rejected() {
    let mut manager = manager();
    let keys = manager.context_mut().generate_key_pair().unwrap();
    let params = CsrParams::new(SubjectFields::default(), keys.public_key(), keys.private_key());
    assert!(matches!(manager.generate_csr(&params), Err(Error::InvalidParameter)));
}

#[test]
fn item_based_issuance() {
    let mut manager = manager();
    let pki = issue_pki(&mut manager);
    let keys = manager.context_mut().generate_key_pair().unwrap();
    let csr = csr_for(&mut manager, "carol", &keys);

    let items = [
        CertItem::Csr(csr),
        CertItem::Serial("0A".into()),
        CertItem::PrivateKey(pki.root_keys.private_key().to_hex().as_str().to_owned()),
        CertItem::ValidDays(30),
        CertItem::Usage(CertUsage::Encrypt),
        CertItem::CaCert(pki.root.clone()),
        CertItem::Description("first".into()),
        CertItem::Description("second".into()),
        CertItem::CommonName("carol-alt".into()),
    ];
    let cert = manager.generate_certificate2(&items).unwrap();

    let read = |id| manager.certificate_item(&cert, id).unwrap();
    assert_eq!(read(ITEM_PUBLIC_KEY), CertItemValue::Single(keys.public_key().to_hex()));
    assert_eq!(read(ITEM_SERIAL), CertItemValue::Single("0A".into()));
    assert_eq!(read(ITEM_DESCRIPTION).to_string(), r#"["first","second"]"#);
    assert_eq!(
        read(ITEM_COMMON_NAME),
        CertItemValue::Multiple(vec!["carol".into(), "carol-alt".into()])
    );
    assert_eq!(read(ITEM_ISSUER_COMMON_NAME), CertItemValue::Single("root".into()));

    let secs = |v: CertItemValue| match v {
        CertItemValue::Single(s) => s.parse::<u64>().unwrap(),
        other => panic!("unexpected {other:?}"),
    };
    assert_eq!(secs(read(ITEM_NOT_AFTER)) - secs(read(ITEM_NOT_BEFORE)), 30 * 86_400);

    let root_id = manager.import_certificate(&pki.root).unwrap();
    let id = manager.import_certificate(&cert).unwrap();
    manager.verify_chain(&id).unwrap();
    let (not_before, not_after) = manager.read_validity(&id).unwrap();
    assert_eq!(not_after - not_before, 30 * 86_400);
    assert!(manager.ids().contains(&root_id));
}

#[test]
fn item_based_issuance_requires_four_items() {
    let mut manager = manager();
    let keys = manager.context_mut().generate_key_pair().unwrap();
    let csr = csr_for(&mut manager, "dave", &keys);

    let items = [
        CertItem::Csr(csr),
        CertItem::Serial("01".into()),
        CertItem::PrivateKey(keys.private_key().to_hex().as_str().to_owned()),
    ];
    assert!(matches!(
        manager.generate_certificate2(&items),
        Err(Error::InvalidParameter)
    ));
}

#[test]
fn unknown_read_item() {
    let mut manager = manager();
    let pki = issue_pki(&mut manager);
    assert!(matches!(
        manager.certificate_item(&pki.root, 9999),
        Err(Error::InvalidParameter)
    ));
}

#[test]
fn export_and_delete() {
    let mut manager = manager();
    let pki = issue_pki(&mut manager);
    let id = manager.import_certificate(&pki.root).unwrap();
    assert_eq!(manager.import_certificate(&pki.root).unwrap(), id);
    assert_eq!(manager.export_certificate(&id).unwrap(), pki.root);

    manager.delete_certificate(&id).unwrap();
    assert!(matches!(
        manager.export_certificate(&id),
        Err(Error::CertificateNotFound(_))
    ));
    assert!(matches!(
        manager.delete_certificate(&id),
        Err(Error::CertificateNotFound(_))
    ));
    let err = manager.delete_certificate("unknown").unwrap_err();
    assert_eq!(err.code(), 7);
}

#[test]
fn import_rejects_garbage() {
    let mut manager = manager();
    assert!(matches!(
        manager.import_certificate(b"not a certificate"),
        Err(Error::EncodingError)
    ));
}

#[test]
fn invalid_config() {
    let ctx = Sm2Context::with_config(&ContextConfig::new().seed([1; 32])).unwrap();
    assert!(matches!(
        CertManager::with_context(CertManagerConfig::new().max_chain_depth(0), ctx),
        Err(Error::InvalidParameter)
    ));
}
