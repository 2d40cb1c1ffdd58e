#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(
    clippy::mod_module_files,
    clippy::cast_lossless,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::checked_conversions,
    clippy::implicit_saturating_sub,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    missing_docs,
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications
)]

pub mod asn1;
pub mod extensions;
pub mod name;

mod csr;
mod error;
mod issue;
mod items;
mod keys;
mod manager;
mod pem;
mod signing;
mod store;

pub use crate::{
    csr::{
        CHALLENGE_PASSWORD, CsrMode, CsrParams, TEMP_PUBLIC_KEY, csr_challenge_password,
        csr_public_key, csr_temp_public_key,
    },
    error::{Error, Result, status_code},
    issue::{CertUsage, MAX_SERIAL_LEN},
    items::{
        CertItem, CertItemValue, ITEM_CA_CERT, ITEM_COMMON_NAME, ITEM_CSR, ITEM_DESCRIPTION,
        ITEM_ISSUER_COMMON_NAME, ITEM_NOT_AFTER, ITEM_NOT_BEFORE, ITEM_PRIVATE_KEY,
        ITEM_PUBLIC_KEY, ITEM_SERIAL, ITEM_SUBJECT_ATTRIBUTE, ITEM_USAGE, ITEM_VALID_DAYS,
        certificate_item,
    },
    keys::{
        ID_EC_PUBLIC_KEY, parse_private_key_pem, private_key_from_der, private_key_from_pkcs8,
        private_key_hex_from_der, private_key_hex_to_der, private_key_to_der,
        public_key_from_der, public_key_hex_from_der, public_key_hex_to_der, public_key_to_der,
    },
    manager::{CertManager, CertManagerConfig, DEFAULT_MAX_CHAIN_DEPTH},
    name::SubjectFields,
    pem::{PemLabel, der_to_pem, pem_to_der},
    store::{CertStore, certificate_id},
};
