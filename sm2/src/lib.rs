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

pub mod dsa;
pub mod kex;
pub mod pke;

mod arithmetic;
mod context;
mod distid;
mod error;
mod keys;
mod runtime;

pub use crate::{
    arithmetic::{
        AffinePoint, CURVE, CurveParams, FieldElement, PrecomputedTable, ProjectivePoint,
        SM2P256, Scalar,
    },
    context::{ContextConfig, Sm2Context},
    distid::{DEFAULT_ID, MAX_ID_LEN, hash_z},
    dsa::{MAX_SIGNATURE_LEN, SignMode, Signature},
    error::{Error, Result, status_code},
    keys::{
        KeyPair, PRIVATE_KEY_HEX_LEN, PUBLIC_KEY_HEX_LEN, PrivateKey, PublicKey,
        check_public_key,
    },
    kex::{ConfirmedSharedKey, Role, SharedSecretSession},
    pke::{CipherMode, Ciphertext, ciphertext_len_upper_bound},
    runtime::Runtime,
};

pub use gm_symm::Hash;

/// OID of the SM2 curve: `1.2.156.10197.1.301`.
pub const SM2_OID: der::asn1::ObjectIdentifier =
    der::asn1::ObjectIdentifier::new_unwrap("1.2.156.10197.1.301");

/// OID of SM2 signatures with SM3: `1.2.156.10197.1.501`.
pub const SM2_WITH_SM3_OID: der::asn1::ObjectIdentifier =
    der::asn1::ObjectIdentifier::new_unwrap("1.2.156.10197.1.501");
