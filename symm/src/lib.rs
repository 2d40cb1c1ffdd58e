#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
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

pub mod block;
pub mod gcm;
pub mod hash;
pub mod kdf;

mod error;

pub use crate::{
    block::Padding,
    error::{Error, Result},
    gcm::Sm4Gcm,
    hash::{Hash, HmacSm3, Sm3, hash, hmac, hmac_verify},
    kdf::{kdf, kdf_into, kdf_xor, pbkdf2_hmac_sm3},
};
