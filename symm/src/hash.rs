//! SM3 hashing and HMAC-SM3.

use crate::{Error, Result};
use hmac::{Hmac, Mac};

pub use sm3::{Digest, Sm3};

/// Size of an SM3 digest in bytes.
pub const DIGEST_SIZE: usize = 32;

/// SM3 digest.
pub type Hash = [u8; DIGEST_SIZE];

/// Incremental HMAC-SM3.
pub type HmacSm3 = Hmac<Sm3>;

/// Compute `SM3(data)`.
pub fn hash(data: &[u8]) -> Hash {
    Sm3::digest(data).into()
}

/// Compute `SM3(parts[0] || parts[1] || ...)` without concatenating.
pub fn hash_parts(parts: &[&[u8]]) -> Hash {
    let mut sm3 = Sm3::new();
    for part in parts {
        sm3.update(part);
    }
    sm3.finalize().into()
}

/// Compute HMAC-SM3 of `data` under `key`.
pub fn hmac(key: &[u8], data: &[u8]) -> Result<Hash> {
    let mut mac = HmacSm3::new_from_slice(key).map_err(|_| Error::InvalidKeyLength)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().into())
}

/// Check an HMAC-SM3 tag in constant time.
///
/// Truncated tags are accepted down to 16 bytes.
pub fn hmac_verify(key: &[u8], data: &[u8], tag: &[u8]) -> Result<()> {
    if tag.len() < DIGEST_SIZE / 2 || tag.len() > DIGEST_SIZE {
        return Err(Error::InvalidParameter);
    }

    let mut mac = HmacSm3::new_from_slice(key).map_err(|_| Error::InvalidKeyLength)?;
    mac.update(data);
    mac.verify_truncated_left(tag)
        .map_err(|_| Error::IntegrityCheckFailed)
}
