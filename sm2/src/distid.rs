//! Distinguished identifier support.

use crate::{AffinePoint, Error, Hash, Result, arithmetic::CURVE};
use sm3::{Digest, Sm3};

/// Identifier used when the caller supplies an empty one.
pub const DEFAULT_ID: &[u8] = b"1234567812345678";

/// Longest identifier whose bit length fits the 16-bit `ENTL` field.
pub const MAX_ID_LEN: usize = 8191;

/// Substitute the default identifier for an empty one.
pub(crate) fn effective_id(id: &[u8]) -> &[u8] {
    if id.is_empty() { DEFAULT_ID } else { id }
}

/// Compute user information hash `Z` according to [draft-shen-sm2-ecdsa § 5.1.4.4].
///
/// ```text
/// ZA=H256(ENTLA || IDA || a || b || xG || yG || xA || yA)
/// ```
///
/// An empty `id` is replaced by [`DEFAULT_ID`].
///
/// [draft-shen-sm2-ecdsa § 5.1.4.4]: https://datatracker.ietf.org/doc/html/draft-shen-sm2-ecdsa-02#section-5.1.4.4
pub fn hash_z(id: &[u8], public_key: &AffinePoint) -> Result<Hash> {
    let id = effective_id(id);
    if id.len() > MAX_ID_LEN {
        return Err(Error::InvalidParameter);
    }
    let entla = u16::try_from(id.len() * 8).map_err(|_| Error::InvalidParameter)?;

    let mut sm3 = Sm3::new();
    sm3.update(entla.to_be_bytes());
    sm3.update(id);
    sm3.update(CURVE.z_prefix());
    sm3.update(public_key.x_bytes());
    sm3.update(public_key.y_bytes());
    Ok(sm3.finalize().into())
}

/// `e = SM3(Z || M)`.
pub(crate) fn hash_msg(z: &Hash, msg: &[u8]) -> Hash {
    Sm3::new_with_prefix(z).chain_update(msg).finalize().into()
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_ID, MAX_ID_LEN, hash_z};
    use crate::{AffinePoint, Error};

    #[test]
    fn empty_id_uses_default() {
        let g = AffinePoint::GENERATOR;
        assert_eq!(hash_z(b"", &g).unwrap(), hash_z(DEFAULT_ID, &g).unwrap());
    }

    #[test]
    fn oversized_id_rejected() {
        let id = vec![b'a'; MAX_ID_LEN + 1];
        assert_eq!(
            hash_z(&id, &AffinePoint::GENERATOR),
            Err(Error::InvalidParameter)
        );
        assert!(hash_z(&id[..MAX_ID_LEN], &AffinePoint::GENERATOR).is_ok());
    }
}
