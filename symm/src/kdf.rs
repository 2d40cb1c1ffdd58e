//! Key derivation: the SM2 counter-mode KDF and PBKDF2-HMAC-SM3.
//!
//! ```text
//! ct = 0x00000001
//! for i in 1..=ceil(klen / v):
//!     Ha_i = SM3(Z || ct)
//!     ct += 1
//! K = Ha_1 || Ha_2 || ... truncated to klen bytes
//! ```

use crate::{Error, Result, hash::HmacSm3};
use core::cmp::min;
use sm3::{Digest, Sm3};

/// Maximum total length of the shared secret `Z` accepted by the KDF.
pub const MAX_KDF_INPUT: usize = 1024;

/// Derive `klen` bytes from the shared secret `z`.
pub fn kdf(z: &[u8], klen: usize) -> Result<Vec<u8>> {
    let mut out = vec![0u8; klen];
    kdf_into(&[z], &mut out)?;
    Ok(out)
}

/// Fill `out` with key material derived from `z_parts[0] || z_parts[1] || ...`.
pub fn kdf_into(z_parts: &[&[u8]], out: &mut [u8]) -> Result<()> {
    run(z_parts, out, |dst, ha| dst.copy_from_slice(ha))
}

/// XOR the keystream derived from `z_parts` into `data`.
///
/// Returns `true` if every byte of the keystream was zero, which the SM2
/// encryption scheme treats as a failed draw.
pub fn kdf_xor(z_parts: &[&[u8]], data: &mut [u8]) -> Result<bool> {
    let mut acc = 0u8;
    run(z_parts, data, |dst, ha| {
        for (d, h) in dst.iter_mut().zip(ha) {
            acc |= *h;
            *d ^= *h;
        }
    })?;
    Ok(acc == 0)
}

fn run(z_parts: &[&[u8]], out: &mut [u8], mut apply: impl FnMut(&mut [u8], &[u8])) -> Result<()> {
    let z_len: usize = z_parts.iter().map(|part| part.len()).sum();
    if z_len == 0 || z_len > MAX_KDF_INPUT || out.is_empty() {
        return Err(Error::InvalidParameter);
    }

    let digest_size = <Sm3 as Digest>::output_size();
    let blocks = out.len().div_ceil(digest_size);
    if u32::try_from(blocks).is_err() {
        return Err(Error::InvalidParameter);
    }

    let mut sm3 = Sm3::new();
    let mut ct: u32 = 1;
    let mut offset = 0;
    while offset < out.len() {
        for part in z_parts {
            sm3.update(part);
        }
        sm3.update(ct.to_be_bytes());
        let ha = sm3.finalize_reset();

        let len = min(digest_size, out.len() - offset);
        apply(&mut out[offset..offset + len], &ha[..len]);
        offset += len;
        ct = ct.wrapping_add(1);
    }

    Ok(())
}

/// PBKDF2 with HMAC-SM3 as the pseudorandom function; fills all of `out`.
pub fn pbkdf2_hmac_sm3(password: &[u8], salt: &[u8], iterations: u32, out: &mut [u8]) -> Result<()> {
    if iterations == 0 || out.is_empty() {
        return Err(Error::InvalidParameter);
    }

    pbkdf2::pbkdf2::<HmacSm3>(password, salt, iterations, out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash_parts;

    #[test]
    fn first_block_is_hash_with_counter_one() {
        let z = b"shared secret";
        let k = kdf(z, 32).unwrap();
        assert_eq!(k, hash_parts(&[z, &[0, 0, 0, 1]]));
    }

    #[test]
    fn longer_output_extends_shorter() {
        let z = [7u8; 64];
        let short = kdf(&z, 20).unwrap();
        let long = kdf(&z, 70).unwrap();
        assert_eq!(long.len(), 70);
        assert_eq!(&long[..20], &short[..]);
        assert_eq!(&long[32..64], &hash_parts(&[&z, &[0, 0, 0, 2]]));
    }

    #[test]
    fn split_input_matches_joined() {
        let mut joined = [0u8; 48];
        kdf_into(&[b"0123456789abcdef0123456789abcdef"], &mut joined).unwrap();
        let mut split = [0u8; 48];
        kdf_into(&[b"0123456789abcdef", b"0123456789abcdef"], &mut split).unwrap();
        assert_eq!(joined, split);
    }

    #[test]
    fn xor_twice_restores() {
        let mut data = *b"attack at dawn";
        let all_zero = kdf_xor(&[b"z"], &mut data).unwrap();
        assert!(!all_zero);
        assert_ne!(&data, b"attack at dawn");
        kdf_xor(&[b"z"], &mut data).unwrap();
        assert_eq!(&data, b"attack at dawn");
    }

    #[test]
    fn rejects_oversized_input() {
        let z = vec![0u8; MAX_KDF_INPUT + 1];
        assert_eq!(kdf(&z, 16), Err(Error::InvalidParameter));
        assert_eq!(kdf(&z[..MAX_KDF_INPUT], 16).map(|k| k.len()), Ok(16));
        assert_eq!(kdf(b"", 16), Err(Error::InvalidParameter));
        assert_eq!(kdf(b"z", 0), Err(Error::InvalidParameter));
    }

    #[test]
    fn pbkdf2_is_deterministic_and_salted() {
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        let mut c = [0u8; 32];
        pbkdf2_hmac_sm3(b"password", b"salt", 16, &mut a).unwrap();
        pbkdf2_hmac_sm3(b"password", b"salt", 16, &mut b).unwrap();
        pbkdf2_hmac_sm3(b"password", b"pepper", 16, &mut c).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(
            pbkdf2_hmac_sm3(b"password", b"salt", 0, &mut a),
            Err(Error::InvalidParameter)
        );
    }
}
