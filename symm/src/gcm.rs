//! SM4 in Galois/Counter Mode (NIST SP 800-38D, RFC 8998).
//!
//! IVs of any non-zero length are accepted: 96-bit IVs are used directly as
//! the counter prefix, others are compressed with GHASH. Tags may be
//! truncated to 4, 8 or 12..=16 bytes. The plaintext is either used as is
//! or PKCS#7-padded to a whole number of blocks before encryption.

use crate::{
    Error, Result,
    block::{self, BLOCK_SIZE, KEY_SIZE, Padding, padded_len},
};
use cipher::{BlockEncrypt, KeyInit, KeyIvInit, StreamCipher};
use ghash::{GHash, universal_hash::UniversalHash};
use log::trace;
use sm4::Sm4;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

type Ctr = ctr::Ctr32BE<Sm4>;

/// Size of a full GCM tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Recommended IV size in bytes.
pub const IV_SIZE: usize = 12;

/// SM4-GCM keyed state.
pub struct Sm4Gcm {
    key: Zeroizing<[u8; KEY_SIZE]>,
    ghash_key: Zeroizing<[u8; BLOCK_SIZE]>,
}

impl Sm4Gcm {
    /// Create a new instance from a 16-byte key.
    pub fn new(key: &[u8]) -> Result<Self> {
        let key: [u8; KEY_SIZE] = key.try_into().map_err(|_| Error::InvalidKeyLength)?;
        let cipher = Sm4::new(&key.into());

        let mut h = cipher::Block::<Sm4>::default();
        cipher.encrypt_block(&mut h);

        Ok(Self {
            key: Zeroizing::new(key),
            ghash_key: Zeroizing::new(h.into()),
        })
    }

    /// Encrypt `plaintext`, authenticating it together with `aad`.
    ///
    /// With [`Padding::None`] the ciphertext has the plaintext's length;
    /// [`Padding::Pkcs7`] pads to the next whole block first. Returns the
    /// ciphertext and a tag of `tag_len` bytes.
    pub fn encrypt(
        &self,
        iv: &[u8],
        aad: &[u8],
        plaintext: &[u8],
        padding: Padding,
        tag_len: usize,
    ) -> Result<(Vec<u8>, Vec<u8>)> {
        check_tag_len(tag_len)?;
        let j0 = self.j0(iv)?;
        let mut ctr = self.counter(&j0)?;

        let mut mask = [0u8; BLOCK_SIZE];
        ctr.apply_keystream(&mut mask);

        let mut ciphertext = match padding {
            Padding::Pkcs7 => block::pkcs7_pad(plaintext),
            Padding::None => plaintext.to_vec(),
        };
        ctr.apply_keystream(&mut ciphertext);

        let mut tag = self.ghash(aad, &ciphertext);
        xor_in_place(&mut tag, &mask);
        Ok((ciphertext, tag[..tag_len].to_vec()))
    }

    /// Verify `tag` and decrypt `ciphertext`.
    ///
    /// Nothing is decrypted unless the tag matches. With
    /// [`Padding::Pkcs7`] a malformed pad after a valid tag fails with
    /// [`Error::InvalidPadding`].
    pub fn decrypt(
        &self,
        iv: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        padding: Padding,
    ) -> Result<Vec<u8>> {
        check_tag_len(tag.len())?;
        let j0 = self.j0(iv)?;
        let mut ctr = self.counter(&j0)?;

        let mut mask = [0u8; BLOCK_SIZE];
        ctr.apply_keystream(&mut mask);

        let mut expected = self.ghash(aad, ciphertext);
        xor_in_place(&mut expected, &mask);

        if !bool::from(expected[..tag.len()].ct_eq(tag)) {
            trace!("sm4-gcm tag mismatch");
            return Err(Error::IntegrityCheckFailed);
        }

        let mut plaintext = Zeroizing::new(ciphertext.to_vec());
        ctr.apply_keystream(&mut plaintext);
        if padding == Padding::Pkcs7 {
            let len = block::pkcs7_unpadded_len(&plaintext)?;
            plaintext.truncate(len);
        }
        Ok(plaintext.to_vec())
    }

    /// Encrypt into a caller-provided buffer laid out as `ciphertext || tag`,
    /// returning the number of bytes written.
    pub fn encrypt_into(
        &self,
        iv: &[u8],
        aad: &[u8],
        plaintext: &[u8],
        padding: Padding,
        tag_len: usize,
        out: &mut [u8],
    ) -> Result<usize> {
        let ct_len = padded_len(plaintext.len(), padding);
        let required = ct_len + tag_len;
        if out.len() < required {
            return Err(Error::BufferTooSmall {
                required,
                capacity: out.len(),
            });
        }

        let (ciphertext, tag) = self.encrypt(iv, aad, plaintext, padding, tag_len)?;
        out[..ct_len].copy_from_slice(&ciphertext);
        out[ct_len..required].copy_from_slice(&tag);
        Ok(required)
    }

    /// Decrypt `input` laid out as `ciphertext || tag` (the output of
    /// [`Sm4Gcm::encrypt_into`]) into `out`, returning the plaintext length.
    pub fn decrypt_into(
        &self,
        iv: &[u8],
        aad: &[u8],
        input: &[u8],
        padding: Padding,
        tag_len: usize,
        out: &mut [u8],
    ) -> Result<usize> {
        check_tag_len(tag_len)?;
        let ct_len = input
            .len()
            .checked_sub(tag_len)
            .ok_or(Error::InvalidParameter)?;
        let (ciphertext, tag) = input.split_at(ct_len);

        let plaintext = Zeroizing::new(self.decrypt(iv, aad, ciphertext, tag, padding)?);
        let required = plaintext.len();
        if out.len() < required {
            return Err(Error::BufferTooSmall {
                required,
                capacity: out.len(),
            });
        }

        out[..required].copy_from_slice(&plaintext);
        Ok(required)
    }

    /// Pre-counter block `J0`.
    fn j0(&self, iv: &[u8]) -> Result<[u8; BLOCK_SIZE]> {
        if iv.is_empty() {
            return Err(Error::InvalidIvLength);
        }

        let mut j0 = [0u8; BLOCK_SIZE];
        if iv.len() == IV_SIZE {
            j0[..IV_SIZE].copy_from_slice(iv);
            j0[BLOCK_SIZE - 1] = 1;
        } else {
            let iv_bits = u64::try_from(iv.len())
                .ok()
                .and_then(|len| len.checked_mul(8))
                .ok_or(Error::InvalidIvLength)?;

            let mut mac = GHash::new(&(*self.ghash_key).into());
            mac.update_padded(iv);
            let mut len_block = [0u8; BLOCK_SIZE];
            len_block[8..].copy_from_slice(&iv_bits.to_be_bytes());
            mac.update(&[ghash::Block::from(len_block)]);
            j0 = mac.finalize().into();
        }

        Ok(j0)
    }

    fn counter(&self, j0: &[u8; BLOCK_SIZE]) -> Result<Ctr> {
        Ctr::new_from_slices(self.key.as_slice(), j0).map_err(|_| Error::InvalidKeyLength)
    }

    fn ghash(&self, aad: &[u8], ciphertext: &[u8]) -> [u8; BLOCK_SIZE] {
        let mut mac = GHash::new(&(*self.ghash_key).into());
        mac.update_padded(aad);
        mac.update_padded(ciphertext);

        let aad_bits = (aad.len() as u64) * 8;
        let ct_bits = (ciphertext.len() as u64) * 8;
        let mut len_block = [0u8; BLOCK_SIZE];
        len_block[..8].copy_from_slice(&aad_bits.to_be_bytes());
        len_block[8..].copy_from_slice(&ct_bits.to_be_bytes());
        mac.update(&[ghash::Block::from(len_block)]);

        mac.finalize().into()
    }
}

fn check_tag_len(tag_len: usize) -> Result<()> {
    match tag_len {
        4 | 8 | 12..=TAG_SIZE => Ok(()),
        _ => Err(Error::InvalidTagLength),
    }
}

fn xor_in_place(acc: &mut [u8; BLOCK_SIZE], mask: &[u8; BLOCK_SIZE]) {
    for (a, m) in acc.iter_mut().zip(mask) {
        *a ^= m;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_lengths() {
        for len in [4, 8, 12, 13, 14, 15, 16] {
            assert!(check_tag_len(len).is_ok());
        }
        for len in [0, 1, 5, 9, 11, 17] {
            assert_eq!(check_tag_len(len), Err(Error::InvalidTagLength));
        }
    }

    #[test]
    fn empty_iv_rejected() {
        let gcm = Sm4Gcm::new(&[0u8; 16]).unwrap();
        assert_eq!(
            gcm.encrypt(&[], b"", b"data", Padding::None, 16).map(|_| ()),
            Err(Error::InvalidIvLength)
        );
    }

    #[test]
    fn buffer_too_small() {
        let gcm = Sm4Gcm::new(&[0u8; 16]).unwrap();
        let mut out = [0u8; 19];
        assert_eq!(
            gcm.encrypt_into(&[0u8; 12], b"", b"data", Padding::None, 16, &mut out),
            Err(Error::BufferTooSmall {
                required: 20,
                capacity: 19
            })
        );
        assert_eq!(
            gcm.encrypt_into(&[0u8; 12], b"", b"data", Padding::Pkcs7, 16, &mut [0u8; 31]),
            Err(Error::BufferTooSmall {
                required: 32,
                capacity: 31
            })
        );
    }

    #[test]
    fn decrypt_into_short_input() {
        let gcm = Sm4Gcm::new(&[0u8; 16]).unwrap();
        let mut out = [0u8; 4];
        assert_eq!(
            gcm.decrypt_into(&[0u8; 12], b"", &[0u8; 8], Padding::None, 16, &mut out),
            Err(Error::InvalidParameter)
        );
    }
}
