//! SM4 block cipher in ECB, CBC and CTR modes.

use crate::{Error, Result};
use cipher::{
    BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit, StreamCipher,
    block_padding::{NoPadding, Padding as _, Pkcs7},
};
use sm4::Sm4;

/// SM4 key size in bytes.
pub const KEY_SIZE: usize = 16;

/// SM4 block size in bytes.
pub const BLOCK_SIZE: usize = 16;

type EcbEncryptor = ecb::Encryptor<Sm4>;
type EcbDecryptor = ecb::Decryptor<Sm4>;
type CbcEncryptor = cbc::Encryptor<Sm4>;
type CbcDecryptor = cbc::Decryptor<Sm4>;
type Ctr = ctr::Ctr128BE<Sm4>;

/// Padding applied by the block modes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Padding {
    /// PKCS#7: always appends 1..=16 bytes.
    #[default]
    Pkcs7,

    /// No padding: input must be a whole number of blocks.
    None,
}

/// Length of the ciphertext produced for `len` bytes of plaintext.
pub fn padded_len(len: usize, padding: Padding) -> usize {
    match padding {
        Padding::Pkcs7 => (len / BLOCK_SIZE + 1) * BLOCK_SIZE,
        Padding::None => len,
    }
}

/// Encrypt `data` in ECB mode.
pub fn ecb_encrypt(key: &[u8], data: &[u8], padding: Padding) -> Result<Vec<u8>> {
    let enc = EcbEncryptor::new_from_slice(key).map_err(|_| Error::InvalidKeyLength)?;
    Ok(match padding {
        Padding::Pkcs7 => enc.encrypt_padded_vec_mut::<Pkcs7>(data),
        Padding::None => {
            check_aligned(data)?;
            enc.encrypt_padded_vec_mut::<NoPadding>(data)
        }
    })
}

/// Decrypt `data` in ECB mode.
pub fn ecb_decrypt(key: &[u8], data: &[u8], padding: Padding) -> Result<Vec<u8>> {
    let dec = EcbDecryptor::new_from_slice(key).map_err(|_| Error::InvalidKeyLength)?;
    check_aligned(data)?;
    match padding {
        Padding::Pkcs7 => dec.decrypt_padded_vec_mut::<Pkcs7>(data),
        Padding::None => dec.decrypt_padded_vec_mut::<NoPadding>(data),
    }
    .map_err(|_| Error::InvalidPadding)
}

/// Encrypt `data` in CBC mode with a 16-byte IV.
pub fn cbc_encrypt(key: &[u8], iv: &[u8], data: &[u8], padding: Padding) -> Result<Vec<u8>> {
    let enc = cbc_encryptor(key, iv)?;
    Ok(match padding {
        Padding::Pkcs7 => enc.encrypt_padded_vec_mut::<Pkcs7>(data),
        Padding::None => {
            check_aligned(data)?;
            enc.encrypt_padded_vec_mut::<NoPadding>(data)
        }
    })
}

/// Decrypt `data` in CBC mode with a 16-byte IV.
pub fn cbc_decrypt(key: &[u8], iv: &[u8], data: &[u8], padding: Padding) -> Result<Vec<u8>> {
    check_key_iv(key, iv)?;
    let dec = CbcDecryptor::new_from_slices(key, iv).map_err(|_| Error::InvalidKeyLength)?;
    check_aligned(data)?;
    match padding {
        Padding::Pkcs7 => dec.decrypt_padded_vec_mut::<Pkcs7>(data),
        Padding::None => dec.decrypt_padded_vec_mut::<NoPadding>(data),
    }
    .map_err(|_| Error::InvalidPadding)
}

/// Apply the CTR keystream to `data` in place. Encryption and decryption are
/// the same operation. The IV is the initial 128-bit big-endian counter block.
pub fn ctr_apply(key: &[u8], iv: &[u8], data: &mut [u8]) -> Result<()> {
    check_key_iv(key, iv)?;
    let mut ctr = Ctr::new_from_slices(key, iv).map_err(|_| Error::InvalidKeyLength)?;
    ctr.apply_keystream(data);
    Ok(())
}

/// Encrypt a single 16-byte block.
pub fn encrypt_block(key: &[u8; KEY_SIZE], block: &[u8; BLOCK_SIZE]) -> [u8; BLOCK_SIZE] {
    use cipher::BlockEncrypt;

    let cipher = Sm4::new(key.into());
    let mut out: cipher::Block<Sm4> = (*block).into();
    cipher.encrypt_block(&mut out);
    out.into()
}

/// Append PKCS#7 padding to `data`.
pub(crate) fn pkcs7_pad(data: &[u8]) -> Vec<u8> {
    let split = data.len() - data.len() % BLOCK_SIZE;
    let (head, tail) = data.split_at(split);

    let mut last = cipher::Block::<Sm4>::default();
    last[..tail.len()].copy_from_slice(tail);
    Pkcs7::pad(&mut last, tail.len());

    let mut out = Vec::with_capacity(split + BLOCK_SIZE);
    out.extend_from_slice(head);
    out.extend_from_slice(&last);
    out
}

/// Length of `data` once its PKCS#7 padding is stripped.
pub(crate) fn pkcs7_unpadded_len(data: &[u8]) -> Result<usize> {
    check_aligned(data).map_err(|_| Error::InvalidPadding)?;
    let split = data.len() - BLOCK_SIZE;
    let last = cipher::Block::<Sm4>::from_slice(&data[split..]);
    let tail = Pkcs7::unpad(last).map_err(|_| Error::InvalidPadding)?;
    Ok(split + tail.len())
}

fn cbc_encryptor(key: &[u8], iv: &[u8]) -> Result<CbcEncryptor> {
    check_key_iv(key, iv)?;
    CbcEncryptor::new_from_slices(key, iv).map_err(|_| Error::InvalidKeyLength)
}

fn check_key_iv(key: &[u8], iv: &[u8]) -> Result<()> {
    if key.len() != KEY_SIZE {
        return Err(Error::InvalidKeyLength);
    }
    if iv.len() != BLOCK_SIZE {
        return Err(Error::InvalidIvLength);
    }
    Ok(())
}

fn check_aligned(data: &[u8]) -> Result<()> {
    if data.is_empty() || data.len() % BLOCK_SIZE != 0 {
        return Err(Error::InvalidParameter);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pkcs7_lengths() {
        assert_eq!(padded_len(0, Padding::Pkcs7), 16);
        assert_eq!(padded_len(15, Padding::Pkcs7), 16);
        assert_eq!(padded_len(16, Padding::Pkcs7), 32);
        assert_eq!(padded_len(32, Padding::None), 32);
    }

    #[test]
    fn pkcs7_helpers() {
        let padded = pkcs7_pad(b"abc");
        assert_eq!(padded.len(), 16);
        assert_eq!(&padded[3..], [13u8; 13]);
        assert_eq!(pkcs7_unpadded_len(&padded), Ok(3));

        let padded = pkcs7_pad(&[7u8; 16]);
        assert_eq!(padded.len(), 32);
        assert_eq!(pkcs7_unpadded_len(&padded), Ok(16));

        assert_eq!(pkcs7_unpadded_len(&[0u8; 16]), Err(Error::InvalidPadding));
        assert_eq!(pkcs7_unpadded_len(&[1u8; 15]), Err(Error::InvalidPadding));
        assert_eq!(pkcs7_unpadded_len(&[]), Err(Error::InvalidPadding));
    }

    #[test]
    fn unaligned_input_without_padding() {
        let key = [1u8; 16];
        assert_eq!(
            ecb_encrypt(&key, &[0u8; 15], Padding::None),
            Err(Error::InvalidParameter)
        );
        assert_eq!(
            cbc_encrypt(&key, &[0u8; 16], &[0u8; 17], Padding::None),
            Err(Error::InvalidParameter)
        );
    }

    #[test]
    fn wrong_sizes() {
        assert_eq!(
            ecb_encrypt(&[0u8; 15], b"x", Padding::Pkcs7),
            Err(Error::InvalidKeyLength)
        );
        assert_eq!(
            cbc_encrypt(&[0u8; 16], &[0u8; 12], b"x", Padding::Pkcs7),
            Err(Error::InvalidIvLength)
        );
        let mut buf = [0u8; 4];
        assert_eq!(
            ctr_apply(&[0u8; 16], &[0u8; 8], &mut buf),
            Err(Error::InvalidIvLength)
        );
    }
}
