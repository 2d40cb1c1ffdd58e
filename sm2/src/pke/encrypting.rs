//! Support for SM2 encryption.
//!
//! ## Algorithm
//!
//! ```text
//! A1: generate a random number k in [1, n-1]
//! A2: compute C1 = [k]G = (x1, y1)
//! A3: compute S = [h]PB, fail if S is the point at infinity
//! A4: compute [k]PB = (x2, y2)
//! A5: compute t = KDF(x2 || y2, klen), go to A1 if t is all zeros
//! A6: compute C2 = M xor t
//! A7: compute C3 = Hash(x2 || M || y2)
//! A8: output C = C1 || C3 || C2 in the requested layout
//! ```

use super::{CipherMode, Ciphertext};
use crate::{Error, PublicKey, Result, Sm2Context};
use log::trace;
use sm3::{Digest, Sm3};

impl Sm2Context {
    /// Encrypt `plaintext` to `public_key` and encode the result per `mode`.
    pub fn encrypt(
        &mut self,
        plaintext: &[u8],
        public_key: &PublicKey,
        mode: CipherMode,
    ) -> Result<Vec<u8>> {
        self.encrypt_to_ciphertext(plaintext, public_key)?
            .to_vec(mode)
    }

    /// Encrypt into a caller-provided buffer, returning the number of bytes
    /// written.
    ///
    /// Fails with [`Error::BufferTooSmall`] without touching `out` when the
    /// encoding does not fit.
    pub fn encrypt_into(
        &mut self,
        plaintext: &[u8],
        public_key: &PublicKey,
        mode: CipherMode,
        out: &mut [u8],
    ) -> Result<usize> {
        let encoded = self.encrypt(plaintext, public_key, mode)?;
        let capacity = out.len();
        let dst = out.get_mut(..encoded.len()).ok_or(Error::BufferTooSmall {
            required: encoded.len(),
            capacity,
        })?;
        dst.copy_from_slice(&encoded);
        Ok(encoded.len())
    }

    /// Encrypt `plaintext` to `public_key`, returning the parsed form.
    pub fn encrypt_to_ciphertext(
        &mut self,
        plaintext: &[u8],
        public_key: &PublicKey,
    ) -> Result<Ciphertext> {
        if plaintext.is_empty() {
            return Err(Error::InvalidParameter);
        }

        // A3: compute S = [h]PB; h = 1, so PB itself must be a valid point
        let pb = public_key.as_affine();
        if bool::from(pb.is_identity() | !pb.is_on_curve()) {
            return Err(Error::InvalidPublicKey);
        }

        let mut c2 = plaintext.to_vec();
        loop {
            // A1: generate a random number k in [1, n-1]
            let k = self.random_scalar();

            // A2: compute C1 = [k]G = (x1, y1)
            let c1 = self.mul_generator(&k).to_affine();

            // A4: compute [k]PB = (x2, y2)
            let kpb = self.mul_point(pb, &k).to_affine();
            let x2 = kpb.x_bytes();
            let y2 = kpb.y_bytes();

            // A5: compute t = KDF(x2 || y2, klen)
            // A6: compute C2 = M xor t
            let all_zero = gm_symm::kdf_xor(&[x2.as_slice(), y2.as_slice()], &mut c2)?;
            if all_zero {
                trace!("KDF produced an all-zero mask, retrying");
                c2.copy_from_slice(plaintext);
                continue;
            }

            // A7: compute C3 = Hash(x2 || M || y2)
            let c3 = Sm3::new()
                .chain_update(x2)
                .chain_update(plaintext)
                .chain_update(y2)
                .finalize();

            // A8: output C
            return Ciphertext::new(c1, c2, &c3);
        }
    }
}
