//! Support for SM2 decryption.
//!
//! ## Algorithm
//!
//! ```text
//! B1: get C1 from C and verify that C1 satisfies the curve equation
//! B2: compute S = [h]C1, fail if S is the point at infinity
//! B3: compute [dB]C1 = (x2, y2)
//! B4: compute t = KDF(x2 || y2, klen), fail if t is all zeros
//! B5: get C2 from C and compute M' = C2 xor t
//! B6: compute u = Hash(x2 || M' || y2), fail if u != C3
//! B7: output M'
//! ```

use super::{CipherMode, Ciphertext};
use crate::{Error, PrivateKey, ProjectivePoint, Result, Sm2Context};
use sm3::{Digest, Sm3};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

impl Sm2Context {
    /// Decrypt a ciphertext encoded per `mode`.
    ///
    /// The C3 digest is checked before any plaintext is returned.
    pub fn decrypt(
        &self,
        ciphertext: &[u8],
        private_key: &PrivateKey,
        mode: CipherMode,
    ) -> Result<Vec<u8>> {
        // B1: get C1 from C and verify that C1 satisfies the curve equation
        let ciphertext = Ciphertext::from_bytes(ciphertext, mode)?;
        self.decrypt_ciphertext(&ciphertext, private_key)
    }

    /// Decrypt into a caller-provided buffer, returning the plaintext length.
    ///
    /// Fails with [`Error::BufferTooSmall`] before any work when `out`
    /// cannot hold the plaintext.
    pub fn decrypt_into(
        &self,
        ciphertext: &[u8],
        private_key: &PrivateKey,
        mode: CipherMode,
        out: &mut [u8],
    ) -> Result<usize> {
        let ciphertext = Ciphertext::from_bytes(ciphertext, mode)?;
        let required = ciphertext.c2().len();
        if out.len() < required {
            return Err(Error::BufferTooSmall {
                required,
                capacity: out.len(),
            });
        }

        let plaintext = Zeroizing::new(self.decrypt_ciphertext(&ciphertext, private_key)?);
        out[..required].copy_from_slice(&plaintext);
        Ok(required)
    }

    /// Decrypt an already parsed ciphertext.
    pub fn decrypt_ciphertext(
        &self,
        ciphertext: &Ciphertext,
        private_key: &PrivateKey,
    ) -> Result<Vec<u8>> {
        // B2: compute S = [h]C1; h = 1
        let c1 = ciphertext.c1();
        if bool::from(c1.is_identity() | !c1.is_on_curve()) {
            return Err(Error::InvalidKey);
        }

        // B3: compute [dB]C1 = (x2, y2)
        let point = ProjectivePoint::from(c1)
            .mul(private_key.as_scalar())
            .to_affine();
        let x2 = Zeroizing::new(point.x_bytes());
        let y2 = Zeroizing::new(point.y_bytes());

        // B4: compute t = KDF(x2 || y2, klen)
        // B5: compute M' = C2 xor t
        let mut plaintext = Zeroizing::new(ciphertext.c2().to_vec());
        if gm_symm::kdf_xor(&[x2.as_slice(), y2.as_slice()], &mut plaintext)? {
            return Err(Error::IntegrityCheckFailed);
        }

        // B6: compute u = Hash(x2 || M' || y2)
        let u = Sm3::new()
            .chain_update(x2.as_slice())
            .chain_update(plaintext.as_slice())
            .chain_update(y2.as_slice())
            .finalize();

        if !bool::from(u.as_slice().ct_eq(ciphertext.c3())) {
            return Err(Error::IntegrityCheckFailed);
        }

        // B7: output M'
        Ok(core::mem::take(&mut *plaintext))
    }
}
