//! Support for SM2DSA signing.
//!
//! ## Algorithm
//!
//! ```text
//! A1: set M~=ZA || M
//! A2: calculate e=Hv(M~)
//! A3: pick a random number k in [1, n-1] via a random number generator
//! A4: calculate the elliptic curve point (x1, y1)=[k]G
//! A5: calculate r=(e+x1) modn, return to A3 if r=0 or r+k=n
//! A6: calculate s=((1+dA)^(-1)*(k-r*dA)) modn, return to A3 if s=0
//! A7: the digital signature of M is (r, s)
//! ```

use super::{SignMode, Signature, VerifyingKey};
use crate::{
    AffinePoint, Error, PrivateKey, ProjectivePoint, PublicKey, Result, Scalar, Sm2Context,
    distid::{hash_msg, hash_z},
};
use core::fmt::{self, Debug};
use log::trace;
use signature::{KeypairRef, RandomizedSigner, rand_core::CryptoRngCore};
use subtle::{Choice, ConstantTimeEq};

impl Sm2Context {
    /// Sign `msg` on behalf of the holder of `private_key`, binding the
    /// signature to `id` and `public_key` through `Z`.
    ///
    /// An installed external nonce is consumed by this call.
    pub fn sign(
        &mut self,
        msg: &[u8],
        id: &[u8],
        public_key: &PublicKey,
        private_key: &PrivateKey,
        mode: SignMode,
    ) -> Result<Vec<u8>> {
        // A1: set M~=ZA || M
        // A2: calculate e=Hv(M~)
        let z = hash_z(id, public_key.as_affine())?;
        let e = hash_msg(&z, msg);
        self.sign_prehash(&e, private_key)?.encode(mode)
    }

    /// [`Sm2Context::sign`] into a caller-provided buffer, returning the
    /// number of bytes written.
    pub fn sign_into(
        &mut self,
        msg: &[u8],
        id: &[u8],
        public_key: &PublicKey,
        private_key: &PrivateKey,
        mode: SignMode,
        out: &mut [u8],
    ) -> Result<usize> {
        let sig = self.sign(msg, id, public_key, private_key, mode)?;
        let capacity = out.len();
        let dst = out.get_mut(..sig.len()).ok_or(Error::BufferTooSmall {
            required: sig.len(),
            capacity,
        })?;
        dst.copy_from_slice(&sig);
        Ok(sig.len())
    }

    /// Sign a caller-computed 32-byte digest `e = SM3(Z || M)`.
    pub fn sign_prehash(&mut self, prehash: &[u8], private_key: &PrivateKey) -> Result<Signature> {
        let e = prehash_scalar(prehash)?;
        let d = private_key.as_scalar();
        let d_plus_1_inv = d_plus_1_inv(d)?;

        if let Some(k) = self.take_external_nonce() {
            let kg = self.mul_generator(&k).to_affine();
            return try_sign(&e, d, &d_plus_1_inv, &k, &kg).ok_or(Error::DegenerateResult);
        }

        loop {
            // A3: pick a random number k in [1, n-1] via a random number generator
            let k = self.random_scalar();

            // A4: calculate the elliptic curve point (x1, y1)=[k]G
            let kg = self.mul_generator(&k).to_affine();

            if let Some(sig) = try_sign(&e, d, &d_plus_1_inv, &k, &kg) {
                return Ok(sig);
            }
            trace!("degenerate signature nonce, retrying");
        }
    }
}

/// SM2DSA secret key used for signing messages and producing signatures.
///
/// ## Usage
///
/// The [`signature`] crate defines the following traits which are the
/// primary API for signing:
///
/// - [`RandomizedSigner`]: sign a message using this key and a caller RNG
/// - [`Signer`](signature::Signer): sign a message with a nonce from the OS
///   RNG (requires the `getrandom` feature)
#[derive(Clone)]
pub struct SigningKey {
    /// Secret key.
    private_key: PrivateKey,

    /// Verifying key for this signing key.
    verifying_key: VerifyingKey,
}

impl SigningKey {
    /// Create signing key from a signer's distinguishing identifier and
    /// private key.
    pub fn new(distid: &[u8], private_key: &PrivateKey) -> Result<Self> {
        let verifying_key = VerifyingKey::new(distid, private_key.public_key())?;
        Ok(Self {
            private_key: private_key.clone(),
            verifying_key,
        })
    }

    /// Parse signing key from big endian-encoded byte slice containing a secret
    /// scalar value.
    pub fn from_slice(distid: &[u8], slice: &[u8]) -> Result<Self> {
        Self::new(distid, &PrivateKey::from_bytes(slice)?)
    }

    /// Borrow the private key.
    ///
    /// # ⚠️ Warning
    ///
    /// This value is key material.
    ///
    /// Please treat it with the care it deserves!
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// Get the [`VerifyingKey`] which corresponds to this [`SigningKey`].
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Get the distinguishing identifier for this key.
    pub fn distid(&self) -> &[u8] {
        self.verifying_key.distid()
    }

    fn sign_with_rng(&self, rng: &mut impl CryptoRngCore, msg: &[u8]) -> Result<Signature> {
        // A1: set M~=ZA || M
        let e = prehash_scalar(&self.verifying_key.hash_msg(msg))?;
        let d = self.private_key.as_scalar();
        let d_plus_1_inv = d_plus_1_inv(d)?;

        let mut bytes = zeroize::Zeroizing::new([0u8; 32]);
        loop {
            rng.try_fill_bytes(bytes.as_mut_slice())
                .map_err(|_| Error::Rng)?;
            let Some(k) = Scalar::from_bytes_nonzero(&bytes) else {
                continue;
            };

            let kg = ProjectivePoint::GENERATOR.mul(&k).to_affine();
            if let Some(sig) = try_sign(&e, d, &d_plus_1_inv, &k, &kg) {
                return Ok(sig);
            }
        }
    }
}

//
// `*Signer` trait impls
//

impl RandomizedSigner<Signature> for SigningKey {
    fn try_sign_with_rng(
        &self,
        rng: &mut impl CryptoRngCore,
        msg: &[u8],
    ) -> signature::Result<Signature> {
        Ok(self.sign_with_rng(rng, msg)?)
    }
}

#[cfg(feature = "getrandom")]
impl signature::Signer<Signature> for SigningKey {
    fn try_sign(&self, msg: &[u8]) -> signature::Result<Signature> {
        Ok(self.sign_with_rng(&mut rand_core::OsRng, msg)?)
    }
}

//
// Other trait impls
//

impl AsRef<VerifyingKey> for SigningKey {
    fn as_ref(&self) -> &VerifyingKey {
        &self.verifying_key
    }
}

impl ConstantTimeEq for SigningKey {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.private_key.ct_eq(&other.private_key)
    }
}

impl Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("verifying_key", &self.verifying_key)
            .finish_non_exhaustive()
    }
}

/// Constant-time comparison
impl Eq for SigningKey {}
impl PartialEq for SigningKey {
    fn eq(&self, other: &SigningKey) -> bool {
        self.ct_eq(other).into()
    }
}

impl KeypairRef for SigningKey {
    type VerifyingKey = VerifyingKey;
}

/// A2: reduce the 32-byte digest `e` modulo `n`.
pub(super) fn prehash_scalar(prehash: &[u8]) -> Result<Scalar> {
    let bytes: &[u8; 32] = prehash.try_into().map_err(|_| Error::InvalidParameter)?;
    Ok(Scalar::reduce_bytes(bytes))
}

/// `(1 + d)^-1`; undefined for `d = n - 1`.
fn d_plus_1_inv(d: &Scalar) -> Result<Scalar> {
    Option::from((d + &Scalar::ONE).invert()).ok_or(Error::InvalidKey)
}

/// Steps A5 to A7 for one nonce. `None` when the nonce is degenerate.
fn try_sign(
    e: &Scalar,
    d: &Scalar,
    d_plus_1_inv: &Scalar,
    k: &Scalar,
    kg: &AffinePoint,
) -> Option<Signature> {
    // A5: calculate r=(e+x1) modn, return to A3 if r=0 or r+k=n
    let r = e + &Scalar::reduce_bytes(&kg.x_bytes());
    if bool::from(r.is_zero() | (r + k).is_zero()) {
        return None;
    }

    // A6: calculate s=((1+dA)^(-1)*(k-r*dA)) modn, return to A3 if s=0
    let s = d_plus_1_inv * &(k - &(r * d));

    // A7: the digital signature of M is (r, s)
    Signature::from_scalars(r, s).ok()
}
