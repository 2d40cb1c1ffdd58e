//! Support for verifying SM2DSA signatures.
//!
//! ## Algorithm
//!
//! ```text
//! B1: verify whether r' in [1,n-1], verification failed if not
//! B2: verify whether s' in [1,n-1], verification failed if not
//! B3: set M'~=ZA || M'
//! B4: calculate e'=Hv(M'~)
//! B5: calculate t = (r' + s') modn, verification failed if t=0
//! B6: calculate the point (x1', y1')=[s']G + [t]PA
//! B7: calculate R=(e'+x1') modn, verification pass if yes, otherwise failed
//! ```

use super::{SignMode, Signature, signing::prehash_scalar};
use crate::{
    AffinePoint, Error, Hash, ProjectivePoint, PublicKey, Result, Scalar, Sm2Context,
    distid::{effective_id, hash_msg, hash_z},
};
use signature::{Verifier, hazmat::PrehashVerifier};

impl Sm2Context {
    /// Verify an encoded signature over `msg`.
    ///
    /// Returns `Ok(false)` for any signature that does not verify, including
    /// malformed encodings. `Err` is reserved for invalid parameters such as
    /// an oversized `id`.
    pub fn verify(
        &self,
        msg: &[u8],
        id: &[u8],
        signature: &[u8],
        public_key: &PublicKey,
        mode: SignMode,
    ) -> Result<bool> {
        // B3: set M'~=ZA || M'
        // B4: calculate e'=Hv(M'~)
        let z = hash_z(id, public_key.as_affine())?;
        let e = hash_msg(&z, msg);

        // B1, B2: checked while decoding
        let Ok(signature) = Signature::decode(signature, mode) else {
            return Ok(false);
        };

        Ok(self.verify_prehash(&e, &signature, public_key))
    }

    /// Verify a signature over a caller-computed 32-byte digest
    /// `e = SM3(Z || M)`.
    pub fn verify_prehash(&self, prehash: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
        let Ok(e) = prehash_scalar(prehash) else {
            return false;
        };

        check(&e, signature, |s, t| {
            self.mul_generator(s) + self.mul_point(public_key.as_affine(), t)
        })
    }
}

/// SM2DSA public key used for verifying signatures are valid for a given
/// message.
///
/// ## Usage
///
/// The [`signature`] crate defines the following traits which are the
/// primary API for verifying:
///
/// - [`Verifier`]: verify a message against a provided key and signature
/// - [`PrehashVerifier`]: verify the low-level raw output bytes of a message digest
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifyingKey {
    /// Signer's public key.
    public_key: PublicKey,

    /// Signer's user information hash `Z`.
    identity_hash: Hash,

    /// Distinguishing identifier used to compute `Z`.
    distid: Vec<u8>,
}

impl VerifyingKey {
    /// Initialize [`VerifyingKey`] from a signer's distinguishing identifier
    /// and public key.
    pub fn new(distid: &[u8], public_key: PublicKey) -> Result<Self> {
        let identity_hash = hash_z(distid, public_key.as_affine())?;

        Ok(Self {
            identity_hash,
            public_key,
            distid: effective_id(distid).to_vec(),
        })
    }

    /// Initialize [`VerifyingKey`] from a SEC1-encoded public key.
    pub fn from_sec1_bytes(distid: &[u8], bytes: &[u8]) -> Result<Self> {
        Self::new(distid, PublicKey::from_sec1_bytes(bytes)?)
    }

    /// Initialize [`VerifyingKey`] from an affine point.
    ///
    /// Returns an [`Error`] if the given affine point is the additive identity
    /// (a.k.a. point at infinity).
    pub fn from_affine(distid: &[u8], affine: AffinePoint) -> Result<Self> {
        Self::new(distid, PublicKey::from_affine(affine)?)
    }

    /// Borrow the inner [`AffinePoint`] for this public key.
    pub fn as_affine(&self) -> &AffinePoint {
        self.public_key.as_affine()
    }

    /// Borrow the public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Get the distinguishing identifier for this key.
    pub fn distid(&self) -> &[u8] {
        &self.distid
    }

    /// Signer's identity hash `Z`.
    pub fn identity_hash(&self) -> &Hash {
        &self.identity_hash
    }

    /// Uncompressed SEC1 encoding of the public key.
    pub fn to_sec1_bytes(&self) -> [u8; 65] {
        self.public_key.to_sec1_bytes()
    }

    /// Compute message hash `e` according to [draft-shen-sm2-ecdsa § 5.2.1]
    ///
    /// [draft-shen-sm2-ecdsa § 5.2.1]: https://datatracker.ietf.org/doc/html/draft-shen-sm2-ecdsa-02#section-5.2.1
    pub(crate) fn hash_msg(&self, msg: &[u8]) -> Hash {
        hash_msg(&self.identity_hash, msg)
    }
}

//
// `*Verifier` trait impls
//

impl PrehashVerifier<Signature> for VerifyingKey {
    fn verify_prehash(&self, prehash: &[u8], signature: &Signature) -> signature::Result<()> {
        let e = prehash_scalar(prehash)?;
        let verified = check(&e, signature, |s, t| {
            ProjectivePoint::GENERATOR.mul(s) + ProjectivePoint::from(self.as_affine()).mul(t)
        });

        if verified {
            Ok(())
        } else {
            Err(Error::SignatureInvalid.into())
        }
    }
}

impl Verifier<Signature> for VerifyingKey {
    fn verify(&self, msg: &[u8], signature: &Signature) -> signature::Result<()> {
        // B3: set M'~=ZA || M'
        let hash = self.hash_msg(msg);
        self.verify_prehash(&hash, signature)
    }
}

//
// Other trait impls
//

impl AsRef<AffinePoint> for VerifyingKey {
    fn as_ref(&self) -> &AffinePoint {
        self.as_affine()
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(verifying_key: VerifyingKey) -> PublicKey {
        verifying_key.public_key
    }
}

impl From<&VerifyingKey> for PublicKey {
    fn from(verifying_key: &VerifyingKey) -> PublicKey {
        verifying_key.public_key
    }
}

/// Steps B5 to B7. `lincomb(s, t)` computes `[s]G + [t]PA`.
fn check(
    e: &Scalar,
    signature: &Signature,
    lincomb: impl FnOnce(&Scalar, &Scalar) -> ProjectivePoint,
) -> bool {
    // B1, B2: r and s are non-zero and below n by construction
    let (r, s) = signature.split_scalars();

    // B5: calculate t = (r' + s') modn, verification failed if t=0
    let t = r + s;
    if bool::from(t.is_zero()) {
        return false;
    }

    // B6: calculate the point (x1', y1')=[s']G + [t]PA
    let point = lincomb(&s, &t).to_affine();
    if bool::from(point.is_identity()) {
        return false;
    }

    // B7: calculate R=(e'+x1') modn, verification pass if yes, otherwise failed
    r == *e + Scalar::reduce_bytes(&point.x_bytes())
}
