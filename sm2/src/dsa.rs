//! SM2 Digital Signature Algorithm (SM2DSA) as defined in [draft-shen-sm2-ecdsa § 5].
//!
//! ## Usage
//!
//! ```
//! # fn example() -> Result<(), gm_sm2::Error> {
//! use gm_sm2::{SignMode, Sm2Context};
//!
//! let mut ctx = Sm2Context::new()?;
//! let key_pair = ctx.generate_key_pair()?;
//! let distid = b"example@rustcrypto.org"; // distinguishing identifier
//! let message = b"test message";
//!
//! let signature = ctx.sign(
//!     message,
//!     distid,
//!     key_pair.public_key(),
//!     key_pair.private_key(),
//!     SignMode::RsAsn1,
//! )?;
//! assert!(ctx.verify(message, distid, &signature, key_pair.public_key(), SignMode::RsAsn1)?);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! The [`SigningKey`] and [`VerifyingKey`] types expose the same algorithm
//! through the traits of the [`signature`] crate.
//!
//! [draft-shen-sm2-ecdsa § 5]: https://datatracker.ietf.org/doc/html/draft-shen-sm2-ecdsa-02#section-5

mod der;
mod signing;
mod verifying;

pub use signature;

pub use self::{signing::SigningKey, verifying::VerifyingKey};

use crate::{Error, Result, Scalar};
use core::fmt::{self, Debug};
use signature::SignatureEncoding;

/// SM2DSA signature serialized as bytes.
pub type SignatureBytes = [u8; Signature::BYTE_SIZE];

/// Largest encoded signature: a DER `SEQUENCE` of two 33-byte `INTEGER`s.
pub const MAX_SIGNATURE_LEN: usize = 72;

/// Signature wire layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SignMode {
    /// `SEQUENCE { INTEGER r, INTEGER s }`
    #[default]
    RsAsn1,
    /// `r || s`, 64 bytes.
    Rs,
}

/// SM2DSA signature.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Signature {
    r: Scalar,
    s: Scalar,
}

impl Signature {
    /// Size of an encoded SM2DSA signature in bytes.
    pub const BYTE_SIZE: usize = 64;

    /// Parse an SM2DSA signature from a byte array.
    pub fn from_bytes(bytes: &SignatureBytes) -> Result<Self> {
        let (r_bytes, s_bytes) = bytes.split_at(Self::BYTE_SIZE / 2);
        let r = Scalar::from_slice(r_bytes).ok_or(Error::EncodingError)?;
        let s = Scalar::from_slice(s_bytes).ok_or(Error::EncodingError)?;
        Self::from_scalars(r, s)
    }

    /// Parse an SM2DSA signature from a byte slice.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        SignatureBytes::try_from(bytes)
            .map_err(|_| Error::EncodingError)?
            .try_into()
    }

    /// Create a [`Signature`] from its `r` and `s` scalars, both of which
    /// must be non-zero.
    pub fn from_scalars(r: Scalar, s: Scalar) -> Result<Self> {
        if bool::from(r.is_zero() | s.is_zero()) {
            return Err(Error::EncodingError);
        }
        Ok(Self { r, s })
    }

    /// Decode per `mode`.
    pub fn decode(bytes: &[u8], mode: SignMode) -> Result<Self> {
        match mode {
            SignMode::RsAsn1 => Self::from_der(bytes),
            SignMode::Rs => Self::from_slice(bytes),
        }
    }

    /// Encode per `mode`.
    pub fn encode(&self, mode: SignMode) -> Result<Vec<u8>> {
        match mode {
            SignMode::RsAsn1 => self.to_der(),
            SignMode::Rs => Ok(self.to_vec()),
        }
    }

    /// Serialize this signature as bytes.
    pub fn to_bytes(&self) -> SignatureBytes {
        let mut ret = [0; Self::BYTE_SIZE];
        let (r_bytes, s_bytes) = ret.split_at_mut(Self::BYTE_SIZE / 2);
        r_bytes.copy_from_slice(&self.r.to_bytes());
        s_bytes.copy_from_slice(&self.s.to_bytes());
        ret
    }

    /// Convert this signature into a byte vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    /// Get the `r` component of this signature
    pub fn r(&self) -> Scalar {
        self.r
    }

    /// Get the `s` component of this signature
    pub fn s(&self) -> Scalar {
        self.s
    }

    /// Split the signature into its `r` and `s` scalars.
    pub fn split_scalars(&self) -> (Scalar, Scalar) {
        (self.r, self.s)
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gm_sm2::dsa::Signature(")?;

        for byte in self.to_bytes() {
            write!(f, "{:02X}", byte)?;
        }

        write!(f, ")")
    }
}

impl From<Signature> for SignatureBytes {
    fn from(signature: Signature) -> SignatureBytes {
        signature.to_bytes()
    }
}

impl From<&Signature> for SignatureBytes {
    fn from(signature: &Signature) -> SignatureBytes {
        signature.to_bytes()
    }
}

impl SignatureEncoding for Signature {
    type Repr = SignatureBytes;

    fn to_bytes(&self) -> Self::Repr {
        self.into()
    }

    fn encoded_len(&self) -> usize {
        Self::BYTE_SIZE
    }
}

impl TryFrom<SignatureBytes> for Signature {
    type Error = Error;

    fn try_from(signature: SignatureBytes) -> Result<Signature> {
        Signature::from_bytes(&signature)
    }
}

impl TryFrom<&SignatureBytes> for Signature {
    type Error = Error;

    fn try_from(signature: &SignatureBytes) -> Result<Signature> {
        Signature::from_bytes(signature)
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Signature> {
        Signature::from_slice(bytes)
    }
}
