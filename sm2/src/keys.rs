//! Private keys, public keys and key pairs.

use crate::{AffinePoint, Error, ProjectivePoint, Result, Scalar, Sm2Context};
use core::fmt;
use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Length of a private key in hex characters.
pub const PRIVATE_KEY_HEX_LEN: usize = 64;

/// Length of an uncompressed public key in hex characters.
pub const PUBLIC_KEY_HEX_LEN: usize = 130;

/// SM2 private key: a scalar in `[1, n-1]`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    scalar: Scalar,
}

impl PrivateKey {
    /// Wrap a scalar, rejecting zero.
    pub fn from_scalar(scalar: Scalar) -> Result<Self> {
        if bool::from(scalar.is_zero()) {
            return Err(Error::InvalidKey);
        }
        Ok(Self { scalar })
    }

    /// Parse a 32-byte big-endian scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: &[u8; 32] = bytes.try_into().map_err(|_| Error::InvalidKey)?;
        Scalar::from_bytes_nonzero(bytes)
            .map(|scalar| Self { scalar })
            .ok_or(Error::InvalidKey)
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self> {
        if hex.len() != PRIVATE_KEY_HEX_LEN {
            return Err(Error::InvalidKey);
        }
        let mut bytes = Zeroizing::new([0u8; 32]);
        hex::decode_to_slice(hex, bytes.as_mut_slice())?;
        Self::from_bytes(bytes.as_slice())
    }

    /// Serialize as 32 big-endian bytes.
    pub fn to_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.scalar.to_bytes())
    }

    /// Serialize as 64 uppercase hex characters.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode_upper(self.to_bytes().as_slice()))
    }

    /// Borrow the secret scalar.
    ///
    /// # ⚠️ Warning
    ///
    /// This value is key material.
    ///
    /// Please treat it with the care it deserves!
    pub fn as_scalar(&self) -> &Scalar {
        &self.scalar
    }

    /// Compute the matching public key without a context.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            point: ProjectivePoint::GENERATOR.mul(&self.scalar).to_affine(),
        }
    }
}

impl ConstantTimeEq for PrivateKey {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.scalar.ct_eq(&other.scalar)
    }
}

/// Constant-time comparison
impl Eq for PrivateKey {}
impl PartialEq for PrivateKey {
    fn eq(&self, other: &PrivateKey) -> bool {
        self.ct_eq(other).into()
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey").finish_non_exhaustive()
    }
}

/// SM2 public key: a non-identity point on the curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey {
    point: AffinePoint,
}

impl PublicKey {
    /// Wrap an affine point.
    ///
    /// Returns [`Error::InvalidPublicKey`] if the point is the identity or not
    /// on the curve.
    pub fn from_affine(point: AffinePoint) -> Result<Self> {
        if bool::from(point.is_identity() | !point.is_on_curve()) {
            return Err(Error::InvalidPublicKey);
        }
        Ok(Self { point })
    }

    /// Parse a SEC1 encoded point, compressed or uncompressed.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        AffinePoint::from_sec1_bytes(bytes)
            .map_err(|_| Error::InvalidPublicKey)
            .and_then(Self::from_affine)
    }

    /// Parse a 64-byte `X || Y` encoding without the SEC1 tag.
    pub fn from_raw_bytes(bytes: &[u8]) -> Result<Self> {
        AffinePoint::from_raw_bytes(bytes)
            .map_err(|_| Error::InvalidPublicKey)
            .and_then(Self::from_affine)
    }

    /// Parse a hex encoded SEC1 point. The canonical form is 130 characters
    /// `04 || X || Y`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let bytes = hex::decode(hex).map_err(|_| Error::InvalidPublicKey)?;
        Self::from_sec1_bytes(&bytes)
    }

    /// Derive the public key for `private_key`.
    pub fn from_private_key(private_key: &PrivateKey) -> Self {
        private_key.public_key()
    }

    /// Uncompressed SEC1 encoding `04 || X || Y`.
    pub fn to_sec1_bytes(&self) -> [u8; 65] {
        self.point.to_uncompressed()
    }

    /// Compressed SEC1 encoding.
    pub fn to_compressed_bytes(&self) -> [u8; 33] {
        self.point.to_compressed()
    }

    /// Uncompressed encoding as 130 uppercase hex characters.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.to_sec1_bytes())
    }

    /// Borrow the inner [`AffinePoint`] for this public key.
    pub fn as_affine(&self) -> &AffinePoint {
        &self.point
    }
}

impl AsRef<AffinePoint> for PublicKey {
    fn as_ref(&self) -> &AffinePoint {
        &self.point
    }
}

/// Validate a hex encoded public key.
pub fn check_public_key(hex: &str) -> Result<()> {
    PublicKey::from_hex(hex).map(|_| ())
}

/// A private key together with its public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPair {
    private_key: PrivateKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Derive the public half from `private_key`.
    pub fn from_private_key(private_key: PrivateKey) -> Self {
        let public_key = private_key.public_key();
        Self {
            private_key,
            public_key,
        }
    }

    /// Pair up two halves, checking that `public_key = d·G`.
    pub fn from_parts(private_key: PrivateKey, public_key: PublicKey) -> Result<Self> {
        if private_key.public_key() != public_key {
            return Err(Error::InvalidKey);
        }
        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// Borrow the private key.
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// Borrow the public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

impl Sm2Context {
    /// Draw a uniformly random private key.
    pub fn generate_private_key(&mut self) -> PrivateKey {
        PrivateKey {
            scalar: self.random_scalar(),
        }
    }

    /// Compute `d·G` using the generator table when one is available.
    pub fn derive_public_key(&self, private_key: &PrivateKey) -> Result<PublicKey> {
        PublicKey::from_affine(self.mul_generator(private_key.as_scalar()).to_affine())
            .map_err(|_| Error::InvalidKey)
    }

    /// Parse a hex private key and derive its public key.
    pub fn derive_public_key_hex(&self, private_key: &str) -> Result<PublicKey> {
        self.derive_public_key(&PrivateKey::from_hex(private_key)?)
    }

    /// Generate a fresh key pair.
    pub fn generate_key_pair(&mut self) -> Result<KeyPair> {
        let private_key = self.generate_private_key();
        let public_key = self.derive_public_key(&private_key)?;
        Ok(KeyPair {
            private_key,
            public_key,
        })
    }
}
