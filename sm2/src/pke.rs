//! SM2 Encryption Algorithm (SM2) as defined in [draft-shen-sm2-ecdsa § 5].
//!
//! ## Usage
//!
//! ```
//! # fn example() -> Result<(), gm_sm2::Error> {
//! use gm_sm2::{CipherMode, Sm2Context};
//!
//! let mut ctx = Sm2Context::new()?;
//! let key_pair = ctx.generate_key_pair()?;
//!
//! let ciphertext = ctx.encrypt(b"plaintext", key_pair.public_key(), CipherMode::default())?;
//! let plaintext = ctx.decrypt(&ciphertext, key_pair.private_key(), CipherMode::default())?;
//! assert_eq!(plaintext, b"plaintext");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! [draft-shen-sm2-ecdsa § 5]: https://datatracker.ietf.org/doc/html/draft-shen-sm2-ecdsa-02#section-5

mod decrypting;
mod encrypting;

use crate::{AffinePoint, Error, Hash, Result};
use der::{
    Decode, DecodeValue, Encode, EncodeValue, Header, Length, Reader, Sequence, Writer,
    asn1::{OctetStringRef, UintRef},
};

/// Size of the C3 digest.
const C3_SIZE: usize = 32;

/// Wire layouts for an SM2 ciphertext.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CipherMode {
    /// `SEQUENCE { x, y, C3, C2 }`, the GM/T 0009 layout.
    #[default]
    C1C3C2Asn1,
    /// `X || Y || C3 || C2`
    C1C3C2,
    /// `SEQUENCE { x, y, C2, C3 }`, used by older deployments.
    C1C2C3Asn1,
    /// `X || Y || C2 || C3`
    C1C2C3,
    /// `04 || X || Y || C3 || C2`
    Prefixed04C1C3C2,
    /// `04 || X || Y || C2 || C3`
    Prefixed04C1C2C3,
}

impl CipherMode {
    /// Every mode, in declaration order.
    pub const ALL: [CipherMode; 6] = [
        CipherMode::C1C3C2Asn1,
        CipherMode::C1C3C2,
        CipherMode::C1C2C3Asn1,
        CipherMode::C1C2C3,
        CipherMode::Prefixed04C1C3C2,
        CipherMode::Prefixed04C1C2C3,
    ];

    fn is_asn1(self) -> bool {
        matches!(self, CipherMode::C1C3C2Asn1 | CipherMode::C1C2C3Asn1)
    }

    fn is_c3_first(self) -> bool {
        matches!(
            self,
            CipherMode::C1C3C2Asn1 | CipherMode::C1C3C2 | CipherMode::Prefixed04C1C3C2
        )
    }

    fn c1_len(self) -> usize {
        match self {
            CipherMode::Prefixed04C1C3C2 | CipherMode::Prefixed04C1C2C3 => 65,
            _ => 64,
        }
    }
}

/// Largest encoding of a ciphertext over a `plaintext_len`-byte message.
pub fn ciphertext_len_upper_bound(plaintext_len: usize, mode: CipherMode) -> usize {
    if mode.is_asn1() {
        // two INTEGERs of up to 33 content bytes, C3, C2
        let content = 2 * (2 + 33) + (2 + C3_SIZE) + tlv_len(plaintext_len);
        tlv_len(content)
    } else {
        mode.c1_len() + C3_SIZE + plaintext_len
    }
}

/// Length of a DER TLV with `content_len` content bytes.
fn tlv_len(content_len: usize) -> usize {
    let len_octets = if content_len < 0x80 {
        1
    } else {
        1 + (usize::BITS - content_len.leading_zeros()).div_ceil(8) as usize
    };
    1 + len_octets + content_len
}

/// Parsed SM2 ciphertext: `C1` (ephemeral point), `C2` (masked message) and
/// `C3` (`SM3(x2 || M || y2)`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ciphertext {
    c1: AffinePoint,
    c2: Vec<u8>,
    c3: Hash,
}

impl Ciphertext {
    /// Decode from `bytes` in the given layout.
    ///
    /// Malformed framing is an [`Error::EncodingError`]; a `C1` that is not on
    /// the curve is an [`Error::InvalidKey`].
    pub fn from_bytes(bytes: &[u8], mode: CipherMode) -> Result<Self> {
        if mode.is_asn1() {
            return if mode.is_c3_first() {
                Self::from_der::<false>(bytes)
            } else {
                Self::from_der::<true>(bytes)
            };
        }

        let c1_len = mode.c1_len();
        if bytes.len() <= c1_len + C3_SIZE {
            return Err(Error::EncodingError);
        }

        let (c1, rest) = bytes.split_at(c1_len);
        let c1 = match c1_len {
            65 if c1[0] == 0x04 => AffinePoint::from_raw_bytes(&c1[1..])?,
            64 => AffinePoint::from_raw_bytes(c1)?,
            _ => return Err(Error::EncodingError),
        };

        let (c2, c3) = if mode.is_c3_first() {
            let (c3, c2) = rest.split_at(C3_SIZE);
            (c2, c3)
        } else {
            rest.split_at(rest.len() - C3_SIZE)
        };

        Self::new(c1, c2.to_vec(), c3)
    }

    fn from_der<const LEGACY: bool>(bytes: &[u8]) -> Result<Self> {
        let der = CiphertextRef::<LEGACY>::from_der(bytes)?;

        let mut raw = [0u8; 64];
        let x = der.x.as_bytes();
        let y = der.y.as_bytes();
        if x.len() > 32 || y.len() > 32 {
            return Err(Error::EncodingError);
        }
        raw[32 - x.len()..32].copy_from_slice(x);
        raw[64 - y.len()..].copy_from_slice(y);

        let c1 = AffinePoint::from_raw_bytes(&raw)?;
        Self::new(c1, der.c2.as_bytes().to_vec(), der.c3.as_bytes())
    }

    pub(crate) fn new(c1: AffinePoint, c2: Vec<u8>, c3: &[u8]) -> Result<Self> {
        if c2.is_empty() {
            return Err(Error::EncodingError);
        }
        let c3 = c3.try_into().map_err(|_| Error::EncodingError)?;
        Ok(Self { c1, c2, c3 })
    }

    /// Encode in the given layout.
    pub fn to_vec(&self, mode: CipherMode) -> Result<Vec<u8>> {
        if mode.is_asn1() {
            let x = self.c1.x_bytes();
            let y = self.c1.y_bytes();
            return if mode.is_c3_first() {
                Ok(self.as_der::<false>(&x, &y)?.to_der()?)
            } else {
                Ok(self.as_der::<true>(&x, &y)?.to_der()?)
            };
        }

        let mut out = Vec::with_capacity(ciphertext_len_upper_bound(self.c2.len(), mode));
        if mode.c1_len() == 65 {
            out.push(0x04);
        }
        out.extend_from_slice(&self.c1.to_raw_bytes());
        if mode.is_c3_first() {
            out.extend_from_slice(&self.c3);
            out.extend_from_slice(&self.c2);
        } else {
            out.extend_from_slice(&self.c2);
            out.extend_from_slice(&self.c3);
        }
        Ok(out)
    }

    fn as_der<'a, const LEGACY: bool>(
        &'a self,
        x: &'a [u8],
        y: &'a [u8],
    ) -> Result<CiphertextRef<'a, LEGACY>> {
        Ok(CiphertextRef {
            x: UintRef::new(x)?,
            y: UintRef::new(y)?,
            c3: OctetStringRef::new(&self.c3)?,
            c2: OctetStringRef::new(&self.c2)?,
        })
    }

    /// Get C1
    pub fn c1(&self) -> &AffinePoint {
        &self.c1
    }

    /// Get C2
    pub fn c2(&self) -> &[u8] {
        &self.c2
    }

    /// Get C3
    pub fn c3(&self) -> &Hash {
        &self.c3
    }
}

/// `SEQUENCE { INTEGER x, INTEGER y, OCTET STRING, OCTET STRING }` with the
/// two octet strings in `C3, C2` order, or `C2, C3` when `LEGACY`.
struct CiphertextRef<'a, const LEGACY: bool> {
    x: UintRef<'a>,
    y: UintRef<'a>,
    c3: OctetStringRef<'a>,
    c2: OctetStringRef<'a>,
}

impl<const LEGACY: bool> EncodeValue for CiphertextRef<'_, LEGACY> {
    fn value_len(&self) -> der::Result<Length> {
        self.x.encoded_len()?
            + self.y.encoded_len()?
            + self.c3.encoded_len()?
            + self.c2.encoded_len()?
    }

    fn encode_value(&self, encoder: &mut impl Writer) -> der::Result<()> {
        self.x.encode(encoder)?;
        self.y.encode(encoder)?;
        if LEGACY {
            self.c2.encode(encoder)?;
            self.c3.encode(encoder)?;
        } else {
            self.c3.encode(encoder)?;
            self.c2.encode(encoder)?;
        }
        Ok(())
    }
}

impl<'a, const LEGACY: bool> DecodeValue<'a> for CiphertextRef<'a, LEGACY> {
    fn decode_value<R: Reader<'a>>(reader: &mut R, _header: Header) -> der::Result<Self> {
        let x = UintRef::decode(reader)?;
        let y = UintRef::decode(reader)?;
        let first = OctetStringRef::decode(reader)?;
        let second = OctetStringRef::decode(reader)?;
        let (c3, c2) = if LEGACY {
            (second, first)
        } else {
            (first, second)
        };
        Ok(Self { x, y, c3, c2 })
    }
}

impl<'a, const LEGACY: bool> Sequence<'a> for CiphertextRef<'a, LEGACY> {}
