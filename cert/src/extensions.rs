//! The two certificate extensions issued certificates carry:
//! `basicConstraints` and `keyUsage`.

use crate::{
    Result,
    asn1::{BasicConstraints, Extension},
};
use core::ops::BitOr;
use der::{
    Decode, Encode,
    asn1::{BitString, ObjectIdentifier, OctetString},
};

/// `id-ce-keyUsage`
pub const ID_CE_KEY_USAGE: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.15");
/// `id-ce-basicConstraints`
pub const ID_CE_BASIC_CONSTRAINTS: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.19");

/// `KeyUsage` bits, most significant bit first as in the DER `BIT STRING`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyUsage(u16);

impl KeyUsage {
    /// `digitalSignature (0)`
    pub const DIGITAL_SIGNATURE: Self = Self(0x8000);
    /// `nonRepudiation (1)`
    pub const NON_REPUDIATION: Self = Self(0x4000);
    /// `keyEncipherment (2)`
    pub const KEY_ENCIPHERMENT: Self = Self(0x2000);
    /// `dataEncipherment (3)`
    pub const DATA_ENCIPHERMENT: Self = Self(0x1000);
    /// `keyAgreement (4)`
    pub const KEY_AGREEMENT: Self = Self(0x0800);
    /// `keyCertSign (5)`
    pub const KEY_CERT_SIGN: Self = Self(0x0400);
    /// `cRLSign (6)`
    pub const CRL_SIGN: Self = Self(0x0200);

    /// Whether every bit of `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Raw bits.
    pub fn bits(self) -> u16 {
        self.0
    }

    /// Minimal `BIT STRING` form: trailing zero octets and bits dropped.
    pub fn to_bit_string(self) -> Result<BitString> {
        let [hi, lo] = self.0.to_be_bytes();
        let bytes = match (hi, lo) {
            (0, 0) => Vec::new(),
            (_, 0) => vec![hi],
            _ => vec![hi, lo],
        };
        let unused = bytes.last().map_or(0, |b| b.trailing_zeros() as u8);
        Ok(BitString::new(unused, bytes)?)
    }

    /// Read bits back from a `BIT STRING`; bits past `decipherOnly` are
    /// ignored.
    pub fn from_bit_string(bits: &BitString) -> Self {
        let raw = bits.raw_bytes();
        let hi = raw.first().copied().unwrap_or(0);
        let lo = raw.get(1).copied().unwrap_or(0);
        Self(u16::from_be_bytes([hi, lo]))
    }
}

impl BitOr for KeyUsage {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Critical `keyUsage` extension.
pub fn key_usage_extension(usage: KeyUsage) -> Result<Extension> {
    Ok(Extension {
        extn_id: ID_CE_KEY_USAGE,
        critical: true,
        extn_value: OctetString::new(usage.to_bit_string()?.to_der()?)?,
    })
}

/// Critical `basicConstraints` extension.
pub fn basic_constraints_extension(ca: bool) -> Result<Extension> {
    let value = BasicConstraints {
        ca,
        path_len_constraint: None,
    };
    Ok(Extension {
        extn_id: ID_CE_BASIC_CONSTRAINTS,
        critical: true,
        extn_value: OctetString::new(value.to_der()?)?,
    })
}

/// Decode the value of a `keyUsage` extension.
pub fn parse_key_usage(ext: &Extension) -> Result<KeyUsage> {
    let bits = BitString::from_der(ext.extn_value.as_bytes())?;
    Ok(KeyUsage::from_bit_string(&bits))
}

/// Decode the value of a `basicConstraints` extension.
pub fn parse_basic_constraints(ext: &Extension) -> Result<BasicConstraints> {
    Ok(BasicConstraints::from_der(ext.extn_value.as_bytes())?)
}
