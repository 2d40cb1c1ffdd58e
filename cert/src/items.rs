//! Tagged certificate items: inputs to item-based issuance and values read
//! back from issued certificates.

use crate::{
    Error, Result,
    asn1::Certificate,
    issue::CertUsage,
    keys,
    name::{COMMON_NAME, DESCRIPTION, attribute_values},
};
use core::fmt;
use der::{Decode, asn1::ObjectIdentifier};

/// Request DER.
pub const ITEM_CSR: u32 = 1;
/// Serial number as hex; also the read-back id of the serial.
pub const ITEM_SERIAL: u32 = 2;
/// Signing private key as hex.
pub const ITEM_PRIVATE_KEY: u32 = 3;
/// Validity in days.
pub const ITEM_VALID_DAYS: u32 = 4;
/// Usage code, see [`CertUsage`].
pub const ITEM_USAGE: u32 = 20;
/// CA certificate DER; absent for self-signed issuance.
pub const ITEM_CA_CERT: u32 = 21;
/// Arbitrary subject attribute given as `OID=value`.
pub const ITEM_SUBJECT_ATTRIBUTE: u32 = 100;
/// Subject `description`.
pub const ITEM_DESCRIPTION: u32 = 101;
/// Subject `commonName`.
pub const ITEM_COMMON_NAME: u32 = 102;
/// Public key as hex (read-back only).
pub const ITEM_PUBLIC_KEY: u32 = 2002;
/// Issuer `commonName` (read-back only).
pub const ITEM_ISSUER_COMMON_NAME: u32 = 2003;
/// `notBefore` as Unix seconds (read-back only).
pub const ITEM_NOT_BEFORE: u32 = 2004;
/// `notAfter` as Unix seconds (read-back only).
pub const ITEM_NOT_AFTER: u32 = 2005;

/// One input to item-based issuance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CertItem {
    /// DER request to certify.
    Csr(Vec<u8>),
    /// Serial number in hex.
    Serial(String),
    /// Issuer private key in hex.
    PrivateKey(String),
    /// Validity in days.
    ValidDays(u32),
    /// Key usage.
    Usage(CertUsage),
    /// DER of the issuing CA certificate.
    CaCert(Vec<u8>),
    /// Extra subject attribute.
    SubjectAttribute(ObjectIdentifier, String),
    /// Extra subject `description`.
    Description(String),
    /// Extra subject `commonName`.
    CommonName(String),
}

impl CertItem {
    /// Numeric tag of this item.
    pub fn tag(&self) -> u32 {
        match self {
            CertItem::Csr(_) => ITEM_CSR,
            CertItem::Serial(_) => ITEM_SERIAL,
            CertItem::PrivateKey(_) => ITEM_PRIVATE_KEY,
            CertItem::ValidDays(_) => ITEM_VALID_DAYS,
            CertItem::Usage(_) => ITEM_USAGE,
            CertItem::CaCert(_) => ITEM_CA_CERT,
            CertItem::SubjectAttribute(..) => ITEM_SUBJECT_ATTRIBUTE,
            CertItem::Description(_) => ITEM_DESCRIPTION,
            CertItem::CommonName(_) => ITEM_COMMON_NAME,
        }
    }

    /// Build an item from its tag and raw value. Numbers are ASCII decimal
    /// and text is UTF-8.
    pub fn from_tag(tag: u32, value: &[u8]) -> Result<Self> {
        let item = match tag {
            ITEM_CSR => CertItem::Csr(value.to_vec()),
            ITEM_SERIAL => CertItem::Serial(text(value)?),
            ITEM_PRIVATE_KEY => CertItem::PrivateKey(text(value)?),
            ITEM_VALID_DAYS => CertItem::ValidDays(number(value)?),
            ITEM_USAGE => {
                let code = number(value)?;
                let usage = u8::try_from(code)
                    .ok()
                    .and_then(CertUsage::from_code)
                    .ok_or(Error::InvalidParameter)?;
                CertItem::Usage(usage)
            }
            ITEM_CA_CERT => CertItem::CaCert(value.to_vec()),
            ITEM_SUBJECT_ATTRIBUTE => {
                let text = text(value)?;
                let (oid, value) = text.split_once('=').ok_or(Error::InvalidParameter)?;
                let oid = ObjectIdentifier::new(oid.trim()).map_err(|_| Error::InvalidParameter)?;
                CertItem::SubjectAttribute(oid, value.to_owned())
            }
            ITEM_DESCRIPTION => CertItem::Description(text(value)?),
            ITEM_COMMON_NAME => CertItem::CommonName(text(value)?),
            _ => {
                log::debug!("unknown certificate item tag {tag}");
                return Err(Error::InvalidParameter);
            }
        };
        Ok(item)
    }
}

fn text(value: &[u8]) -> Result<String> {
    String::from_utf8(value.to_vec()).map_err(|_| Error::InvalidParameter)
}

fn number(value: &[u8]) -> Result<u32> {
    core::str::from_utf8(value)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .ok_or(Error::InvalidParameter)
}

/// A value read back from a certificate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CertItemValue {
    /// Exactly one value.
    Single(String),
    /// Zero or several values, in certificate order.
    Multiple(Vec<String>),
}

impl CertItemValue {
    fn from_values(mut values: Vec<String>) -> Self {
        if values.len() == 1 {
            CertItemValue::Single(values.remove(0))
        } else {
            CertItemValue::Multiple(values)
        }
    }

    /// Number of values.
    pub fn count(&self) -> usize {
        match self {
            CertItemValue::Single(_) => 1,
            CertItemValue::Multiple(values) => values.len(),
        }
    }
}

/// A single value prints as itself; several print as `["a","b"]`.
impl fmt::Display for CertItemValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertItemValue::Single(value) => f.write_str(value),
            CertItemValue::Multiple(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "\"{value}\"")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Read item `item_id` from a DER certificate.
pub fn certificate_item(der: &[u8], item_id: u32) -> Result<CertItemValue> {
    let cert = Certificate::from_der(der)?;
    let tbs = &cert.tbs_certificate;
    let values = match item_id {
        ITEM_PUBLIC_KEY => vec![keys::from_spki(&tbs.subject_public_key_info)?.to_hex()],
        ITEM_SERIAL => vec![hex::encode_upper(tbs.serial_number.as_bytes())],
        ITEM_DESCRIPTION => attribute_values(&tbs.subject, DESCRIPTION),
        ITEM_COMMON_NAME => attribute_values(&tbs.subject, COMMON_NAME),
        ITEM_ISSUER_COMMON_NAME => attribute_values(&tbs.issuer, COMMON_NAME),
        ITEM_NOT_BEFORE => vec![tbs.validity.not_before.to_unix_secs().to_string()],
        ITEM_NOT_AFTER => vec![tbs.validity.not_after.to_unix_secs().to_string()],
        _ => {
            log::debug!("unknown read-back item {item_id}");
            return Err(Error::InvalidParameter);
        }
    };
    Ok(CertItemValue::from_values(values))
}
