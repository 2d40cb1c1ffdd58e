//! X.509 v3 certificate and PKCS#10 request structures ([RFC 5280],
//! [RFC 2986]).
//!
//! [RFC 5280]: https://datatracker.ietf.org/doc/html/rfc5280
//! [RFC 2986]: https://datatracker.ietf.org/doc/html/rfc2986

use core::time::Duration;
use der::{
    Choice, Enumerated, Reader, Sequence, SliceReader, ValueOrd,
    asn1::{Any, BitString, GeneralizedTime, ObjectIdentifier, OctetString, SetOfVec, Uint, UtcTime},
};
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

/// `Version ::= INTEGER { v1(0), v2(1), v3(2) }`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Enumerated)]
#[asn1(type = "INTEGER")]
#[repr(u8)]
pub enum Version {
    /// Version 1, also the only PKCS#10 version.
    #[default]
    V1 = 0,
    /// Version 2.
    V2 = 1,
    /// Version 3.
    V3 = 2,
}

/// ```text
/// AttributeTypeAndValue ::= SEQUENCE {
///     type   AttributeType,
///     value  AttributeValue
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Sequence, ValueOrd)]
pub struct AttributeTypeAndValue {
    /// Attribute type.
    pub oid: ObjectIdentifier,
    /// Attribute value, usually a directory string.
    pub value: Any,
}

/// `RelativeDistinguishedName ::= SET SIZE (1..MAX) OF AttributeTypeAndValue`
pub type RelativeDistinguishedName = SetOfVec<AttributeTypeAndValue>;

/// `Name ::= SEQUENCE OF RelativeDistinguishedName`
pub type Name = Vec<RelativeDistinguishedName>;

/// `Time ::= CHOICE { utcTime UTCTime, generalTime GeneralizedTime }`
#[derive(Choice, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Time {
    /// Dates through 2049.
    #[asn1(type = "UTCTime")]
    UtcTime(UtcTime),
    /// Dates from 2050 on.
    #[asn1(type = "GeneralizedTime")]
    GeneralTime(GeneralizedTime),
}

impl Time {
    /// First second that must be encoded as `GeneralizedTime`
    /// (2050-01-01T00:00:00Z).
    const GENERALIZED_FROM: u64 = 2_524_608_000;

    /// Encode a Unix timestamp using the type RFC 5280 requires for it.
    pub fn from_unix_secs(secs: u64) -> der::Result<Self> {
        let duration = Duration::from_secs(secs);
        if secs < Self::GENERALIZED_FROM {
            Ok(Time::UtcTime(UtcTime::from_unix_duration(duration)?))
        } else {
            Ok(Time::GeneralTime(GeneralizedTime::from_unix_duration(duration)?))
        }
    }

    /// Seconds since the Unix epoch.
    pub fn to_unix_secs(&self) -> u64 {
        match self {
            Time::UtcTime(t) => t.to_unix_duration().as_secs(),
            Time::GeneralTime(t) => t.to_unix_duration().as_secs(),
        }
    }
}

/// `Validity ::= SEQUENCE { notBefore Time, notAfter Time }`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Sequence)]
pub struct Validity {
    /// Start of the validity window.
    pub not_before: Time,
    /// End of the validity window.
    pub not_after: Time,
}

/// ```text
/// Extension ::= SEQUENCE {
///     extnID      OBJECT IDENTIFIER,
///     critical    BOOLEAN DEFAULT FALSE,
///     extnValue   OCTET STRING
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Sequence)]
pub struct Extension {
    /// Extension type.
    pub extn_id: ObjectIdentifier,
    /// Whether a relying party must understand the extension.
    #[asn1(default = "Default::default")]
    pub critical: bool,
    /// DER encoding of the extension value.
    pub extn_value: OctetString,
}

/// ```text
/// BasicConstraints ::= SEQUENCE {
///     cA                  BOOLEAN DEFAULT FALSE,
///     pathLenConstraint   INTEGER (0..MAX) OPTIONAL
/// }
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Sequence)]
pub struct BasicConstraints {
    /// Subject is a CA.
    #[asn1(default = "Default::default")]
    pub ca: bool,
    /// Maximum number of intermediate CAs below this one.
    #[asn1(optional = "true")]
    pub path_len_constraint: Option<u8>,
}

/// X.509 `TBSCertificate`.
#[derive(Clone, Debug, PartialEq, Eq, Sequence)]
pub struct TbsCertificate {
    /// Certificate version; always [`Version::V3`] when issued here.
    #[asn1(context_specific = "0", default = "Default::default")]
    pub version: Version,
    /// Issuer-assigned serial number.
    pub serial_number: Uint,
    /// Signature algorithm, repeated from the outer structure.
    pub signature: AlgorithmIdentifierOwned,
    /// Issuer name.
    pub issuer: Name,
    /// Validity window.
    pub validity: Validity,
    /// Subject name.
    pub subject: Name,
    /// Subject public key.
    pub subject_public_key_info: SubjectPublicKeyInfoOwned,
    /// Issuer unique identifier (v2).
    #[asn1(context_specific = "1", tag_mode = "IMPLICIT", optional = "true")]
    pub issuer_unique_id: Option<BitString>,
    /// Subject unique identifier (v2).
    #[asn1(context_specific = "2", tag_mode = "IMPLICIT", optional = "true")]
    pub subject_unique_id: Option<BitString>,
    /// Extensions (v3).
    #[asn1(context_specific = "3", tag_mode = "EXPLICIT", optional = "true")]
    pub extensions: Option<Vec<Extension>>,
}

impl TbsCertificate {
    /// Find an extension by type.
    pub fn extension(&self, oid: ObjectIdentifier) -> Option<&Extension> {
        self.extensions
            .as_ref()?
            .iter()
            .find(|ext| ext.extn_id == oid)
    }
}

/// X.509 `Certificate`.
#[derive(Clone, Debug, PartialEq, Eq, Sequence)]
pub struct Certificate {
    /// Signed portion.
    pub tbs_certificate: TbsCertificate,
    /// Algorithm used by the issuer.
    pub signature_algorithm: AlgorithmIdentifierOwned,
    /// Issuer signature over the DER of `tbs_certificate`.
    pub signature: BitString,
}

/// The signed first element of a `SEQUENCE { tbs, algorithm, signature }`
/// exactly as it appears in `der`, tag and length included.
pub(crate) fn signed_portion(der: &[u8]) -> der::Result<&[u8]> {
    let mut reader = SliceReader::new(der)?;
    let tbs = reader.sequence(|outer| {
        let tbs = outer.tlv_bytes()?;
        outer.tlv_bytes()?;
        outer.tlv_bytes()?;
        Ok(tbs)
    })?;
    reader.finish(tbs)
}

/// `Attribute ::= SEQUENCE { type OBJECT IDENTIFIER, values SET OF ANY }`
#[derive(Clone, Debug, PartialEq, Eq, Sequence, ValueOrd)]
pub struct Attribute {
    /// Attribute type.
    pub oid: ObjectIdentifier,
    /// Attribute values.
    pub values: SetOfVec<Any>,
}

/// PKCS#10 `CertificationRequestInfo`.
#[derive(Clone, Debug, PartialEq, Eq, Sequence)]
pub struct CertReqInfo {
    /// Always [`Version::V1`].
    pub version: Version,
    /// Requested subject name.
    pub subject: Name,
    /// Public key to be certified.
    pub public_key: SubjectPublicKeyInfoOwned,
    /// Request attributes.
    #[asn1(context_specific = "0", tag_mode = "IMPLICIT")]
    pub attributes: SetOfVec<Attribute>,
}

/// PKCS#10 `CertificationRequest`.
#[derive(Clone, Debug, PartialEq, Eq, Sequence)]
pub struct CertReq {
    /// Signed portion.
    pub info: CertReqInfo,
    /// Algorithm used by the requester.
    pub algorithm: AlgorithmIdentifierOwned,
    /// Requester signature over the DER of `info`.
    pub signature: BitString,
}

impl CertReq {
    /// Find a request attribute by type.
    pub fn attribute(&self, oid: ObjectIdentifier) -> Option<&Attribute> {
        self.info.attributes.iter().find(|attr| attr.oid == oid)
    }
}
