//! PEM armoring ([RFC 7468]) for the DER structures this crate handles.
//!
//! [RFC 7468]: https://datatracker.ietf.org/doc/html/rfc7468

use crate::{Error, Result};
use pem_rfc7468::LineEnding;

/// Type labels accepted in PEM encapsulation boundaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PemLabel {
    /// PKCS#10 request.
    CertificateRequest,
    /// X.509 certificate.
    Certificate,
    /// SEC1 `ECPrivateKey`.
    EcPrivateKey,
    /// PKCS#8 `PrivateKeyInfo`.
    PrivateKey,
    /// `SubjectPublicKeyInfo`.
    PublicKey,
}

impl PemLabel {
    /// Label text as it appears after `-----BEGIN `.
    pub fn as_str(self) -> &'static str {
        match self {
            PemLabel::CertificateRequest => "CERTIFICATE REQUEST",
            PemLabel::Certificate => "CERTIFICATE",
            PemLabel::EcPrivateKey => "EC PRIVATE KEY",
            PemLabel::PrivateKey => "PRIVATE KEY",
            PemLabel::PublicKey => "PUBLIC KEY",
        }
    }

    /// Look up a label by its text.
    pub fn from_label(label: &str) -> Option<Self> {
        [
            PemLabel::CertificateRequest,
            PemLabel::Certificate,
            PemLabel::EcPrivateKey,
            PemLabel::PrivateKey,
            PemLabel::PublicKey,
        ]
        .into_iter()
        .find(|l| l.as_str() == label)
    }
}

/// Armor `der` under `label` with LF line endings.
pub fn der_to_pem(label: PemLabel, der: &[u8]) -> Result<String> {
    if der.is_empty() {
        return Err(Error::InvalidParameter);
    }
    Ok(pem_rfc7468::encode_string(label.as_str(), LineEnding::LF, der)?)
}

/// Strip the armor from `pem`, which must carry `label`.
pub fn pem_to_der(label: PemLabel, pem: &str) -> Result<Vec<u8>> {
    let (found, der) = decode(pem)?;
    if found != label {
        log::debug!("expected PEM label {}, found {}", label.as_str(), found.as_str());
        return Err(Error::EncodingError);
    }
    Ok(der)
}

/// Decode `pem` and report which known label it carried.
pub(crate) fn decode(pem: &str) -> Result<(PemLabel, Vec<u8>)> {
    let (label, der) = pem_rfc7468::decode_vec(pem.trim().as_bytes())?;
    let label = PemLabel::from_label(label).ok_or(Error::EncodingError)?;
    Ok((label, der))
}
