//! X.509 v3 issuance from a verified request.

use crate::{
    Error, Result,
    asn1::{Certificate, Name, TbsCertificate, Time, Validity, Version},
    csr,
    extensions::{KeyUsage, basic_constraints_extension, key_usage_extension},
    keys, name, signing,
};
use der::{
    Decode, Encode,
    asn1::{ObjectIdentifier, Uint},
};
use gm_sm2::{PrivateKey, Sm2Context};

/// Largest serial number accepted, in bytes.
pub const MAX_SERIAL_LEN: usize = 20;

const SECONDS_PER_DAY: u64 = 86_400;

/// What the certified key may be used for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CertUsage {
    /// Signing certificate.
    Sign = 1,
    /// Encryption certificate.
    Encrypt = 2,
    /// Both.
    #[default]
    Both = 3,
}

impl CertUsage {
    /// Map the numeric usage code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(CertUsage::Sign),
            2 => Some(CertUsage::Encrypt),
            3 => Some(CertUsage::Both),
            _ => None,
        }
    }

    /// Numeric usage code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// `keyUsage` bits; a CA additionally gets certificate and CRL signing.
    pub fn key_usage(self, ca: bool) -> KeyUsage {
        let sign = KeyUsage::DIGITAL_SIGNATURE | KeyUsage::NON_REPUDIATION;
        let encrypt =
            KeyUsage::KEY_ENCIPHERMENT | KeyUsage::DATA_ENCIPHERMENT | KeyUsage::KEY_AGREEMENT;
        let usage = match self {
            CertUsage::Sign => sign,
            CertUsage::Encrypt => encrypt,
            CertUsage::Both => sign | encrypt,
        };
        if ca {
            usage | KeyUsage::KEY_CERT_SIGN | KeyUsage::CRL_SIGN
        } else {
            usage
        }
    }
}

/// Everything needed to issue one certificate.
pub(crate) struct IssueRequest<'a> {
    pub csr: &'a [u8],
    /// `None` issues a self-signed certificate.
    pub ca_cert: Option<&'a [u8]>,
    pub serial: &'a str,
    pub ca_key: &'a PrivateKey,
    pub valid_days: u32,
    pub usage: CertUsage,
    /// Appended to the request subject in order.
    pub extra_subject: &'a [(ObjectIdentifier, String)],
}

/// Issue a certificate valid from `now` (Unix seconds).
pub(crate) fn issue(
    ctx: &mut Sm2Context,
    req: &IssueRequest<'_>,
    distid: &[u8],
    now: u64,
) -> Result<Vec<u8>> {
    let serial_number = parse_serial(req.serial)?;
    if req.valid_days == 0 {
        return Err(Error::InvalidParameter);
    }

    let csr = csr::parse(req.csr)?;
    let subject_key = csr::verify(ctx, req.csr, &csr, distid)?;
    let ca_public = req.ca_key.public_key();

    let mut subject = csr.info.subject.clone();
    for (oid, value) in req.extra_subject {
        name::push_attribute(&mut subject, *oid, value)?;
    }

    let (issuer, self_signed): (Name, bool) = match req.ca_cert {
        None => {
            if ca_public != subject_key {
                log::debug!("self-signed issuance with a key other than the requested one");
                return Err(gm_sm2::Error::InvalidKey.into());
            }
            (subject.clone(), true)
        }
        Some(ca_der) => {
            let ca = Certificate::from_der(ca_der)?;
            if keys::from_spki(&ca.tbs_certificate.subject_public_key_info)? != ca_public {
                log::debug!("CA private key does not match the CA certificate");
                return Err(gm_sm2::Error::InvalidKey.into());
            }
            (ca.tbs_certificate.subject, false)
        }
    };

    let not_after = u64::from(req.valid_days)
        .checked_mul(SECONDS_PER_DAY)
        .and_then(|secs| now.checked_add(secs))
        .ok_or(Error::InvalidParameter)?;
    let validity = Validity {
        not_before: Time::from_unix_secs(now)?,
        not_after: Time::from_unix_secs(not_after)?,
    };

    let tbs = TbsCertificate {
        version: Version::V3,
        serial_number,
        signature: signing::sm2_with_sm3(),
        issuer,
        validity,
        subject,
        subject_public_key_info: keys::to_spki(&subject_key)?,
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions: Some(vec![
            basic_constraints_extension(self_signed)?,
            key_usage_extension(req.usage.key_usage(self_signed))?,
        ]),
    };

    let tbs_der = tbs.to_der()?;
    let signature = signing::sign(ctx, &tbs_der, distid, req.ca_key)?;
    let cert = Certificate {
        tbs_certificate: tbs,
        signature_algorithm: signing::sm2_with_sm3(),
        signature,
    };
    Ok(cert.to_der()?)
}

/// Positive serial of at most [`MAX_SERIAL_LEN`] bytes, given in hex.
fn parse_serial(serial: &str) -> Result<Uint> {
    let bytes = hex::decode(serial).map_err(|_| Error::InvalidParameter)?;
    if bytes.is_empty() || bytes.len() > MAX_SERIAL_LEN || bytes.iter().all(|&b| b == 0) {
        return Err(Error::InvalidParameter);
    }
    Ok(Uint::new(&bytes)?)
}
