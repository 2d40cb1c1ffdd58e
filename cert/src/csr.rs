//! PKCS#10 certification requests.

use crate::{
    Error, Result,
    asn1::{self, Attribute, CertReq, CertReqInfo, Version},
    keys, signing,
    name::SubjectFields,
};
use der::{
    Decode, Encode, Tag,
    asn1::{Any, ObjectIdentifier, OctetStringRef, SetOfVec},
};
use gm_sm2::{PrivateKey, PublicKey, Sm2Context};

/// PKCS#9 `challengePassword`
pub const CHALLENGE_PASSWORD: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.7");

/// Temporary public key attribute used by double-certificate requests.
/// Its single value is an `OCTET STRING` holding `04 || X || Y`.
pub const TEMP_PUBLIC_KEY: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.156.10197.6.1.4.2.1");

/// Request flavour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CsrMode {
    /// One signing certificate.
    #[default]
    Single,
    /// A signing certificate plus an encryption certificate whose key the
    /// CA returns wrapped under the temporary public key.
    Double,
}

/// Inputs for [`build`].
#[derive(Clone, Debug)]
pub struct CsrParams<'a> {
    /// Requested subject.
    pub subject: SubjectFields,
    /// Optional `challengePassword` attribute.
    pub challenge_password: Option<&'a str>,
    /// Key to be certified.
    pub public_key: &'a PublicKey,
    /// Key signing the request; must match `public_key`.
    pub private_key: &'a PrivateKey,
    /// Temporary public key, required for [`CsrMode::Double`].
    pub temp_public_key: Option<&'a PublicKey>,
    /// Request flavour.
    pub mode: CsrMode,
}

impl<'a> CsrParams<'a> {
    /// Single-mode request with no attributes.
    pub fn new(subject: SubjectFields, public_key: &'a PublicKey, private_key: &'a PrivateKey) -> Self {
        Self {
            subject,
            challenge_password: None,
            public_key,
            private_key,
            temp_public_key: None,
            mode: CsrMode::Single,
        }
    }

    /// Add a `challengePassword` attribute.
    pub fn challenge_password(mut self, password: &'a str) -> Self {
        self.challenge_password = Some(password);
        self
    }

    /// Switch to [`CsrMode::Double`] with the given temporary key.
    pub fn double(mut self, temp_public_key: &'a PublicKey) -> Self {
        self.temp_public_key = Some(temp_public_key);
        self.mode = CsrMode::Double;
        self
    }
}

/// Build and sign a DER request.
pub(crate) fn build(ctx: &mut Sm2Context, params: &CsrParams<'_>, distid: &[u8]) -> Result<Vec<u8>> {
    if params.private_key.public_key() != *params.public_key {
        return Err(gm_sm2::Error::InvalidKey.into());
    }

    let mut attributes = Vec::new();
    if let Some(password) = params.challenge_password {
        if password.is_empty() {
            return Err(Error::InvalidParameter);
        }
        attributes.push(single_valued(
            CHALLENGE_PASSWORD,
            Any::new(Tag::Utf8String, password.as_bytes())?,
        )?);
    }
    match (params.mode, params.temp_public_key) {
        (CsrMode::Double, Some(temp)) => {
            let point = temp.to_sec1_bytes();
            attributes.push(single_valued(
                TEMP_PUBLIC_KEY,
                Any::encode_from(&OctetStringRef::new(&point)?)?,
            )?);
        }
        (CsrMode::Double, None) => {
            log::debug!("double-certificate request without a temporary key");
            return Err(Error::InvalidParameter);
        }
        (CsrMode::Single, _) => {}
    }

    let info = CertReqInfo {
        version: Version::V1,
        subject: params.subject.to_name()?,
        public_key: keys::to_spki(params.public_key)?,
        attributes: SetOfVec::try_from(attributes)?,
    };
    let tbs = info.to_der()?;
    let signature = signing::sign(ctx, &tbs, distid, params.private_key)?;

    let req = CertReq {
        info,
        algorithm: signing::sm2_with_sm3(),
        signature,
    };
    Ok(req.to_der()?)
}

fn single_valued(oid: ObjectIdentifier, value: Any) -> Result<Attribute> {
    Ok(Attribute {
        oid,
        values: SetOfVec::try_from(vec![value])?,
    })
}

/// Parse a DER request.
pub(crate) fn parse(der: &[u8]) -> Result<CertReq> {
    Ok(CertReq::from_der(der)?)
}

/// Check the self-signature of `req`, parsed from `der`, and return the
/// requested key.
pub(crate) fn verify(
    ctx: &Sm2Context,
    der: &[u8],
    req: &CertReq,
    distid: &[u8],
) -> Result<PublicKey> {
    let public_key = keys::from_spki(&req.info.public_key)?;
    let tbs = asn1::signed_portion(der)?;
    if !signing::verify(ctx, tbs, &req.algorithm, &req.signature, distid, &public_key)? {
        log::debug!("request signature did not verify");
        return Err(gm_sm2::Error::SignatureInvalid.into());
    }
    Ok(public_key)
}

/// SM2 public key carried by a DER request. The signature is not checked.
pub fn csr_public_key(der: &[u8]) -> Result<PublicKey> {
    keys::from_spki(&parse(der)?.info.public_key)
}

/// Temporary public key of a double-certificate request, if present.
pub fn csr_temp_public_key(der: &[u8]) -> Result<Option<PublicKey>> {
    let req = parse(der)?;
    let Some(attr) = req.attribute(TEMP_PUBLIC_KEY) else {
        return Ok(None);
    };
    let value = attr.values.iter().next().ok_or(Error::EncodingError)?;
    let point = value.decode_as::<OctetStringRef<'_>>()?;
    Ok(Some(PublicKey::from_sec1_bytes(point.as_bytes())?))
}

/// `challengePassword` of a request, if present.
pub fn csr_challenge_password(der: &[u8]) -> Result<Option<String>> {
    let req = parse(der)?;
    Ok(req
        .attribute(CHALLENGE_PASSWORD)
        .and_then(|attr| attr.values.iter().next())
        .and_then(crate::name::string_value))
}
