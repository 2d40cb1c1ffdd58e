//! SM2 key encodings: SPKI public keys, SEC1 `ECPrivateKey` and PKCS#8
//! `PrivateKeyInfo`.

use crate::{Error, Result, pem};
use der::{
    Decode, Encode, Tag, Tagged,
    asn1::{Any, BitString, ObjectIdentifier},
};
use gm_sm2::{PrivateKey, PublicKey, SM2_OID};
use sec1::{EcParameters, EcPrivateKey};
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use zeroize::Zeroizing;

/// `id-ecPublicKey` from RFC 5480.
pub const ID_EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

/// `AlgorithmIdentifier { id-ecPublicKey, sm2 }`
pub(crate) fn sm2_key_algorithm() -> Result<AlgorithmIdentifierOwned> {
    Ok(AlgorithmIdentifierOwned {
        oid: ID_EC_PUBLIC_KEY,
        parameters: Some(Any::new(Tag::ObjectIdentifier, SM2_OID.as_bytes())?),
    })
}

/// Wrap a public key as `SubjectPublicKeyInfo`.
pub(crate) fn to_spki(public_key: &PublicKey) -> Result<SubjectPublicKeyInfoOwned> {
    Ok(SubjectPublicKeyInfoOwned {
        algorithm: sm2_key_algorithm()?,
        subject_public_key: BitString::from_bytes(&public_key.to_sec1_bytes())?,
    })
}

/// Extract an SM2 public key, rejecting other algorithms and curves.
pub(crate) fn from_spki(spki: &SubjectPublicKeyInfoOwned) -> Result<PublicKey> {
    if spki.algorithm.oid != ID_EC_PUBLIC_KEY
        || parameters_oid(spki.algorithm.parameters.as_ref())? != SM2_OID
    {
        return Err(Error::EncodingError);
    }

    let point = spki
        .subject_public_key
        .as_bytes()
        .ok_or(Error::EncodingError)?;
    Ok(PublicKey::from_sec1_bytes(point)?)
}

/// Curve OID carried in algorithm parameters.
fn parameters_oid(parameters: Option<&Any>) -> Result<ObjectIdentifier> {
    match parameters {
        Some(any) if any.tag() == Tag::ObjectIdentifier => {
            Ok(ObjectIdentifier::from_der(&any.to_der()?)?)
        }
        _ => Err(Error::EncodingError),
    }
}

/// DER `SubjectPublicKeyInfo` for `public_key`.
pub fn public_key_to_der(public_key: &PublicKey) -> Result<Vec<u8>> {
    Ok(to_spki(public_key)?.to_der()?)
}

/// Parse a DER `SubjectPublicKeyInfo` holding an SM2 key.
pub fn public_key_from_der(der: &[u8]) -> Result<PublicKey> {
    from_spki(&SubjectPublicKeyInfoOwned::from_der(der)?)
}

/// DER `SubjectPublicKeyInfo` for a 130-character hex public key.
pub fn public_key_hex_to_der(hex: &str) -> Result<Vec<u8>> {
    public_key_to_der(&PublicKey::from_hex(hex)?)
}

/// Hex form `04 || X || Y` of the key in a DER `SubjectPublicKeyInfo`.
pub fn public_key_hex_from_der(der: &[u8]) -> Result<String> {
    Ok(public_key_from_der(der)?.to_hex())
}

/// SEC1 `ECPrivateKey` DER with the SM2 curve and the public key included.
pub fn private_key_to_der(private_key: &PrivateKey) -> Result<Zeroizing<Vec<u8>>> {
    let secret = private_key.to_bytes();
    let public = private_key.public_key().to_sec1_bytes();
    let ec_key = EcPrivateKey {
        private_key: secret.as_slice(),
        parameters: Some(EcParameters::NamedCurve(SM2_OID)),
        public_key: Some(public.as_slice()),
    };
    Ok(Zeroizing::new(ec_key.to_der()?))
}

/// Parse SEC1 `ECPrivateKey` DER.
///
/// Curve parameters, when present, must name SM2; an embedded public key
/// must match the private key.
pub fn private_key_from_der(der: &[u8]) -> Result<PrivateKey> {
    let ec_key = EcPrivateKey::try_from(der)?;
    if let Some(curve) = ec_key.parameters.and_then(|p| p.named_curve()) {
        if curve != SM2_OID {
            return Err(Error::EncodingError);
        }
    }

    let private_key = scalar_from_sec1(ec_key.private_key)?;
    if let Some(public) = ec_key.public_key {
        if PublicKey::from_sec1_bytes(public)? != private_key.public_key() {
            return Err(gm_sm2::Error::InvalidKey.into());
        }
    }
    Ok(private_key)
}

/// SEC1 DER for a 64-character hex private key.
pub fn private_key_hex_to_der(hex: &str) -> Result<Zeroizing<Vec<u8>>> {
    private_key_to_der(&PrivateKey::from_hex(hex)?)
}

/// Uppercase hex private key from SEC1 DER.
pub fn private_key_hex_from_der(der: &[u8]) -> Result<Zeroizing<String>> {
    Ok(private_key_from_der(der)?.to_hex())
}

/// Parse a PEM private key, either SEC1 `EC PRIVATE KEY` or PKCS#8
/// `PRIVATE KEY` with an SM2 `ECPrivateKey` inside.
pub fn parse_private_key_pem(pem: &str) -> Result<PrivateKey> {
    let (label, der) = pem::decode(pem)?;
    let der = Zeroizing::new(der);
    match label {
        pem::PemLabel::EcPrivateKey => private_key_from_der(&der),
        pem::PemLabel::PrivateKey => private_key_from_pkcs8(&der),
        _ => Err(Error::EncodingError),
    }
}

/// Parse PKCS#8 `PrivateKeyInfo` DER.
pub fn private_key_from_pkcs8(der: &[u8]) -> Result<PrivateKey> {
    let info = pkcs8::PrivateKeyInfo::try_from(der)?;
    info.algorithm.assert_algorithm_oid(ID_EC_PUBLIC_KEY)?;
    if info.algorithm.parameters_oid()? != SM2_OID {
        return Err(Error::EncodingError);
    }
    private_key_from_der(info.private_key)
}

/// Left-pad a SEC1 private key octet string to 32 bytes.
fn scalar_from_sec1(bytes: &[u8]) -> Result<PrivateKey> {
    if bytes.len() > 32 {
        return Err(Error::EncodingError);
    }
    let mut padded = Zeroizing::new([0u8; 32]);
    padded[32 - bytes.len()..].copy_from_slice(bytes);
    Ok(PrivateKey::from_bytes(padded.as_slice())?)
}
