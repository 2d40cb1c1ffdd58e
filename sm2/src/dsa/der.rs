//! ASN.1 DER encoding for SM2 signatures.

use super::{MAX_SIGNATURE_LEN, Signature};
use crate::{Error, Result, Scalar};
use der::{
    Decode, DecodeValue, Encode, EncodeValue, Header, Length, Reader, Sequence, Writer,
    asn1::UintRef,
};

impl Signature {
    /// Parse a DER `SEQUENCE { INTEGER r, INTEGER s }`.
    pub fn from_der(input: &[u8]) -> Result<Self> {
        if input.len() > MAX_SIGNATURE_LEN {
            return Err(Error::EncodingError);
        }

        let SignatureRef { r, s } = SignatureRef::from_der(input)?;
        Self::from_scalars(scalar_from_uint(r)?, scalar_from_uint(s)?)
    }

    /// Serialize as a DER `SEQUENCE { INTEGER r, INTEGER s }`.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        let r = self.r.to_bytes();
        let s = self.s.to_bytes();
        let sig = SignatureRef {
            r: UintRef::new(&r)?,
            s: UintRef::new(&s)?,
        };
        Ok(sig.to_der()?)
    }
}

fn scalar_from_uint(uint: UintRef<'_>) -> Result<Scalar> {
    let bytes = uint.as_bytes();
    if bytes.len() > 32 {
        return Err(Error::EncodingError);
    }
    let mut padded = [0u8; 32];
    padded[32 - bytes.len()..].copy_from_slice(bytes);
    Option::from(Scalar::from_bytes(&padded)).ok_or(Error::EncodingError)
}

struct SignatureRef<'a> {
    pub r: UintRef<'a>,
    pub s: UintRef<'a>,
}

impl EncodeValue for SignatureRef<'_> {
    fn value_len(&self) -> der::Result<Length> {
        self.r.encoded_len()? + self.s.encoded_len()?
    }

    fn encode_value(&self, encoder: &mut impl Writer) -> der::Result<()> {
        self.r.encode(encoder)?;
        self.s.encode(encoder)?;
        Ok(())
    }
}

impl<'a> DecodeValue<'a> for SignatureRef<'a> {
    fn decode_value<R: Reader<'a>>(reader: &mut R, _header: Header) -> der::Result<Self> {
        Ok(Self {
            r: UintRef::decode(reader)?,
            s: UintRef::decode(reader)?,
        })
    }
}

impl<'a> Sequence<'a> for SignatureRef<'a> {}
