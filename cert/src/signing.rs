//! SM2-with-SM3 signatures over DER-encoded `to-be-signed` structures.

use crate::Result;
use der::asn1::BitString;
use gm_sm2::{PrivateKey, PublicKey, SM2_WITH_SM3_OID, SignMode, Sm2Context};
use spki::AlgorithmIdentifierOwned;

/// `AlgorithmIdentifier { sm2-with-sm3 }` with absent parameters.
pub(crate) fn sm2_with_sm3() -> AlgorithmIdentifierOwned {
    AlgorithmIdentifierOwned {
        oid: SM2_WITH_SM3_OID,
        parameters: None,
    }
}

/// Sign `tbs` and wrap the DER signature for the outer structure.
pub(crate) fn sign(
    ctx: &mut Sm2Context,
    tbs: &[u8],
    distid: &[u8],
    private_key: &PrivateKey,
) -> Result<BitString> {
    let public_key = private_key.public_key();
    let sig = ctx.sign(tbs, distid, &public_key, private_key, SignMode::RsAsn1)?;
    Ok(BitString::from_bytes(&sig)?)
}

/// Check a signature over `tbs`. Unknown algorithms and bit strings with
/// unused bits do not verify.
pub(crate) fn verify(
    ctx: &Sm2Context,
    tbs: &[u8],
    algorithm: &AlgorithmIdentifierOwned,
    signature: &BitString,
    distid: &[u8],
    public_key: &PublicKey,
) -> Result<bool> {
    if algorithm.oid != SM2_WITH_SM3_OID {
        log::debug!("unsupported signature algorithm {}", algorithm.oid);
        return Ok(false);
    }
    let Some(sig) = signature.as_bytes() else {
        return Ok(false);
    };
    Ok(ctx.verify(tbs, distid, sig, public_key, SignMode::RsAsn1)?)
}
