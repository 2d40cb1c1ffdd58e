//! SM2 key exchange protocol as defined in GB/T 32918.3.
//!
//! ## Algorithm (party A; party B mirrors it)
//!
//! ```text
//! A4: x̄1 = 2^w + (x1 & (2^w - 1)), w = 127
//! A5: tA = (dA + x̄1 · rA) mod n
//! A6: verify RB is on the curve, x̄2 = 2^w + (x2 & (2^w - 1))
//! A7: U = [h · tA](PB + [x̄2]RB), fail if U is the point at infinity
//! A8: KA = KDF(xU || yU || ZA || ZB, klen)
//! A9: S1 = Hash(0x02 || yU || Hash(xU || ZA || ZB || x1 || y1 || x2 || y2)), check S1 = SB
//! A10: SA = Hash(0x03 || yU || Hash(xU || ZA || ZB || x1 || y1 || x2 || y2))
//! ```
//!
//! `ZA`/`ZB` and `(x1, y1)`/`(x2, y2)` always refer to the initiator and the
//! responder respectively, so both parties feed identical material to the KDF.

use crate::{
    AffinePoint, Error, Hash, PrivateKey, PublicKey, Result, Scalar, Sm2Context,
    distid::hash_z,
};
use log::debug;
use sm3::{Digest, Sm3};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Which side of the exchange the local party plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Party A, who sends the first ephemeral key.
    Initiator,
    /// Party B.
    Responder,
}

/// Inputs to one key exchange computation, from the local party's view.
///
/// Peer keys are taken as SEC1 bytes as received from the wire and are
/// validated here.
#[derive(Clone, Copy, Debug)]
pub struct SharedSecretSession<'a> {
    /// Local static private key.
    pub private_key: &'a PrivateKey,
    /// Local static public key.
    pub public_key: &'a PublicKey,
    /// Local ephemeral private key `r`.
    pub ephemeral_private_key: &'a PrivateKey,
    /// Local ephemeral public key `R = [r]G`.
    pub ephemeral_public_key: &'a PublicKey,
    /// Peer static public key, SEC1 encoded.
    pub peer_public_key: &'a [u8],
    /// Peer ephemeral public key, SEC1 encoded.
    pub peer_ephemeral_public_key: &'a [u8],
    /// Local identity; empty selects the default identity.
    pub id: &'a [u8],
    /// Peer identity; empty selects the default identity.
    pub peer_id: &'a [u8],
    /// Local role.
    pub role: Role,
}

/// Shared key plus key confirmation tags.
pub struct ConfirmedSharedKey {
    /// Derived key material.
    pub key: Zeroizing<Vec<u8>>,
    /// Tag to send to the peer.
    pub own_tag: Hash,
    /// Tag expected from the peer.
    pub peer_tag: Hash,
}

impl ConfirmedSharedKey {
    /// Constant-time check of the tag received from the peer.
    pub fn confirm_peer(&self, received: &[u8]) -> bool {
        self.peer_tag.as_slice().ct_eq(received).into()
    }
}

impl core::fmt::Debug for ConfirmedSharedKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConfirmedSharedKey")
            .field("key_len", &self.key.len())
            .finish_non_exhaustive()
    }
}

/// Per-exchange intermediate values shared by both outputs.
struct Agreement {
    xu: Zeroizing<[u8; 32]>,
    yu: Zeroizing<[u8; 32]>,
    z_init: Hash,
    z_resp: Hash,
    r_init: [u8; 64],
    r_resp: [u8; 64],
}

impl Sm2Context {
    /// Derive `klen` bytes of shared key material.
    pub fn calculate_shared_key(
        &self,
        session: &SharedSecretSession<'_>,
        klen: usize,
    ) -> Result<Zeroizing<Vec<u8>>> {
        if klen == 0 {
            return Err(Error::InvalidParameter);
        }

        let agreement = self.agree(session)?;
        agreement.derive_key(klen)
    }

    /// Derive `klen` bytes of shared key material together with the key
    /// confirmation tags for the local role.
    pub fn calculate_shared_key_with_confirmation(
        &self,
        session: &SharedSecretSession<'_>,
        klen: usize,
    ) -> Result<ConfirmedSharedKey> {
        if klen == 0 {
            return Err(Error::InvalidParameter);
        }

        let agreement = self.agree(session)?;
        let key = agreement.derive_key(klen)?;

        // the responder's tag uses prefix 0x02, the initiator's 0x03
        let tag_b = agreement.tag(0x02);
        let tag_a = agreement.tag(0x03);
        let (own_tag, peer_tag) = match session.role {
            Role::Initiator => (tag_a, tag_b),
            Role::Responder => (tag_b, tag_a),
        };

        Ok(ConfirmedSharedKey {
            key,
            own_tag,
            peer_tag,
        })
    }

    fn agree(&self, session: &SharedSecretSession<'_>) -> Result<Agreement> {
        let peer_public = PublicKey::from_sec1_bytes(session.peer_public_key)
            .map_err(|_| Error::InvalidPeerKey)?;
        let peer_ephemeral = PublicKey::from_sec1_bytes(session.peer_ephemeral_public_key)
            .map_err(|_| Error::InvalidPeerKey)?;

        if self.derive_public_key(session.private_key)? != *session.public_key
            || self.derive_public_key(session.ephemeral_private_key)?
                != *session.ephemeral_public_key
        {
            return Err(Error::InvalidKey);
        }

        let z_own = hash_z(session.id, session.public_key.as_affine())?;
        let z_peer = hash_z(session.peer_id, peer_public.as_affine())?;

        // A4, A5: tA = (dA + x̄1 · rA) mod n
        let x1_bar = x_bar(session.ephemeral_public_key.as_affine());
        let t = Zeroizing::new(
            session.private_key.as_scalar()
                + &(x1_bar * session.ephemeral_private_key.as_scalar()),
        );

        // A6, A7: U = [h · tA](PB + [x̄2]RB), h = 1
        let x2_bar = x_bar(peer_ephemeral.as_affine());
        let sum = self.mul_point(peer_ephemeral.as_affine(), &x2_bar)
            + peer_public.as_affine();
        let u = sum.mul(&t).to_affine();
        if bool::from(u.is_identity()) {
            return Err(Error::DegenerateResult);
        }

        let own_r = session.ephemeral_public_key.as_affine().to_raw_bytes();
        let peer_r = peer_ephemeral.as_affine().to_raw_bytes();
        let (z_init, z_resp, r_init, r_resp) = match session.role {
            Role::Initiator => (z_own, z_peer, own_r, peer_r),
            Role::Responder => (z_peer, z_own, peer_r, own_r),
        };

        debug!("key agreement completed as {:?}", session.role);

        Ok(Agreement {
            xu: Zeroizing::new(u.x_bytes()),
            yu: Zeroizing::new(u.y_bytes()),
            z_init,
            z_resp,
            r_init,
            r_resp,
        })
    }
}

impl Agreement {
    /// A8: K = KDF(xU || yU || ZA || ZB, klen)
    fn derive_key(&self, klen: usize) -> Result<Zeroizing<Vec<u8>>> {
        let mut key = Zeroizing::new(vec![0u8; klen]);
        gm_symm::kdf_into(
            &[
                self.xu.as_slice(),
                self.yu.as_slice(),
                self.z_init.as_slice(),
                self.z_resp.as_slice(),
            ],
            &mut key,
        )?;
        Ok(key)
    }

    /// Hash(prefix || yU || Hash(xU || ZA || ZB || x1 || y1 || x2 || y2))
    fn tag(&self, prefix: u8) -> Hash {
        let inner = Sm3::new()
            .chain_update(self.xu.as_slice())
            .chain_update(self.z_init)
            .chain_update(self.z_resp)
            .chain_update(self.r_init)
            .chain_update(self.r_resp)
            .finalize();

        Sm3::new()
            .chain_update([prefix])
            .chain_update(self.yu.as_slice())
            .chain_update(inner)
            .finalize()
            .into()
    }
}

/// `x̄ = 2^w + (x mod 2^w)` with `w = 127`.
fn x_bar(point: &AffinePoint) -> Scalar {
    let x = point.x_bytes();
    let mut bytes = [0u8; 32];
    bytes[16] = (x[16] & 0x7f) | 0x80;
    bytes[17..].copy_from_slice(&x[17..]);
    Scalar::reduce_bytes(&bytes)
}
