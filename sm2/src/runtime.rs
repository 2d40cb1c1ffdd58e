//! One-time engine setup.
//!
//! [`Runtime::init`] runs the curve self-tests once and then hands out
//! [`Sm2Context`] values:
//!
//! - the base point satisfies the curve equation
//! - `n·G` is the identity
//! - a known private key derives its published public key
//! - a freshly generated key pair signs and verifies

use crate::{
    AffinePoint, ContextConfig, Error, PrivateKey, ProjectivePoint, Result, Scalar, SignMode,
    Sm2Context,
};
use core::sync::atomic::{AtomicU64, Ordering};
use log::{debug, error};

/// GM/T 0003.5 sample private key.
const KAT_PRIVATE_KEY: &str = "3945208F7B2144B13F36E38AC6D39F95889393692860B51A42FB81EF4DF7C5B8";

/// Public key for [`KAT_PRIVATE_KEY`].
const KAT_PUBLIC_KEY: &str = "0409F9DF311E5421A150DD7D161E4BC5C672179FAD1833FC076BB08FF356F35020\
                              CCEA490CE26775A52DC6EA718CC1AA600AED05FBF35E084A6632F6072DA9AD13";

/// Self-tested factory for SM2 contexts.
#[derive(Debug)]
pub struct Runtime {
    config: ContextConfig,
    issued: AtomicU64,
}

impl Runtime {
    /// Run the self-tests with the default context configuration.
    pub fn init() -> Result<Self> {
        Self::with_config(ContextConfig::default())
    }

    /// Run the self-tests; contexts are later created from `config`.
    pub fn with_config(config: ContextConfig) -> Result<Self> {
        let runtime = Self {
            config,
            issued: AtomicU64::new(0),
        };

        if let Err(e) = runtime.self_test() {
            error!("SM2 self-test failed: {e}");
            return Err(Error::SelfTestFailed);
        }

        debug!("SM2 runtime initialized");
        Ok(runtime)
    }

    /// Create a new context.
    ///
    /// When the configuration carries a fixed seed, each context receives a
    /// distinct seed derived from it.
    pub fn new_context(&self) -> Result<Sm2Context> {
        let index = self.issued.fetch_add(1, Ordering::Relaxed);
        match self.config.seed_bytes() {
            Some(seed) => {
                let derived = gm_symm::hash::hash_parts(&[seed.as_slice(), &index.to_be_bytes()]);
                Sm2Context::with_config(&self.config.clone().seed(derived))
            }
            None => Sm2Context::with_config(&self.config),
        }
    }

    fn self_test(&self) -> Result<()> {
        if !bool::from(AffinePoint::GENERATOR.is_on_curve()) {
            return Err(Error::SelfTestFailed);
        }

        // (n - 1)·G + G = n·G
        let n_g = ProjectivePoint::GENERATOR.mul(&-Scalar::ONE) + ProjectivePoint::GENERATOR;
        if !bool::from(n_g.is_identity()) {
            return Err(Error::SelfTestFailed);
        }

        let mut ctx = self.new_context()?;

        let kat_key = PrivateKey::from_hex(KAT_PRIVATE_KEY)?;
        if ctx.derive_public_key(&kat_key)?.to_hex() != KAT_PUBLIC_KEY {
            return Err(Error::SelfTestFailed);
        }

        let key_pair = ctx.generate_key_pair()?;
        let msg = b"\x01\x02\x03\x04";
        let sig = ctx.sign(
            msg,
            b"",
            key_pair.public_key(),
            key_pair.private_key(),
            SignMode::RsAsn1,
        )?;
        if !ctx.verify(msg, b"", &sig, key_pair.public_key(), SignMode::RsAsn1)? {
            return Err(Error::SelfTestFailed);
        }

        Ok(())
    }
}
