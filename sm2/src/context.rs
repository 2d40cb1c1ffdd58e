//! Per-caller SM2 engine state.

use crate::{
    AffinePoint, Error, PrecomputedTable, ProjectivePoint, PublicKey, Result, Scalar,
    arithmetic::{CURVE, CurveParams},
};
use log::{debug, trace};
use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};
use std::collections::HashSet;
use zeroize::{Zeroize, Zeroizing};

/// Options for [`Sm2Context::with_config`].
#[derive(Clone, Debug)]
pub struct ContextConfig {
    precompute_generator: bool,
    seed: Option<Zeroizing<[u8; 32]>>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            precompute_generator: cfg!(feature = "precomputed-tables"),
            seed: None,
        }
    }
}

impl ContextConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the generator table when the context is created.
    pub fn precompute_generator(mut self, enabled: bool) -> Self {
        self.precompute_generator = enabled;
        self
    }

    /// Seed the context RNG with a fixed value instead of the OS.
    ///
    /// Only for reproducible tests: two contexts with the same seed draw the
    /// same nonces.
    pub fn seed(mut self, seed: [u8; 32]) -> Self {
        self.seed = Some(Zeroizing::new(seed));
        self
    }

    pub(crate) fn seed_bytes(&self) -> Option<&[u8; 32]> {
        self.seed.as_deref()
    }
}

/// SM2 engine context.
///
/// Owns the generator table, an optional table for one bound public key, a
/// ChaCha20 CSPRNG and an optional one-shot signing nonce. A context is not
/// synchronized; every operation that draws randomness takes `&mut self`.
pub struct Sm2Context {
    curve: &'static CurveParams,
    generator_table: Option<PrecomputedTable>,
    bound_table: Option<PrecomputedTable>,
    rng: ChaCha20Rng,
    external_nonce: Option<Zeroizing<[u8; 32]>>,
    used_nonces: HashSet<[u8; 32]>,
}

impl Sm2Context {
    /// Create a context with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(&ContextConfig::default())
    }

    /// Create a context from `config`.
    pub fn with_config(config: &ContextConfig) -> Result<Self> {
        let rng = match config.seed_bytes() {
            Some(seed) => ChaCha20Rng::from_seed(*seed),
            None => os_seeded_rng()?,
        };

        let generator_table = config
            .precompute_generator
            .then(|| PrecomputedTable::new(&AffinePoint::GENERATOR));

        debug!(
            "created SM2 context (generator table: {})",
            generator_table.is_some()
        );

        Ok(Self {
            curve: &CURVE,
            generator_table,
            bound_table: None,
            rng,
            external_nonce: None,
            used_nonces: HashSet::new(),
        })
    }

    /// Curve parameters this context operates on.
    pub fn curve(&self) -> &'static CurveParams {
        self.curve
    }

    /// Build the generator table if it was not built at creation.
    pub fn precompute_generator(&mut self) {
        if self.generator_table.is_none() {
            self.generator_table = Some(PrecomputedTable::new(&AffinePoint::GENERATOR));
            debug!("built generator table");
        }
    }

    /// Build a precomputation table for `public_key`, replacing any previous
    /// binding. Operations against other keys are unaffected.
    pub fn bind_public_key(&mut self, public_key: &PublicKey) {
        if self
            .bound_table
            .as_ref()
            .is_some_and(|table| table.matches(public_key.as_affine()))
        {
            return;
        }

        self.bound_table = Some(PrecomputedTable::new(public_key.as_affine()));
        debug!("bound public key {}", public_key.to_hex());
    }

    /// The currently bound public key, if any.
    pub fn bound_public_key(&self) -> Option<PublicKey> {
        self.bound_table
            .as_ref()
            .and_then(|table| PublicKey::from_affine(*table.point()).ok())
    }

    /// Install a 32-byte nonce to be used by the next signing call.
    ///
    /// The value must be in `[1, n-1]` and must not have been consumed by an
    /// earlier signature from this context.
    ///
    /// Every consumed nonce is remembered as its 32-byte SM3 digest for the
    /// lifetime of the context, with no eviction, so memory grows by one
    /// entry per externally-nonced signature. Long-lived contexts that sign
    /// with external nonces indefinitely should be replaced periodically.
    pub fn set_external_nonce(&mut self, nonce: &[u8]) -> Result<()> {
        let bytes: &[u8; 32] = nonce.try_into().map_err(|_| Error::InvalidParameter)?;
        if Scalar::from_bytes_nonzero(bytes).is_none() {
            return Err(Error::InvalidParameter);
        }
        if self.used_nonces.contains(&gm_symm::hash(bytes)) {
            return Err(Error::NonceReuse);
        }

        self.external_nonce = Some(Zeroizing::new(*bytes));
        Ok(())
    }

    /// Is an unconsumed external nonce installed?
    pub fn has_valid_external_nonce(&self) -> bool {
        self.external_nonce.is_some()
    }

    /// Mix caller entropy into the RNG: `seed' = SM3(rng output || entropy)`.
    pub fn reseed(&mut self, entropy: &[u8]) -> Result<()> {
        if entropy.is_empty() {
            return Err(Error::InvalidParameter);
        }

        let mut state = Zeroizing::new([0u8; 32]);
        self.rng.fill_bytes(state.as_mut_slice());
        let seed = Zeroizing::new(gm_symm::hash::hash_parts(&[state.as_slice(), entropy]));
        self.rng = ChaCha20Rng::from_seed(*seed);

        debug!("reseeded context RNG with {} bytes", entropy.len());
        Ok(())
    }

    /// Take the external nonce, recording it as used.
    pub(crate) fn take_external_nonce(&mut self) -> Option<Scalar> {
        let nonce = self.external_nonce.take()?;
        self.used_nonces.insert(gm_symm::hash(nonce.as_slice()));
        Scalar::from_bytes_nonzero(&nonce)
    }

    /// Rejection-sample a scalar in `[1, n-1]`.
    pub(crate) fn random_scalar(&mut self) -> Scalar {
        let mut bytes = Zeroizing::new([0u8; 32]);
        loop {
            self.rng.fill_bytes(bytes.as_mut_slice());
            if let Some(k) = Scalar::from_bytes_nonzero(&bytes) {
                return k;
            }
            trace!("scalar draw out of range, retrying");
        }
    }

    /// `[k] G`.
    pub(crate) fn mul_generator(&self, k: &Scalar) -> ProjectivePoint {
        match &self.generator_table {
            Some(table) => table.mul(k),
            None => ProjectivePoint::GENERATOR.mul(k),
        }
    }

    /// `[k] P`, using the bound table when `P` is the bound key.
    pub(crate) fn mul_point(&self, point: &AffinePoint, k: &Scalar) -> ProjectivePoint {
        match &self.bound_table {
            Some(table) if table.matches(point) => table.mul(k),
            _ => ProjectivePoint::from(point).mul(k),
        }
    }
}

impl Drop for Sm2Context {
    fn drop(&mut self) {
        self.external_nonce.zeroize();
        self.used_nonces.clear();
        self.rng = ChaCha20Rng::from_seed([0u8; 32]);
    }
}

impl core::fmt::Debug for Sm2Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Sm2Context")
            .field("generator_table", &self.generator_table.is_some())
            .field("bound_table", &self.bound_table)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "getrandom")]
fn os_seeded_rng() -> Result<ChaCha20Rng> {
    ChaCha20Rng::from_rng(rand_core::OsRng).map_err(|_| Error::Rng)
}

#[cfg(not(feature = "getrandom"))]
fn os_seeded_rng() -> Result<ChaCha20Rng> {
    Err(Error::Rng)
}
