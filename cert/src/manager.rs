//! The certificate manager: request generation, issuance, the store and
//! chain verification behind one handle.

use crate::{
    Error, Result,
    asn1::{self, Certificate},
    csr::{self, CsrParams},
    issue::{self, CertUsage, IssueRequest},
    items::{self, CertItem, CertItemValue},
    keys,
    name::{COMMON_NAME, DESCRIPTION},
    signing,
    store::CertStore,
};
use der::Decode;
use gm_sm2::{DEFAULT_ID, PrivateKey, PublicKey, Sm2Context};
use std::{
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

/// Default bound on the number of certificates in a verified chain.
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 10;

/// [`CertManager`] settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CertManagerConfig {
    directory: Option<PathBuf>,
    distid: Vec<u8>,
    max_chain_depth: usize,
}

impl Default for CertManagerConfig {
    fn default() -> Self {
        Self {
            directory: None,
            distid: DEFAULT_ID.to_vec(),
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
        }
    }
}

impl CertManagerConfig {
    /// In-memory store, default distinguishing id and chain depth.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror the store to `dir`.
    pub fn directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directory = Some(dir.into());
        self
    }

    /// Distinguishing identifier for request and certificate signatures.
    pub fn distid(mut self, distid: impl Into<Vec<u8>>) -> Self {
        self.distid = distid.into();
        self
    }

    /// Maximum number of certificates [`CertManager::verify_chain`] walks.
    pub fn max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = depth;
        self
    }
}

/// Certificate management handle. Owns its SM2 context and store.
pub struct CertManager {
    config: CertManagerConfig,
    ctx: Sm2Context,
    store: CertStore,
}

impl CertManager {
    /// Create a manager with a fresh SM2 context.
    pub fn init(config: CertManagerConfig) -> Result<Self> {
        Self::with_context(config, Sm2Context::new()?)
    }

    /// Create a manager around an existing context.
    pub fn with_context(config: CertManagerConfig, ctx: Sm2Context) -> Result<Self> {
        if config.max_chain_depth == 0 || config.distid.len() > gm_sm2::MAX_ID_LEN {
            return Err(Error::InvalidParameter);
        }
        let store = match &config.directory {
            Some(dir) => CertStore::open(dir)?,
            None => CertStore::in_memory(),
        };
        Ok(Self { config, ctx, store })
    }

    /// Active settings.
    pub fn config(&self) -> &CertManagerConfig {
        &self.config
    }

    /// Store directory, if any.
    pub fn directory(&self) -> Option<&Path> {
        self.store.dir()
    }

    /// The SM2 context used for signing and verification.
    pub fn context_mut(&mut self) -> &mut Sm2Context {
        &mut self.ctx
    }

    /// Build a signed DER PKCS#10 request.
    pub fn generate_csr(&mut self, params: &CsrParams<'_>) -> Result<Vec<u8>> {
        let der = csr::build(&mut self.ctx, params, &self.config.distid)?;
        log::debug!("generated {:?} certificate request", params.mode);
        Ok(der)
    }

    /// Verify a DER request's self-signature and return its key.
    pub fn verify_csr(&self, der: &[u8]) -> Result<PublicKey> {
        csr::verify(&self.ctx, der, &csr::parse(der)?, &self.config.distid)
    }

    /// Issue a certificate for `csr`.
    ///
    /// With `ca_cert == None` the certificate is self-signed and `ca_key`
    /// must be the requested key; otherwise `ca_key` must match `ca_cert`.
    pub fn generate_certificate(
        &mut self,
        csr: &[u8],
        ca_cert: Option<&[u8]>,
        serial: &str,
        ca_key: &PrivateKey,
        valid_days: u32,
        usage: CertUsage,
    ) -> Result<Vec<u8>> {
        let req = IssueRequest {
            csr,
            ca_cert,
            serial,
            ca_key,
            valid_days,
            usage,
            extra_subject: &[],
        };
        self.issue(&req)
    }

    /// Item-based issuance. [`CertItem::Csr`], [`CertItem::Serial`],
    /// [`CertItem::PrivateKey`] and [`CertItem::ValidDays`] are required;
    /// usage defaults to [`CertUsage::Both`]. Subject items are appended to
    /// the request subject even when the attribute is already present.
    pub fn generate_certificate2(&mut self, items: &[CertItem]) -> Result<Vec<u8>> {
        let mut csr = None;
        let mut serial = None;
        let mut private_key = None;
        let mut valid_days = None;
        let mut usage = CertUsage::default();
        let mut ca_cert = None;
        let mut extra_subject = Vec::new();

        for item in items {
            match item {
                CertItem::Csr(der) => csr = Some(der.as_slice()),
                CertItem::Serial(hex) => serial = Some(hex.as_str()),
                CertItem::PrivateKey(hex) => private_key = Some(hex.as_str()),
                CertItem::ValidDays(days) => valid_days = Some(*days),
                CertItem::Usage(u) => usage = *u,
                CertItem::CaCert(der) => ca_cert = Some(der.as_slice()),
                CertItem::SubjectAttribute(oid, value) => extra_subject.push((*oid, value.clone())),
                CertItem::Description(value) => extra_subject.push((DESCRIPTION, value.clone())),
                CertItem::CommonName(value) => extra_subject.push((COMMON_NAME, value.clone())),
            }
        }

        let (Some(csr), Some(serial), Some(private_key), Some(valid_days)) =
            (csr, serial, private_key, valid_days)
        else {
            log::debug!("item-based issuance is missing a required item");
            return Err(Error::InvalidParameter);
        };
        let ca_key = PrivateKey::from_hex(private_key)?;

        let req = IssueRequest {
            csr,
            ca_cert,
            serial,
            ca_key: &ca_key,
            valid_days,
            usage,
            extra_subject: &extra_subject,
        };
        self.issue(&req)
    }

    fn issue(&mut self, req: &IssueRequest<'_>) -> Result<Vec<u8>> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| Error::InvalidParameter)?
            .as_secs();
        let der = issue::issue(&mut self.ctx, req, &self.config.distid, now)?;
        log::debug!(
            "issued {} certificate, serial {}",
            if req.ca_cert.is_some() { "CA-signed" } else { "self-signed" },
            req.serial
        );
        Ok(der)
    }

    /// Add a DER certificate to the store and return its id.
    pub fn import_certificate(&mut self, der: &[u8]) -> Result<String> {
        let id = self.store.insert(der)?;
        log::debug!("imported certificate {id}");
        Ok(id)
    }

    /// DER of certificate `id`.
    pub fn export_certificate(&self, id: &str) -> Result<Vec<u8>> {
        Ok(self.store.get(id)?.to_vec())
    }

    /// Remove certificate `id`.
    pub fn delete_certificate(&mut self, id: &str) -> Result<()> {
        self.store.remove(id)?;
        log::debug!("deleted certificate {id}");
        Ok(())
    }

    /// Ids of all stored certificates.
    pub fn ids(&self) -> Vec<String> {
        self.store.ids().map(str::to_owned).collect()
    }

    /// Public key of certificate `id`.
    pub fn read_public_key(&self, id: &str) -> Result<PublicKey> {
        let cert = self.certificate(id)?;
        keys::from_spki(&cert.tbs_certificate.subject_public_key_info)
    }

    /// `(notBefore, notAfter)` of certificate `id` as Unix seconds.
    pub fn read_validity(&self, id: &str) -> Result<(u64, u64)> {
        let validity = self.certificate(id)?.tbs_certificate.validity;
        Ok((validity.not_before.to_unix_secs(), validity.not_after.to_unix_secs()))
    }

    /// Whether certificate `id` names itself as issuer.
    pub fn is_root(&self, id: &str) -> Result<bool> {
        let tbs = self.certificate(id)?.tbs_certificate;
        Ok(tbs.issuer == tbs.subject)
    }

    /// Read item `item_id` from a DER certificate.
    pub fn certificate_item(&self, der: &[u8], item_id: u32) -> Result<CertItemValue> {
        items::certificate_item(der, item_id)
    }

    /// Verify the signatures from certificate `id` up to a self-signed root,
    /// finding each issuer in the store by subject name.
    ///
    /// Validity windows and revocation are not checked.
    pub fn verify_chain(&self, id: &str) -> Result<()> {
        let mut der = self.store.get(id)?;
        let mut current = Certificate::from_der(der)?;

        for depth in 1..=self.config.max_chain_depth {
            let tbs = &current.tbs_certificate;
            if tbs.issuer == tbs.subject {
                let key = keys::from_spki(&tbs.subject_public_key_info)?;
                if self.signed_by(der, &current, &key)? {
                    log::debug!("chain for {id} verified at depth {depth}");
                    return Ok(());
                }
                log::debug!("root signature in chain for {id} did not verify");
                return Err(Error::ChainVerificationFailed);
            }

            (der, current) = self.find_issuer(der, &current)?.ok_or_else(|| {
                log::debug!("no issuer in store for certificate at depth {depth} of {id}");
                Error::ChainVerificationFailed
            })?;
        }

        log::debug!("chain for {id} exceeds {} certificates", self.config.max_chain_depth);
        Err(Error::ChainVerificationFailed)
    }

    /// A stored certificate whose subject is `cert`'s issuer and whose key
    /// verifies `cert`'s signature.
    fn find_issuer(&self, der: &[u8], cert: &Certificate) -> Result<Option<(&[u8], Certificate)>> {
        for (_, candidate_der) in self.store.iter() {
            let Ok(candidate) = Certificate::from_der(candidate_der) else {
                continue;
            };
            if candidate.tbs_certificate.subject != cert.tbs_certificate.issuer {
                continue;
            }
            let Ok(key) = keys::from_spki(&candidate.tbs_certificate.subject_public_key_info)
            else {
                continue;
            };
            if self.signed_by(der, cert, &key)? {
                return Ok(Some((candidate_der, candidate)));
            }
        }
        Ok(None)
    }

    /// Check `cert`'s signature over its TBS bytes as encoded in `der`.
    fn signed_by(&self, der: &[u8], cert: &Certificate, issuer_key: &PublicKey) -> Result<bool> {
        let tbs = asn1::signed_portion(der)?;
        signing::verify(
            &self.ctx,
            tbs,
            &cert.signature_algorithm,
            &cert.signature,
            &self.config.distid,
            issuer_key,
        )
    }

    fn certificate(&self, id: &str) -> Result<Certificate> {
        Ok(Certificate::from_der(self.store.get(id)?)?)
    }
}
