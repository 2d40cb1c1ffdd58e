//! In-memory certificate store, optionally mirrored to `<id>.der` files.

use crate::{Error, Result, asn1::Certificate};
use der::Decode;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

const EXTENSION: &str = "der";

/// Certificates keyed by the lowercase hex SM3 digest of their DER.
#[derive(Debug, Default)]
pub struct CertStore {
    certs: BTreeMap<String, Vec<u8>>,
    dir: Option<PathBuf>,
}

/// Identifier of a DER certificate.
pub fn certificate_id(der: &[u8]) -> String {
    hex::encode(gm_symm::hash(der))
}

impl CertStore {
    /// Empty store with no backing directory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open `dir`, creating it if missing, and index every `*.der` file in
    /// it. Files that do not parse as certificates are skipped.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut certs = BTreeMap::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_none_or(|ext| ext != EXTENSION) {
                continue;
            }
            let der = fs::read(&path)?;
            if Certificate::from_der(&der).is_err() {
                log::warn!("skipping unparsable certificate file {}", path.display());
                continue;
            }
            certs.insert(certificate_id(&der), der);
        }

        log::debug!("opened certificate store {} with {} entries", dir.display(), certs.len());
        Ok(Self {
            certs,
            dir: Some(dir.to_owned()),
        })
    }

    /// Backing directory, if any.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Add a certificate and return its id. Importing the same DER twice
    /// yields the same id.
    pub fn insert(&mut self, der: &[u8]) -> Result<String> {
        Certificate::from_der(der)?;
        let id = certificate_id(der);
        if let Some(dir) = &self.dir {
            fs::write(file_path(dir, &id), der)?;
        }
        self.certs.insert(id.clone(), der.to_vec());
        Ok(id)
    }

    /// DER of certificate `id`.
    pub fn get(&self, id: &str) -> Result<&[u8]> {
        self.certs
            .get(id)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::CertificateNotFound(id.to_owned()))
    }

    /// Remove certificate `id` and its file. The entry stays indexed when
    /// the file cannot be deleted.
    pub fn remove(&mut self, id: &str) -> Result<()> {
        if !self.certs.contains_key(id) {
            return Err(Error::CertificateNotFound(id.to_owned()));
        }
        if let Some(dir) = &self.dir {
            let path = file_path(dir, id);
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    log::warn!("cannot delete certificate file {}: {e}", path.display());
                    return Err(e.into());
                }
            }
        }
        self.certs.remove(id);
        Ok(())
    }

    /// Ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.certs.keys().map(String::as_str)
    }

    /// Stored certificates as `(id, der)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.certs.iter().map(|(id, der)| (id.as_str(), der.as_slice()))
    }

    /// Number of stored certificates.
    pub fn len(&self) -> usize {
        self.certs.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }
}

fn file_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{id}.{EXTENSION}"))
}
