//! Error types.

/// Result type with the `gm-cert` crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors produced by the certificate layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No certificate with this id is in the store.
    #[error("certificate not found: {0}")]
    CertificateNotFound(String),

    /// A signature in the chain did not verify, an issuer is missing from
    /// the store or the chain is longer than the configured depth.
    #[error("certificate chain verification failed")]
    ChainVerificationFailed,

    /// Malformed DER or PEM, or an unexpected algorithm or label.
    #[error("encoding error")]
    EncodingError,

    /// Missing or out-of-range input.
    #[error("invalid parameter")]
    InvalidParameter,

    /// Store directory access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by the SM2 engine.
    #[error(transparent)]
    Sm2(#[from] gm_sm2::Error),
}

impl Error {
    /// Stable numeric status for this error. Success is `0`.
    ///
    /// Engine errors keep their own codes.
    pub fn code(&self) -> i32 {
        match self {
            Error::InvalidParameter => 1,
            Error::CertificateNotFound(_) => 7,
            Error::ChainVerificationFailed => 8,
            Error::EncodingError => 9,
            Error::Io(_) => 15,
            Error::Sm2(e) => e.code(),
        }
    }
}

/// Render a result as a C-style status: `0` on success, otherwise
/// [`Error::code`].
pub fn status_code<T>(result: &Result<T>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(e) => e.code(),
    }
}

impl From<der::Error> for Error {
    fn from(err: der::Error) -> Error {
        log::debug!("DER error: {err}");
        Error::EncodingError
    }
}

impl From<pem_rfc7468::Error> for Error {
    fn from(err: pem_rfc7468::Error) -> Error {
        log::debug!("PEM error: {err}");
        Error::EncodingError
    }
}

impl From<spki::Error> for Error {
    fn from(err: spki::Error) -> Error {
        log::debug!("SPKI error: {err}");
        Error::EncodingError
    }
}

impl From<pkcs8::Error> for Error {
    fn from(err: pkcs8::Error) -> Error {
        log::debug!("PKCS#8 error: {err}");
        Error::EncodingError
    }
}

impl From<sec1::Error> for Error {
    fn from(err: sec1::Error) -> Error {
        log::debug!("SEC1 error: {err}");
        Error::EncodingError
    }
}
