//! Error types.

/// Result type with the `gm-sm2` crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors produced by the SM2 engine.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// Empty, oversized or otherwise out-of-range input.
    #[error("invalid parameter")]
    InvalidParameter,

    /// Caller-provided output is too small. Nothing was written.
    #[error("buffer too small: {required} bytes required, {capacity} available")]
    BufferTooSmall {
        /// Bytes needed to hold the output.
        required: usize,
        /// Bytes available in the caller's buffer.
        capacity: usize,
    },

    /// Malformed or out-of-range scalar or point.
    #[error("invalid key")]
    InvalidKey,

    /// Decryption digest or authentication tag mismatch.
    #[error("integrity check failed")]
    IntegrityCheckFailed,

    /// A signature did not verify.
    #[error("signature invalid")]
    SignatureInvalid,

    /// The computation produced the identity point or a zero scalar.
    #[error("degenerate result")]
    DegenerateResult,

    /// Malformed DER, PEM or other encoding.
    #[error("encoding error")]
    EncodingError,

    /// Public key is not a valid non-identity curve point.
    #[error("invalid public key")]
    InvalidPublicKey,

    /// A peer-supplied point in the key exchange is invalid.
    #[error("invalid peer key")]
    InvalidPeerKey,

    /// The external nonce was already used by this context.
    #[error("external nonce already used")]
    NonceReuse,

    /// The random number generator could not be seeded.
    #[error("random number generator unavailable")]
    Rng,

    /// The curve self-test failed.
    #[error("self-test failed")]
    SelfTestFailed,
}

impl Error {
    /// Stable numeric status for this error. Success is `0`.
    ///
    /// Codes 7 and 8 belong to the certificate layer.
    pub fn code(&self) -> i32 {
        match self {
            Error::InvalidParameter => 1,
            Error::BufferTooSmall { .. } => 2,
            Error::InvalidKey => 3,
            Error::IntegrityCheckFailed => 4,
            Error::SignatureInvalid => 5,
            Error::DegenerateResult => 6,
            Error::EncodingError => 9,
            Error::InvalidPublicKey => 10,
            Error::InvalidPeerKey => 11,
            Error::NonceReuse => 12,
            Error::Rng => 13,
            Error::SelfTestFailed => 14,
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

impl From<gm_symm::Error> for Error {
    fn from(err: gm_symm::Error) -> Error {
        match err {
            gm_symm::Error::BufferTooSmall { required, capacity } => {
                Error::BufferTooSmall { required, capacity }
            }
            gm_symm::Error::IntegrityCheckFailed => Error::IntegrityCheckFailed,
            _ => Error::InvalidParameter,
        }
    }
}

impl From<der::Error> for Error {
    fn from(_: der::Error) -> Error {
        Error::EncodingError
    }
}

impl From<hex::FromHexError> for Error {
    fn from(_: hex::FromHexError) -> Error {
        Error::InvalidKey
    }
}

impl From<Error> for signature::Error {
    fn from(err: Error) -> signature::Error {
        signature::Error::from_source(err)
    }
}
