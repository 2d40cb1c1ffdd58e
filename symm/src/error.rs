//! Error types.

/// Result type with the `gm-symm` crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors produced by the SM3/SM4 primitives.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// Empty, oversized or otherwise out-of-range input.
    #[error("invalid parameter")]
    InvalidParameter,

    /// Key is not 128 bits.
    #[error("invalid key length")]
    InvalidKeyLength,

    /// IV or nonce has the wrong size for the selected mode.
    #[error("invalid IV length")]
    InvalidIvLength,

    /// GCM tag length is not one of 4, 8 or 12..=16 bytes.
    #[error("invalid tag length")]
    InvalidTagLength,

    /// PKCS#7 padding did not verify after decryption.
    #[error("invalid padding")]
    InvalidPadding,

    /// Authentication tag or MAC mismatch.
    #[error("integrity check failed")]
    IntegrityCheckFailed,

    /// Caller-provided output is too small.
    #[error("buffer too small: {required} bytes required, {capacity} available")]
    BufferTooSmall {
        /// Bytes needed to hold the output.
        required: usize,
        /// Bytes available in the caller's buffer.
        capacity: usize,
    },
}

impl Error {
    /// Stable numeric status for this error. Success is `0`.
    pub fn code(&self) -> i32 {
        match self {
            Error::InvalidParameter => 1,
            Error::BufferTooSmall { .. } => 2,
            Error::InvalidKeyLength => 3,
            Error::InvalidIvLength => 4,
            Error::InvalidTagLength => 5,
            Error::InvalidPadding => 6,
            Error::IntegrityCheckFailed => 7,
        }
    }
}
