use openssl::error::ErrorStack;
use thiserror::Error;

use crate::codec;

pub(crate) type CryptoResult<T> = Result<T, Error>;

/// Error type for key and signature operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid data format or corrupted data
    #[error("Invalid data: {0}")]
    Invalid(String),

    /// Key or signature algorithm this crate cannot handle
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Unsupported curve
    #[error("Unsupported curve: {0}")]
    UnsupportedCurve(String),

    /// Internal OpenSSL error
    #[error("OpenSSL error: {0}")]
    OpenSsl(#[from] ErrorStack),

    /// Malformed base64 in an OpenSSH key line
    #[error("Encoding error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Malformed SSH wire encoding inside a key or signature blob
    #[error("Malformed blob: {0}")]
    Wire(#[from] codec::Error),
}
