use thiserror::Error;

use crate::{codec, crypto};

/// Errors raised while parsing or serializing a KRL.
///
/// Every error is terminal: a document that fails to parse must be treated
/// as untrusted as a whole.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input does not start with the KRL magic")]
    BadMagic,

    #[error("Unsupported KRL format version {0}")]
    UnsupportedVersion(u32),

    /// Truncated input, a length prefix past the end, or a bounded blob with
    /// leftover bytes
    #[error(transparent)]
    Wire(#[from] codec::Error),

    #[error("Unknown section type 0x{0:02x}")]
    UnknownSectionType(u8),

    #[error("Unknown certificate subsection type 0x{0:02x}")]
    UnknownSubsectionType(u8),

    #[error("Section 0x{section_type:02x} has {remaining} undecoded bytes")]
    TrailingSectionBytes { section_type: u8, remaining: usize },

    #[error("Invalid serial range: {lo} > {hi}")]
    InvalidRange { lo: u64, hi: u64 },

    #[error("Fingerprint is {actual} bytes long, expected {expected}")]
    InvalidFingerprintLength { expected: usize, actual: usize },

    #[error("Invalid public key: {0}")]
    InvalidKey(#[source] crypto::Error),

    #[error("The {0} is not valid UTF-8")]
    InvalidString(&'static str),

    /// A signature section that ends before its key or signature blob does
    #[error("Incomplete signature section in the last {remaining} bytes")]
    UnexpectedTrailingBytes { remaining: usize },

    /// Bytes after the signatures that do not start another signature
    #[error("{remaining} bytes follow the signature trailer")]
    TrailingBytes { remaining: usize },

    #[error("Serial bitmap would span {span} serials, at most {max} are allowed")]
    BitmapTooWide { span: u64, max: u64 },

    #[error("KRL signature by {signer} is invalid")]
    InvalidSignature { signer: String },

    #[error("Signing with {signer} failed: {source}")]
    SigningFailure {
        signer: String,
        #[source]
        source: crypto::Error,
    },
}
