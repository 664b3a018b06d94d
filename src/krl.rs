//! OpenSSH Key Revocation Lists.
//!
//! A [`Krl`] is either built programmatically and turned into bytes with
//! [`Krl::serialize`], or read back with [`Krl::parse`]. Both directions
//! record the keys that signed the document in [`Krl::signing_keys`].
//! Queries go through [`Krl::is_revoked`] and [`Krl::is_key_revoked`].

mod errors;
mod parser;
mod revocation;
mod section;
mod serializer;

pub use errors::Error;
pub use revocation::CertificateInfo;
pub use section::{
    CertificateSection, CertificateSubsection, ExplicitKeySection, FingerprintSection, Section,
    SerialBitmap, SerialRange,
};

use crate::crypto::PublicKey;

pub(crate) type KrlResult<T> = Result<T, Error>;

/// `"SSHKRL\n\0"` read as a big-endian u64
pub const KRL_MAGIC: u64 = 0x5353_484b_524c_0a00;

/// The only format version defined so far
pub const KRL_FORMAT_VERSION: u32 = 1;

/// Wire tags of top-level sections
pub mod section_type {
    pub const CERTIFICATES: u8 = 0x01;
    pub const EXPLICIT_KEY: u8 = 0x02;
    pub const FINGERPRINT_SHA1: u8 = 0x03;
    pub const SIGNATURE: u8 = 0x04;
    pub const FINGERPRINT_SHA256: u8 = 0x05;
}

/// Wire tags of certificate subsections
pub mod subsection_type {
    pub const SERIAL_LIST: u8 = 0x20;
    pub const SERIAL_RANGE: u8 = 0x21;
    pub const SERIAL_BITMAP: u8 = 0x22;
    pub const KEY_ID: u8 = 0x23;
}

/// A key revocation list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Krl {
    /// Monotonic version of the list
    pub version: u64,
    /// Generation time in seconds since the Unix epoch (UTC)
    pub generated_date: u64,
    /// Reserved for future use, zero in every list seen so far
    pub flags: u64,
    pub comment: String,
    pub sections: Vec<Section>,
    signing_keys: Vec<PublicKey>,
}

impl Krl {
    /// An empty, unsigned list. The version starts out equal to the
    /// generation date.
    pub fn new(generated_date: u64) -> Self {
        Self {
            version: generated_date,
            generated_date,
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_section(mut self, section: impl Into<Section>) -> Self {
        self.sections.push(section.into());
        self
    }

    /// Keys whose signatures were verified by [`Krl::parse`], or the keys
    /// used by the last successful [`Krl::serialize`], in order
    pub fn signing_keys(&self) -> &[PublicKey] {
        &self.signing_keys
    }

    /// Whether `key` is among [`Krl::signing_keys`]
    pub fn is_signed_by(&self, key: &PublicKey) -> bool {
        self.signing_keys.contains(key)
    }
}
