use crate::crypto::HashAlg;
use crate::crypto::curves::Curve;
use crate::crypto::errors::{CryptoResult, Error};
use std::fmt;

/// Signature algorithms understood by [`crate::crypto::verify`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureScheme {
    /// RSA PKCS#1 v1.5 with the given digest (`ssh-rsa`, `rsa-sha2-256`,
    /// `rsa-sha2-512`)
    Rsa(HashAlg),
    /// ECDSA over a NIST curve
    Ecdsa(Curve),
    /// Ed25519
    Ed25519,
}

impl SignatureScheme {
    /// Name written in the signature blob
    pub fn name(&self) -> &'static str {
        match self {
            SignatureScheme::Rsa(HashAlg::Sha256) => "rsa-sha2-256",
            SignatureScheme::Rsa(HashAlg::Sha512) => "rsa-sha2-512",
            SignatureScheme::Rsa(_) => "ssh-rsa",
            SignatureScheme::Ecdsa(curve) => curve.ssh_algorithm(),
            SignatureScheme::Ed25519 => "ssh-ed25519",
        }
    }

    /// Name of the key type that produces this kind of signature
    pub fn key_algorithm(&self) -> &'static str {
        match self {
            SignatureScheme::Rsa(_) => "ssh-rsa",
            SignatureScheme::Ecdsa(curve) => curve.ssh_algorithm(),
            SignatureScheme::Ed25519 => "ssh-ed25519",
        }
    }

    /// Parse a signature algorithm name
    pub fn from_name(name: impl AsRef<[u8]>) -> CryptoResult<Self> {
        match name.as_ref() {
            b"ssh-rsa" => Ok(SignatureScheme::Rsa(HashAlg::Sha1)),
            b"rsa-sha2-256" => Ok(SignatureScheme::Rsa(HashAlg::Sha256)),
            b"rsa-sha2-512" => Ok(SignatureScheme::Rsa(HashAlg::Sha512)),
            b"ssh-ed25519" => Ok(SignatureScheme::Ed25519),
            other => Curve::all()
                .iter()
                .find(|curve| curve.ssh_algorithm().as_bytes() == other)
                .map(|&curve| SignatureScheme::Ecdsa(curve))
                .ok_or_else(|| {
                    Error::UnsupportedAlgorithm(String::from_utf8_lossy(other).into_owned())
                }),
        }
    }
}

impl fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
