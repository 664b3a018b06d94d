mod curves;
pub mod ecdsa;
pub mod ed25519;
mod errors;
mod keys;
pub mod rsa;
mod scheme;

pub use curves::Curve;
pub use ecdsa::EcdsaKeyPair;
pub use ed25519::Ed25519KeyPair;
pub use errors::Error;
pub use keys::PublicKey;
pub use rsa::RsaKeyPair;
pub use scheme::SignatureScheme;

use crate::codec::{Reader, Writer};
use errors::CryptoResult;
use openssl::hash::MessageDigest as Digest;
use rand::RngCore;
use std::fmt;

/// Hash algorithms used by SSH signatures and key fingerprints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlg {
    /// SHA-1
    Sha1,
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl HashAlg {
    /// Hash the given data with this hash algorithm
    pub fn hash(&self, data: impl AsRef<[u8]>) -> Vec<u8> {
        let data = data.as_ref();
        match self {
            HashAlg::Sha1 => openssl::sha::sha1(data).to_vec(),
            HashAlg::Sha256 => openssl::sha::sha256(data).to_vec(),
            HashAlg::Sha384 => openssl::sha::sha384(data).to_vec(),
            HashAlg::Sha512 => openssl::sha::sha512(data).to_vec(),
        }
    }

    /// Get the output size in bytes
    pub fn output_size(self) -> usize {
        match self {
            HashAlg::Sha1 => 20,
            HashAlg::Sha256 => 32,
            HashAlg::Sha384 => 48,
            HashAlg::Sha512 => 64,
        }
    }
}

impl From<HashAlg> for Digest {
    fn from(hash_alg: HashAlg) -> Self {
        match hash_alg {
            HashAlg::Sha1 => Digest::sha1(),
            HashAlg::Sha256 => Digest::sha256(),
            HashAlg::Sha384 => Digest::sha384(),
            HashAlg::Sha512 => Digest::sha512(),
        }
    }
}

impl fmt::Display for HashAlg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HashAlg::Sha1 => "SHA-1",
            HashAlg::Sha256 => "SHA-256",
            HashAlg::Sha384 => "SHA-384",
            HashAlg::Sha512 => "SHA-512",
        };
        write!(f, "{name}")
    }
}

/// A private key able to produce SSH signature blobs.
///
/// `rng` is the caller's randomness source for randomized schemes.
/// Deterministic schemes (RSA PKCS#1 v1.5, Ed25519) ignore it.
pub trait SigningKey {
    /// The public half, as it is recorded next to the signature
    fn public_key(&self) -> &PublicKey;

    /// Sign `message` and return the encoded SSH signature blob
    /// (`string algorithm, string signature`)
    fn sign(&self, rng: &mut dyn RngCore, message: &[u8]) -> CryptoResult<Vec<u8>>;
}

/// Encode an SSH signature blob
pub(crate) fn encode_signature(
    scheme: SignatureScheme,
    signature: &[u8],
) -> CryptoResult<Vec<u8>> {
    let mut writer = Writer::new();
    writer.put_string(scheme.name()).put_string(signature);
    Ok(writer.finish()?)
}

/// Verify an SSH signature blob over `message` with `key`.
///
/// Returns `Ok(false)` when the signature is well formed but does not match.
pub fn verify(key: &PublicKey, message: &[u8], signature: &[u8]) -> CryptoResult<bool> {
    let mut reader = Reader::new(signature);
    let name = reader.read_string()?;
    let raw = reader.read_string()?;
    reader.finish()?;

    let scheme = SignatureScheme::from_name(name)?;
    if scheme.key_algorithm() != key.algorithm() {
        return Err(Error::Invalid(format!(
            "Signature algorithm {} cannot be produced by a {} key",
            scheme.name(),
            key.algorithm()
        )));
    }

    match scheme {
        SignatureScheme::Rsa(hash_alg) => rsa::verify(key, message, raw, hash_alg),
        SignatureScheme::Ecdsa(curve) => ecdsa::verify(key, message, raw, curve),
        SignatureScheme::Ed25519 => ed25519::verify(key, message, raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_hash_data() {
        let data = b"test_data";

        assert_eq!(HashAlg::Sha1.hash(data).len(), HashAlg::Sha1.output_size());
        assert_eq!(HashAlg::Sha256.hash(data).len(), HashAlg::Sha256.output_size());
        assert_eq!(HashAlg::Sha512.hash(data).len(), HashAlg::Sha512.output_size());
        assert_eq!(
            hex::encode(HashAlg::Sha1.hash(b"abc")),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_verify_rejects_mismatched_scheme() {
        let mut rng = StdRng::seed_from_u64(1);
        let ed = Ed25519KeyPair::generate().unwrap();
        let ecdsa = EcdsaKeyPair::generate(Curve::NistP256).unwrap();

        let signature = ed.sign(&mut rng, b"message").unwrap();
        assert!(verify(ecdsa.public_key(), b"message", &signature).is_err());
    }

    #[test]
    fn test_verify_rejects_trailing_signature_bytes() {
        let mut rng = StdRng::seed_from_u64(1);
        let key = Ed25519KeyPair::generate().unwrap();

        let mut signature = key.sign(&mut rng, b"message").unwrap();
        assert!(verify(key.public_key(), b"message", &signature).unwrap());

        signature.push(0);
        assert!(matches!(
            verify(key.public_key(), b"message", &signature),
            Err(Error::Wire(_))
        ));
    }

    #[test]
    fn test_verify_rejects_unknown_scheme() {
        let key = Ed25519KeyPair::generate().unwrap();
        let signature = {
            let mut writer = Writer::new();
            writer.put_string("ssh-dss").put_string([0u8; 40]);
            writer.finish().unwrap()
        };

        assert!(matches!(
            verify(key.public_key(), b"message", &signature),
            Err(Error::UnsupportedAlgorithm(_))
        ));
    }
}
