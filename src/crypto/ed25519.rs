use crate::codec::{Reader, Writer};
use crate::crypto::errors::{CryptoResult, Error};
use crate::crypto::keys::PublicKey;
use crate::crypto::{SignatureScheme, SigningKey, encode_signature};
use openssl::pkey::{Id, PKey, Private};
use openssl::sign::{Signer, Verifier};
use rand::RngCore;
use std::fmt;

const KEY_ALGORITHM: &str = "ssh-ed25519";
const PUBLIC_KEY_SIZE: usize = 32;
const SIGNATURE_SIZE: usize = 64;

/// Ed25519 signing key
#[derive(Clone)]
pub struct Ed25519KeyPair {
    key: PKey<Private>,
    public_key: PublicKey,
}

impl Ed25519KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> CryptoResult<Self> {
        Self::from_pkey(PKey::generate_ed25519()?)
    }

    /// Build the key pair from a 32-byte private seed
    pub fn from_seed(seed: &[u8; 32]) -> CryptoResult<Self> {
        Self::from_pkey(PKey::private_key_from_raw_bytes(seed, Id::ED25519)?)
    }

    /// Import key from PKCS#8 PEM format
    pub fn from_pem(pem_bytes: impl AsRef<[u8]>) -> CryptoResult<Self> {
        let pkey = PKey::private_key_from_pem(pem_bytes.as_ref())?;
        if pkey.id() != Id::ED25519 {
            return Err(Error::UnsupportedAlgorithm(format!("{:?}", pkey.id())));
        }
        Self::from_pkey(pkey)
    }

    fn from_pkey(key: PKey<Private>) -> CryptoResult<Self> {
        let mut writer = Writer::new();
        writer
            .put_string(KEY_ALGORITHM)
            .put_string(key.raw_public_key()?);
        let public_key = PublicKey::from_blob(writer.finish()?)?;
        Ok(Self { key, public_key })
    }

    /// Export key in PKCS#8 PEM format
    pub fn to_pem(&self) -> CryptoResult<String> {
        let pem_bytes = self.key.private_key_to_pem_pkcs8()?;
        Ok(String::from_utf8_lossy(&pem_bytes).to_string())
    }
}

impl SigningKey for Ed25519KeyPair {
    fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    fn sign(&self, _rng: &mut dyn RngCore, message: &[u8]) -> CryptoResult<Vec<u8>> {
        let mut signer = Signer::new_without_digest(&self.key)?;
        let signature = signer.sign_oneshot_to_vec(message)?;
        encode_signature(SignatureScheme::Ed25519, &signature)
    }
}

impl fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519KeyPair")
            .field("private_key", &"[REDACTED]")
            .field("public_key", &self.public_key)
            .finish()
    }
}

pub(crate) fn verify(key: &PublicKey, message: &[u8], signature: &[u8]) -> CryptoResult<bool> {
    let mut reader = Reader::new(key.as_bytes());
    if reader.read_string()? != KEY_ALGORITHM.as_bytes() {
        return Err(Error::Invalid(format!(
            "Not an Ed25519 key: {}",
            key.algorithm()
        )));
    }
    let raw = reader.read_string()?;
    reader.finish()?;
    if raw.len() != PUBLIC_KEY_SIZE {
        return Err(Error::Invalid(format!(
            "Ed25519 public key must be {PUBLIC_KEY_SIZE} bytes, got {}",
            raw.len()
        )));
    }
    if signature.len() != SIGNATURE_SIZE {
        return Err(Error::Invalid(format!(
            "Ed25519 signature must be {SIGNATURE_SIZE} bytes, got {}",
            signature.len()
        )));
    }

    let pkey = PKey::public_key_from_raw_bytes(raw, Id::ED25519)?;
    let mut verifier = Verifier::new_without_digest(&pkey)?;
    Ok(verifier.verify_oneshot(signature, message)?)
}
