use crate::codec::Reader;
use crate::crypto::HashAlg;
use crate::crypto::errors::{CryptoResult, Error};
use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use std::fmt;
use std::hash::{Hash, Hasher};

/// An SSH public key in its wire encoding.
///
/// The blob is kept opaque; only the leading algorithm name is decoded.
/// Two keys are equal exactly when their encoded blobs are byte-identical,
/// which is the matching rule revocation lists rely on.
#[derive(Clone)]
pub struct PublicKey {
    algorithm: String,
    blob: Vec<u8>,
}

impl PublicKey {
    /// Wrap an encoded key blob (`string algorithm, ...`)
    pub fn from_blob(blob: impl Into<Vec<u8>>) -> CryptoResult<Self> {
        let blob = blob.into();
        let mut reader = Reader::new(&blob);
        let name = reader.read_string()?;
        if name.is_empty() {
            return Err(Error::Invalid("Key blob has an empty algorithm name".into()));
        }
        let algorithm = std::str::from_utf8(name)
            .map_err(|_| Error::Invalid("Key algorithm name is not UTF-8".into()))?
            .to_owned();

        Ok(Self { algorithm, blob })
    }

    /// Parse a key in OpenSSH one-line form (`algorithm base64 [comment]`)
    pub fn from_openssh(line: &str) -> CryptoResult<Self> {
        let mut fields = line.split_whitespace();
        let (Some(algorithm), Some(encoded)) = (fields.next(), fields.next()) else {
            return Err(Error::Invalid("Expected '<algorithm> <base64>'".into()));
        };

        let key = Self::from_blob(STANDARD.decode(encoded)?)?;
        if key.algorithm != algorithm {
            return Err(Error::Invalid(format!(
                "Key line says {algorithm} but the blob holds {}",
                key.algorithm
            )));
        }
        Ok(key)
    }

    /// Render the key in OpenSSH one-line form, without a comment
    pub fn to_openssh(&self) -> String {
        format!("{} {}", self.algorithm, STANDARD.encode(&self.blob))
    }

    /// Key algorithm name, e.g. `ssh-ed25519`
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// The encoded key blob
    pub fn as_bytes(&self) -> &[u8] {
        &self.blob
    }

    /// Digest of the encoded key blob
    pub fn fingerprint(&self, hash_alg: HashAlg) -> Vec<u8> {
        hash_alg.hash(&self.blob)
    }

    /// The `SHA256:...` fingerprint string printed by `ssh-keygen -l`
    pub fn sha256_fingerprint(&self) -> String {
        format!(
            "SHA256:{}",
            STANDARD_NO_PAD.encode(self.fingerprint(HashAlg::Sha256))
        )
    }

    /// Verify an SSH signature blob made by this key over `message`
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> CryptoResult<bool> {
        super::verify(self, message, signature)
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.blob == other.blob
    }
}

impl Eq for PublicKey {}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.blob.hash(state);
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("algorithm", &self.algorithm)
            .field("fingerprint", &self.sha256_fingerprint())
            .finish()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.algorithm, self.sha256_fingerprint())
    }
}
