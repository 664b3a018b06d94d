use crate::codec::{Reader, Writer};
use crate::crypto::errors::{CryptoResult, Error};
use crate::crypto::keys::PublicKey;
use crate::crypto::{HashAlg, SignatureScheme, SigningKey, encode_signature};
use openssl::bn::BigNum;
use openssl::pkey::{HasPublic, PKey, Private, Public};
use openssl::rsa::Rsa;
use openssl::sign::{Signer, Verifier};
use rand::RngCore;
use std::fmt;

const KEY_ALGORITHM: &str = "ssh-rsa";

/// Smallest modulus accepted when generating or loading signing keys
pub const MIN_KEY_BITS: u32 = 1024;

/// RSA signing key producing `ssh-rsa` / `rsa-sha2-*` signatures
#[derive(Clone)]
pub struct RsaKeyPair {
    key: PKey<Private>,
    public_key: PublicKey,
    hash_alg: HashAlg,
}

impl RsaKeyPair {
    /// Generate a new RSA key pair signing with `ssh-rsa` (SHA-1)
    pub fn generate(bits: u32) -> CryptoResult<Self> {
        if bits < MIN_KEY_BITS {
            return Err(Error::Invalid(format!(
                "RSA keys must have at least {MIN_KEY_BITS} bits"
            )));
        }
        let rsa = Rsa::generate(bits)?;
        Self::from_pkey(PKey::from_rsa(rsa)?)
    }

    /// Load from PEM-encoded PKCS#1/PKCS#8.
    pub fn from_pem(pem_bytes: impl AsRef<[u8]>) -> CryptoResult<Self> {
        Self::from_pkey(PKey::private_key_from_pem(pem_bytes.as_ref())?)
    }

    /// Load from DER-encoded PKCS#1/PKCS#8.
    pub fn from_der(der_bytes: impl AsRef<[u8]>) -> CryptoResult<Self> {
        Self::from_pkey(PKey::private_key_from_der(der_bytes.as_ref())?)
    }

    fn from_pkey(key: PKey<Private>) -> CryptoResult<Self> {
        let rsa = key.rsa()?;
        let public_key = encode_public_key(&rsa)?;
        Ok(Self {
            key,
            public_key,
            hash_alg: HashAlg::Sha1,
        })
    }

    /// Switch the signature digest: SHA-1 (`ssh-rsa`), SHA-256
    /// (`rsa-sha2-256`) or SHA-512 (`rsa-sha2-512`)
    pub fn with_hash(mut self, hash_alg: HashAlg) -> CryptoResult<Self> {
        if hash_alg == HashAlg::Sha384 {
            return Err(Error::UnsupportedAlgorithm(
                "RSA signatures over SHA-384 have no SSH name".into(),
            ));
        }
        self.hash_alg = hash_alg;
        Ok(self)
    }

    /// The signature scheme this key signs with
    pub fn scheme(&self) -> SignatureScheme {
        SignatureScheme::Rsa(self.hash_alg)
    }

    /// Modulus size in bits
    pub fn bits(&self) -> u32 {
        self.key.bits()
    }

    /// Serialize as PEM-encoded PKCS#8.
    pub fn to_pem(&self) -> CryptoResult<String> {
        let pem_bytes = self.key.private_key_to_pem_pkcs8()?;
        Ok(String::from_utf8_lossy(&pem_bytes).to_string())
    }
}

impl SigningKey for RsaKeyPair {
    fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    fn sign(&self, _rng: &mut dyn RngCore, message: &[u8]) -> CryptoResult<Vec<u8>> {
        let mut signer = Signer::new(self.hash_alg.into(), &self.key)?;
        signer.update(message)?;
        let signature = signer.sign_to_vec()?;

        encode_signature(self.scheme(), &signature)
    }
}

impl fmt::Debug for RsaKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKeyPair")
            .field("bits", &self.bits())
            .field("scheme", &self.scheme())
            .field("private_key", &"[REDACTED]")
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// `string "ssh-rsa", mpint e, mpint n`
fn encode_public_key<T: HasPublic>(rsa: &Rsa<T>) -> CryptoResult<PublicKey> {
    let mut writer = Writer::new();
    writer
        .put_string(KEY_ALGORITHM)
        .put_mpint(&rsa.e().to_vec())
        .put_mpint(&rsa.n().to_vec());
    PublicKey::from_blob(writer.finish()?)
}

fn decode_public_key(key: &PublicKey) -> CryptoResult<PKey<Public>> {
    let mut reader = Reader::new(key.as_bytes());
    if reader.read_string()? != KEY_ALGORITHM.as_bytes() {
        return Err(Error::Invalid(format!("Not an RSA key: {}", key.algorithm())));
    }
    let e = BigNum::from_slice(reader.read_mpint()?)?;
    let n = BigNum::from_slice(reader.read_mpint()?)?;
    reader.finish()?;

    let rsa = Rsa::from_public_components(n, e)?;
    Ok(PKey::from_rsa(rsa)?)
}

/// Verify a raw RSA PKCS#1 v1.5 signature
pub(crate) fn verify(
    key: &PublicKey,
    message: &[u8],
    signature: &[u8],
    hash_alg: HashAlg,
) -> CryptoResult<bool> {
    let pkey = decode_public_key(key)?;
    if pkey.bits() < MIN_KEY_BITS {
        return Err(Error::Invalid(format!(
            "RSA key of {} bits is too small",
            pkey.bits()
        )));
    }

    let mut verifier = Verifier::new(hash_alg.into(), &pkey)?;
    verifier.update(message)?;
    Ok(verifier.verify(signature)?)
}
