use crate::codec::{Reader, Writer};
use crate::crypto::curves::Curve;
use crate::crypto::errors::{CryptoResult, Error};
use crate::crypto::keys::PublicKey;
use crate::crypto::{SignatureScheme, SigningKey, encode_signature};
use openssl::bn::{BigNum, BigNumContext, BigNumContextRef, BigNumRef};
use openssl::ec::{EcGroup, EcKey, EcPoint, PointConversionForm as Form};
use openssl::ecdsa::EcdsaSig as OpenSslEcdsaSig;
use openssl::pkey::{PKey, Private};
use openssl::sign::Verifier;
use rand::RngCore;
use std::fmt;

/// ECDSA signature in its two representations: DER for OpenSSL and the
/// (r, s) pair carried inside SSH signature blobs
#[derive(Clone, PartialEq, Eq)]
pub struct EcdsaSig {
    der_data: Vec<u8>,
    r: Vec<u8>,
    s: Vec<u8>,
}

impl EcdsaSig {
    /// Create signature from DER-encoded signature data
    pub fn from_der(der_data: impl AsRef<[u8]>) -> CryptoResult<Self> {
        let ecdsa_sig = OpenSslEcdsaSig::from_der(der_data.as_ref())?;
        Ok(Self {
            der_data: der_data.as_ref().to_vec(),
            r: ecdsa_sig.r().to_vec(),
            s: ecdsa_sig.s().to_vec(),
        })
    }

    /// Create signature from raw r, s components
    pub fn from_components(r: &[u8], s: &[u8]) -> CryptoResult<Self> {
        let ecdsa_sig =
            OpenSslEcdsaSig::from_private_components(BigNum::from_slice(r)?, BigNum::from_slice(s)?)?;
        Ok(Self {
            der_data: ecdsa_sig.to_der()?,
            r: r.to_vec(),
            s: s.to_vec(),
        })
    }

    /// Decode the SSH form `mpint r, mpint s`
    pub fn from_ssh(data: &[u8]) -> CryptoResult<Self> {
        let mut reader = Reader::new(data);
        let r = reader.read_mpint()?;
        let s = reader.read_mpint()?;
        reader.finish()?;
        Self::from_components(r, s)
    }

    /// Encode as `mpint r, mpint s`
    pub fn to_ssh(&self) -> CryptoResult<Vec<u8>> {
        let mut writer = Writer::new();
        writer.put_mpint(&self.r).put_mpint(&self.s);
        Ok(writer.finish()?)
    }

    /// Get DER-encoded signature data
    pub fn as_der(&self) -> &[u8] {
        &self.der_data
    }
}

impl fmt::Debug for EcdsaSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcdsaSig")
            .field("size", &self.der_data.len())
            .field("hex", &hex::encode(&self.der_data))
            .finish()
    }
}

/// ECDSA signing key over a NIST curve.
///
/// The per-signature nonce is drawn from the rng passed to
/// [`SigningKey::sign`], so a seeded rng reproduces the same signature.
#[derive(Clone)]
pub struct EcdsaKeyPair {
    curve: Curve,
    key: PKey<Private>,
    public_key: PublicKey,
}

impl EcdsaKeyPair {
    /// Generate a new ECDSA key pair
    pub fn generate(curve: Curve) -> CryptoResult<Self> {
        let group = curve.to_ec_group()?;
        let ec_key = EcKey::generate(&group)?;
        Self::from_ec_key(curve, ec_key)
    }

    /// Import key from PKCS#8 or SEC1 PEM
    pub fn from_pem(pem_bytes: impl AsRef<[u8]>) -> CryptoResult<Self> {
        let pkey = PKey::private_key_from_pem(pem_bytes.as_ref())?;
        let ec_key = pkey.ec_key()?;
        let nid = ec_key
            .group()
            .curve_name()
            .ok_or_else(|| Error::UnsupportedCurve("unnamed curve".into()))?;
        Self::from_ec_key(Curve::from_nid(nid)?, ec_key)
    }

    fn from_ec_key(curve: Curve, ec_key: EcKey<Private>) -> CryptoResult<Self> {
        let mut ctx = BigNumContext::new()?;
        let point = ec_key
            .public_key()
            .to_bytes(ec_key.group(), Form::UNCOMPRESSED, &mut ctx)?;

        let mut writer = Writer::new();
        writer
            .put_string(curve.ssh_algorithm())
            .put_string(curve.identifier())
            .put_string(point);
        let public_key = PublicKey::from_blob(writer.finish()?)?;

        Ok(Self {
            curve,
            key: PKey::from_ec_key(ec_key)?,
            public_key,
        })
    }

    /// Get the curve used by this key pair
    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Export key in PKCS#8 PEM format
    pub fn to_pem(&self) -> CryptoResult<String> {
        let pem_bytes = self.key.private_key_to_pem_pkcs8()?;
        Ok(String::from_utf8_lossy(&pem_bytes).to_string())
    }
}

impl SigningKey for EcdsaKeyPair {
    fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    fn sign(&self, rng: &mut dyn RngCore, message: &[u8]) -> CryptoResult<Vec<u8>> {
        let ec_key = self.key.ec_key()?;
        let group = ec_key.group();
        let mut ctx = BigNumContext::new()?;
        let mut order = BigNum::new()?;
        group.order(&mut order, &mut ctx)?;

        // Every supported curve pairs with a hash no wider than its order
        let digest = BigNum::from_slice(&self.curve.hash_alg().hash(message))?;
        let mut z = BigNum::new()?;
        z.nnmod(&digest, &order, &mut ctx)?;

        loop {
            let k = random_scalar(rng, &order, &mut ctx)?;

            let mut point = EcPoint::new(group)?;
            point.mul_generator(group, &k, &ctx)?;
            let (mut x, mut y) = (BigNum::new()?, BigNum::new()?);
            point.affine_coordinates(group, &mut x, &mut y, &mut ctx)?;

            let mut r = BigNum::new()?;
            r.nnmod(&x, &order, &mut ctx)?;
            if r.num_bits() == 0 {
                continue;
            }

            // s = k^-1 * (z + r * d) mod n
            let mut k_inv = BigNum::new()?;
            k_inv.mod_inverse(&k, &order, &mut ctx)?;
            let mut rd = BigNum::new()?;
            rd.mod_mul(&r, ec_key.private_key(), &order, &mut ctx)?;
            let mut sum = BigNum::new()?;
            sum.mod_add(&z, &rd, &order, &mut ctx)?;
            let mut s = BigNum::new()?;
            s.mod_mul(&k_inv, &sum, &order, &mut ctx)?;
            if s.num_bits() == 0 {
                continue;
            }

            let signature = EcdsaSig::from_components(&r.to_vec(), &s.to_vec())?;
            return encode_signature(SignatureScheme::Ecdsa(self.curve), &signature.to_ssh()?);
        }
    }
}

impl fmt::Debug for EcdsaKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcdsaKeyPair")
            .field("curve", &self.curve)
            .field("private_key", &"[REDACTED]")
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// Uniform-enough scalar in `[1, order - 1]`; 64 surplus random bits keep
/// the modular bias negligible
fn random_scalar(
    rng: &mut dyn RngCore,
    order: &BigNumRef,
    ctx: &mut BigNumContextRef,
) -> CryptoResult<BigNum> {
    let mut bytes = vec![0u8; order.num_bytes() as usize + 8];
    rng.fill_bytes(&mut bytes);
    let wide = BigNum::from_slice(&bytes)?;

    let mut order_minus_one = order.to_owned()?;
    order_minus_one.sub_word(1)?;
    let mut k = BigNum::new()?;
    k.nnmod(&wide, &order_minus_one, ctx)?;
    k.add_word(1)?;
    k.set_const_time();
    Ok(k)
}

/// `string algorithm, string curve identifier, string Q`
fn decode_public_key(key: &PublicKey, curve: Curve) -> CryptoResult<PKey<openssl::pkey::Public>> {
    let mut reader = Reader::new(key.as_bytes());
    reader.read_string()?;
    if Curve::from_identifier(reader.read_string()?)? != curve {
        return Err(Error::Invalid(
            "Curve identifier does not match key algorithm".into(),
        ));
    }
    let point_bytes = reader.read_string()?;
    reader.finish()?;
    if point_bytes.len() != curve.uncompressed_point_size() {
        return Err(Error::Invalid(format!(
            "Invalid point size: expected {} bytes, got {}",
            curve.uncompressed_point_size(),
            point_bytes.len()
        )));
    }

    let group: EcGroup = curve.to_ec_group()?;
    let mut ctx = BigNumContext::new()?;
    let point = EcPoint::from_bytes(&group, point_bytes, &mut ctx)?;
    let ec_key = EcKey::from_public_key(&group, &point)?;
    Ok(PKey::from_ec_key(ec_key)?)
}

/// Verify the SSH `(r, s)` body of an ECDSA signature
pub(crate) fn verify(
    key: &PublicKey,
    message: &[u8],
    signature: &[u8],
    curve: Curve,
) -> CryptoResult<bool> {
    let pkey = decode_public_key(key, curve)?;
    let signature = EcdsaSig::from_ssh(signature)?;

    let mut verifier = Verifier::new(curve.hash_alg().into(), &pkey)?;
    verifier.update(message)?;
    Ok(verifier.verify(signature.as_der())?)
}
