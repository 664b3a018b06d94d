use crate::crypto::HashAlg;
use crate::crypto::errors::{CryptoResult, Error};
use openssl::ec::EcGroup;
use openssl::nid::Nid;
use std::fmt;

/// Elliptic curves usable in `ecdsa-sha2-*` SSH keys
#[derive(Debug, Clone, Default, Copy, PartialEq, Eq, Hash)]
pub enum Curve {
    /// NIST P-256 (secp256r1)
    #[default]
    NistP256,
    /// NIST P-384 (secp384r1)
    NistP384,
    /// NIST P-521 (secp521r1)
    NistP521,
}

impl Curve {
    /// Get the OpenSSL NID for this curve
    pub fn to_nid(self) -> Nid {
        match self {
            Curve::NistP256 => Nid::X9_62_PRIME256V1,
            Curve::NistP384 => Nid::SECP384R1,
            Curve::NistP521 => Nid::SECP521R1,
        }
    }

    /// Look up a curve from its OpenSSL NID
    pub fn from_nid(nid: Nid) -> CryptoResult<Self> {
        Curve::all()
            .iter()
            .copied()
            .find(|curve| curve.to_nid() == nid)
            .ok_or_else(|| Error::UnsupportedCurve(format!("{nid:?}")))
    }

    /// Create an OpenSSL EcGroup for this curve
    pub fn to_ec_group(self) -> CryptoResult<EcGroup> {
        Ok(EcGroup::from_curve_name(self.to_nid())?)
    }

    /// Curve identifier embedded in the key blob
    pub fn identifier(self) -> &'static str {
        match self {
            Curve::NistP256 => "nistp256",
            Curve::NistP384 => "nistp384",
            Curve::NistP521 => "nistp521",
        }
    }

    /// Key and signature algorithm name
    pub fn ssh_algorithm(self) -> &'static str {
        match self {
            Curve::NistP256 => "ecdsa-sha2-nistp256",
            Curve::NistP384 => "ecdsa-sha2-nistp384",
            Curve::NistP521 => "ecdsa-sha2-nistp521",
        }
    }

    /// Parse the curve identifier of a key blob
    pub fn from_identifier(identifier: impl AsRef<[u8]>) -> CryptoResult<Self> {
        let identifier = identifier.as_ref();
        Curve::all()
            .iter()
            .copied()
            .find(|curve| curve.identifier().as_bytes() == identifier)
            .ok_or_else(|| {
                Error::UnsupportedCurve(String::from_utf8_lossy(identifier).into_owned())
            })
    }

    /// Digest paired with this curve by RFC 5656
    pub fn hash_alg(self) -> HashAlg {
        match self {
            Curve::NistP256 => HashAlg::Sha256,
            Curve::NistP384 => HashAlg::Sha384,
            Curve::NistP521 => HashAlg::Sha512,
        }
    }

    /// Get the key size in bytes for this curve
    pub fn key_size(self) -> usize {
        match self {
            Curve::NistP256 => 32,
            Curve::NistP384 => 48,
            Curve::NistP521 => 66,
        }
    }

    /// Get the uncompressed point size in bytes
    pub fn uncompressed_point_size(self) -> usize {
        1 + 2 * self.key_size()
    }

    /// Get all supported curves
    pub fn all() -> &'static [Curve] {
        &[Curve::NistP256, Curve::NistP384, Curve::NistP521]
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Curve::NistP256 => "NIST P-256 (secp256r1)",
            Curve::NistP384 => "NIST P-384 (secp384r1)",
            Curve::NistP521 => "NIST P-521 (secp521r1)",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_properties() {
        for &curve in Curve::all() {
            assert!(curve.to_ec_group().is_ok());
            assert_eq!(Curve::from_nid(curve.to_nid()).unwrap(), curve);
            assert_eq!(Curve::from_identifier(curve.identifier()).unwrap(), curve);
            assert!(curve.ssh_algorithm().ends_with(curve.identifier()));
        }
    }

    #[test]
    fn test_unknown_identifier() {
        assert!(matches!(
            Curve::from_identifier("brainpoolP256r1"),
            Err(Error::UnsupportedCurve(_))
        ));
    }
}
