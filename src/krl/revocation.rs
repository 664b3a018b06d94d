use tracing::info;

use crate::crypto::PublicKey;

use super::Krl;
use super::section::{
    CertificateSection, CertificateSubsection, ExplicitKeySection, FingerprintSection, Section,
    SerialBitmap, SerialRange,
};

/// The fields of an already-decoded certificate that revocation depends on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    /// Key certified by the certificate
    pub key: PublicKey,
    /// Key of the CA that signed the certificate
    pub ca_key: PublicKey,
    pub serial: u64,
    pub key_id: String,
}

impl CertificateInfo {
    pub fn new(key: PublicKey, ca_key: PublicKey, serial: u64, key_id: impl Into<String>) -> Self {
        Self {
            key,
            ca_key,
            serial,
            key_id: key_id.into(),
        }
    }
}

impl Krl {
    /// Whether any section revokes the certificate.
    ///
    /// A certificate is revoked when a section for its CA names its serial
    /// or key id, or when its key is revoked explicitly or by fingerprint.
    /// Absence from the list says nothing about trust.
    pub fn is_revoked(&self, cert: &CertificateInfo) -> bool {
        let revoked = self
            .sections
            .iter()
            .any(|section| section.revokes_certificate(cert));
        if revoked {
            info!(
                serial = cert.serial,
                key_id = %cert.key_id,
                ca = %cert.ca_key,
                "Certificate is revoked"
            );
        }
        revoked
    }

    /// Whether a plain key is revoked explicitly or by fingerprint
    pub fn is_key_revoked(&self, key: &PublicKey) -> bool {
        let revoked = self.sections.iter().any(|section| section.revokes_key(key));
        if revoked {
            info!(key = %key, "Key is revoked");
        }
        revoked
    }
}

impl Section {
    pub fn revokes_certificate(&self, cert: &CertificateInfo) -> bool {
        match self {
            Section::Certificates(section) => section.revokes(cert),
            _ => self.revokes_key(&cert.key),
        }
    }

    pub fn revokes_key(&self, key: &PublicKey) -> bool {
        match self {
            Section::Certificates(_) => false,
            Section::ExplicitKeys(section) => section.contains(key),
            Section::Fingerprints(section) => section.contains(key),
        }
    }
}

impl CertificateSection {
    pub fn revokes(&self, cert: &CertificateInfo) -> bool {
        self.ca == cert.ca_key
            && self
                .subsections
                .iter()
                .any(|subsection| subsection.matches(cert.serial, &cert.key_id))
    }
}

impl CertificateSubsection {
    pub fn matches(&self, serial: u64, key_id: &str) -> bool {
        match self {
            CertificateSubsection::SerialList(serials) => serials.contains(&serial),
            CertificateSubsection::SerialRanges(ranges) => {
                ranges.iter().any(|range| range.contains(serial))
            }
            CertificateSubsection::SerialBitmap(bitmap) => bitmap.contains(serial),
            CertificateSubsection::KeyIds(ids) => ids.iter().any(|id| id == key_id),
        }
    }
}

impl SerialRange {
    pub fn contains(&self, serial: u64) -> bool {
        (self.lo..=self.hi).contains(&serial)
    }
}

impl SerialBitmap {
    pub fn contains(&self, serial: u64) -> bool {
        let Some(offset) = serial.checked_sub(self.base) else {
            return false;
        };
        if offset >= self.bit_len() {
            return false;
        }
        let byte = self.bits[self.bits.len() - 1 - (offset / 8) as usize];
        byte & (1 << (offset % 8)) != 0
    }
}

impl ExplicitKeySection {
    pub fn contains(&self, key: &PublicKey) -> bool {
        self.keys.contains(key)
    }
}

impl FingerprintSection {
    pub fn contains(&self, key: &PublicKey) -> bool {
        let digest = key.fingerprint(self.hash_alg());
        self.digests().iter().any(|candidate| *candidate == digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Ed25519KeyPair, SigningKey};

    fn key() -> PublicKey {
        Ed25519KeyPair::generate().unwrap().public_key().clone()
    }

    #[test]
    fn test_serial_list_scoped_to_ca() {
        let (ca, other_ca, user) = (key(), key(), key());
        let krl = Krl::new(0).with_section(
            CertificateSection::new(ca.clone())
                .with_subsection(CertificateSubsection::SerialList(vec![9298])),
        );

        assert!(krl.is_revoked(&CertificateInfo::new(user.clone(), ca.clone(), 9298, "")));
        assert!(!krl.is_revoked(&CertificateInfo::new(user.clone(), ca, 9299, "")));
        assert!(!krl.is_revoked(&CertificateInfo::new(user, other_ca, 9298, "")));
    }

    #[test]
    fn test_range_boundaries() {
        let range = SerialRange::new(100, 200).unwrap();
        assert!(range.contains(100));
        assert!(range.contains(200));
        assert!(!range.contains(99));
        assert!(!range.contains(201));

        let full = SerialRange::new(0, u64::MAX).unwrap();
        assert!(full.contains(0) && full.contains(u64::MAX));
    }

    #[test]
    fn test_bitmap_lookup() {
        let bitmap = SerialBitmap::from_serials([1000, 1003, 1015]).unwrap();
        for serial in [1000, 1003, 1015] {
            assert!(bitmap.contains(serial), "serial {serial}");
        }
        for serial in [0, 999, 1001, 1014, 1016, 1024, u64::MAX] {
            assert!(!bitmap.contains(serial), "serial {serial}");
        }
    }

    #[test]
    fn test_bitmap_with_redundant_leading_bytes() {
        let bitmap = SerialBitmap {
            base: 10,
            bits: vec![0x00, 0x00, 0x01],
        };
        assert!(bitmap.contains(10));
        assert!(!bitmap.contains(11));
        assert!(!bitmap.contains(10 + 24));
        assert_eq!(bitmap.bit_len(), 24);
    }

    #[test]
    fn test_key_id_match() {
        let subsection = CertificateSubsection::KeyIds(vec!["alice".into()]);
        assert!(subsection.matches(1, "alice"));
        assert!(!subsection.matches(1, "alice2"));
        assert!(!subsection.matches(1, ""));
    }

    #[test]
    fn test_explicit_and_fingerprint_sections() {
        let (ca, revoked, sha256_revoked, fine) = (key(), key(), key(), key());
        let krl = Krl::new(0)
            .with_section(ExplicitKeySection::new().with_key(revoked.clone()))
            .with_section(FingerprintSection::sha256().with_key(&sha256_revoked));

        assert!(krl.is_key_revoked(&revoked));
        assert!(krl.is_key_revoked(&sha256_revoked));
        assert!(!krl.is_key_revoked(&fine));
        assert!(!krl.is_key_revoked(&ca));

        // the certificate's own key decides, whoever issued it
        assert!(krl.is_revoked(&CertificateInfo::new(revoked, ca.clone(), 1, "x")));
        assert!(!krl.is_revoked(&CertificateInfo::new(fine, ca, 1, "x")));
    }

    #[test]
    fn test_certificate_section_ignores_plain_keys() {
        let ca = key();
        let krl = Krl::new(0).with_section(
            CertificateSection::new(ca.clone())
                .with_subsection(CertificateSubsection::SerialList(vec![1])),
        );
        assert!(!krl.is_key_revoked(&ca));
    }

    #[test]
    fn test_empty_list_revokes_nothing() {
        let krl = Krl::new(0);
        assert!(!krl.is_revoked(&CertificateInfo::new(key(), key(), 0, "")));
    }
}
