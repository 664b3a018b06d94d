use crate::codec::{self, Reader, Writer};
use crate::crypto::{HashAlg, PublicKey};

use super::{Error, KrlResult, section_type, subsection_type};

/// A top-level KRL section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    /// Certificates revoked by serial or key id, scoped to one CA
    Certificates(CertificateSection),
    /// Keys revoked by exact blob match
    ExplicitKeys(ExplicitKeySection),
    /// Keys revoked by SHA-1 or SHA-256 digest of their blob
    Fingerprints(FingerprintSection),
}

impl Section {
    /// Tag written before the section body
    pub fn section_type(&self) -> u8 {
        match self {
            Section::Certificates(_) => section_type::CERTIFICATES,
            Section::ExplicitKeys(_) => section_type::EXPLICIT_KEY,
            Section::Fingerprints(section) => section.section_type(),
        }
    }

    pub(crate) fn encode(&self, writer: &mut Writer) {
        match self {
            Section::Certificates(section) => section.encode(writer),
            Section::ExplicitKeys(section) => {
                for key in &section.keys {
                    writer.put_string(key.as_bytes());
                }
            }
            Section::Fingerprints(section) => {
                for digest in &section.digests {
                    writer.put_string(digest);
                }
            }
        }
    }

    /// Decode a section body; the caller checks that `body` was exhausted
    pub(crate) fn decode(tag: u8, body: &mut Reader<'_>) -> KrlResult<Self> {
        match tag {
            section_type::CERTIFICATES => {
                CertificateSection::decode(body).map(Section::Certificates)
            }
            section_type::EXPLICIT_KEY => {
                let mut keys = Vec::new();
                while !body.is_empty() {
                    keys.push(decode_key(body.read_string()?)?);
                }
                Ok(Section::ExplicitKeys(ExplicitKeySection { keys }))
            }
            section_type::FINGERPRINT_SHA1 => {
                FingerprintSection::decode(HashAlg::Sha1, body).map(Section::Fingerprints)
            }
            section_type::FINGERPRINT_SHA256 => {
                FingerprintSection::decode(HashAlg::Sha256, body).map(Section::Fingerprints)
            }
            other => Err(Error::UnknownSectionType(other)),
        }
    }
}

impl From<CertificateSection> for Section {
    fn from(section: CertificateSection) -> Self {
        Section::Certificates(section)
    }
}

impl From<ExplicitKeySection> for Section {
    fn from(section: ExplicitKeySection) -> Self {
        Section::ExplicitKeys(section)
    }
}

impl From<FingerprintSection> for Section {
    fn from(section: FingerprintSection) -> Self {
        Section::Fingerprints(section)
    }
}

/// Revocations of certificates issued by `ca`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateSection {
    pub ca: PublicKey,
    pub subsections: Vec<CertificateSubsection>,
}

impl CertificateSection {
    pub fn new(ca: PublicKey) -> Self {
        Self {
            ca,
            subsections: Vec::new(),
        }
    }

    pub fn with_subsection(mut self, subsection: CertificateSubsection) -> Self {
        self.subsections.push(subsection);
        self
    }

    fn encode(&self, writer: &mut Writer) {
        writer.put_string(self.ca.as_bytes());
        // reserved
        writer.put_string(b"");
        for subsection in &self.subsections {
            writer.put_u8(subsection.subsection_type());
            writer.put_sub_writer(|body| subsection.encode(body));
        }
    }

    fn decode(body: &mut Reader<'_>) -> KrlResult<Self> {
        let ca = decode_key(body.read_string()?)?;
        body.read_string()?;

        let mut subsections = Vec::new();
        while !body.is_empty() {
            let tag = body.read_u8()?;
            let mut sub = body.read_sub_reader()?;
            subsections.push(CertificateSubsection::decode(tag, &mut sub)?);
            require_exhausted(tag, &sub)?;
        }
        Ok(Self { ca, subsections })
    }
}

/// One way of naming revoked certificates within a [`CertificateSection`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateSubsection {
    SerialList(Vec<u64>),
    SerialRanges(Vec<SerialRange>),
    SerialBitmap(SerialBitmap),
    KeyIds(Vec<String>),
}

impl CertificateSubsection {
    pub fn subsection_type(&self) -> u8 {
        match self {
            CertificateSubsection::SerialList(_) => subsection_type::SERIAL_LIST,
            CertificateSubsection::SerialRanges(_) => subsection_type::SERIAL_RANGE,
            CertificateSubsection::SerialBitmap(_) => subsection_type::SERIAL_BITMAP,
            CertificateSubsection::KeyIds(_) => subsection_type::KEY_ID,
        }
    }

    fn encode(&self, writer: &mut Writer) {
        match self {
            CertificateSubsection::SerialList(serials) => {
                for &serial in serials {
                    writer.put_u64(serial);
                }
            }
            CertificateSubsection::SerialRanges(ranges) => {
                for range in ranges {
                    writer.put_u64(range.lo).put_u64(range.hi);
                }
            }
            CertificateSubsection::SerialBitmap(bitmap) => {
                writer.put_u64(bitmap.base).put_string(&bitmap.bits);
            }
            CertificateSubsection::KeyIds(ids) => {
                for id in ids {
                    writer.put_string(id);
                }
            }
        }
    }

    fn decode(tag: u8, body: &mut Reader<'_>) -> KrlResult<Self> {
        match tag {
            subsection_type::SERIAL_LIST => {
                let mut serials = Vec::with_capacity(body.remaining() / 8);
                while body.remaining() >= 8 {
                    serials.push(body.read_u64()?);
                }
                Ok(CertificateSubsection::SerialList(serials))
            }
            subsection_type::SERIAL_RANGE => {
                let mut ranges = Vec::with_capacity(body.remaining() / 16);
                while body.remaining() >= 16 {
                    let lo = body.read_u64()?;
                    let hi = body.read_u64()?;
                    ranges.push(SerialRange::new(lo, hi)?);
                }
                Ok(CertificateSubsection::SerialRanges(ranges))
            }
            subsection_type::SERIAL_BITMAP => {
                let base = body.read_u64()?;
                let bits = body.read_string()?.to_vec();
                Ok(CertificateSubsection::SerialBitmap(SerialBitmap { base, bits }))
            }
            subsection_type::KEY_ID => {
                let mut ids = Vec::new();
                while !body.is_empty() {
                    let id = std::str::from_utf8(body.read_string()?)
                        .map_err(|_| Error::InvalidString("certificate key id"))?;
                    ids.push(id.to_owned());
                }
                Ok(CertificateSubsection::KeyIds(ids))
            }
            other => Err(Error::UnknownSubsectionType(other)),
        }
    }
}

/// Inclusive range of revoked serials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerialRange {
    pub lo: u64,
    pub hi: u64,
}

impl SerialRange {
    pub fn new(lo: u64, hi: u64) -> KrlResult<Self> {
        if lo > hi {
            return Err(Error::InvalidRange { lo, hi });
        }
        Ok(Self { lo, hi })
    }
}

/// Bitmap of revoked serials starting at `base`.
///
/// `bits` is a big-endian unsigned magnitude of any length: bit `i`,
/// counted from the least significant bit, stands for serial `base + i`.
/// The bytes are kept exactly as read so that re-encoding is lossless.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SerialBitmap {
    pub base: u64,
    pub bits: Vec<u8>,
}

impl SerialBitmap {
    /// Widest span [`SerialBitmap::from_serials`] accepts, 2 MiB of bitmap.
    /// Sparser serials belong in a serial list or ranges.
    pub const MAX_SPAN: u64 = 1 << 24;

    /// Build the canonical bitmap covering `serials`, based at the lowest one
    pub fn from_serials(serials: impl IntoIterator<Item = u64>) -> KrlResult<Self> {
        let serials: Vec<u64> = serials.into_iter().collect();
        let Some(&base) = serials.iter().min() else {
            return Ok(Self {
                base: 0,
                bits: Vec::new(),
            });
        };
        let top = serials.iter().map(|&serial| serial - base).max().unwrap_or(0);
        if top >= Self::MAX_SPAN {
            return Err(Error::BitmapTooWide {
                span: top.saturating_add(1),
                max: Self::MAX_SPAN,
            });
        }

        // little-endian while filling, flipped below
        let mut magnitude = vec![0u8; (top / 8) as usize + 1];
        for serial in serials {
            let offset = serial - base;
            magnitude[(offset / 8) as usize] |= 1 << (offset % 8);
        }
        magnitude.reverse();

        Ok(Self {
            base,
            bits: codec::mpint_bytes(&magnitude),
        })
    }

    /// Number of serials the bitmap can describe
    pub fn bit_len(&self) -> u64 {
        self.bits.len() as u64 * 8
    }
}

/// Keys revoked outright, matched by exact blob
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplicitKeySection {
    pub keys: Vec<PublicKey>,
}

impl ExplicitKeySection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: PublicKey) -> Self {
        self.keys.push(key);
        self
    }
}

/// Keys revoked by the digest of their blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintSection {
    hash_alg: HashAlg,
    digests: Vec<Vec<u8>>,
}

impl FingerprintSection {
    /// Section of SHA-1 fingerprints (tag 0x03)
    pub fn sha1() -> Self {
        Self {
            hash_alg: HashAlg::Sha1,
            digests: Vec::new(),
        }
    }

    /// Section of SHA-256 fingerprints (tag 0x05)
    pub fn sha256() -> Self {
        Self {
            hash_alg: HashAlg::Sha256,
            digests: Vec::new(),
        }
    }

    /// Add the fingerprint of `key`
    pub fn with_key(mut self, key: &PublicKey) -> Self {
        self.digests.push(key.fingerprint(self.hash_alg));
        self
    }

    /// Add a precomputed digest
    pub fn with_digest(mut self, digest: impl Into<Vec<u8>>) -> KrlResult<Self> {
        let digest = digest.into();
        self.check_length(&digest)?;
        self.digests.push(digest);
        Ok(self)
    }

    pub fn hash_alg(&self) -> HashAlg {
        self.hash_alg
    }

    pub fn digests(&self) -> &[Vec<u8>] {
        &self.digests
    }

    fn section_type(&self) -> u8 {
        match self.hash_alg {
            HashAlg::Sha256 => section_type::FINGERPRINT_SHA256,
            _ => section_type::FINGERPRINT_SHA1,
        }
    }

    fn check_length(&self, digest: &[u8]) -> KrlResult<()> {
        let expected = self.hash_alg.output_size();
        if digest.len() != expected {
            return Err(Error::InvalidFingerprintLength {
                expected,
                actual: digest.len(),
            });
        }
        Ok(())
    }

    fn decode(hash_alg: HashAlg, body: &mut Reader<'_>) -> KrlResult<Self> {
        let mut section = Self {
            hash_alg,
            digests: Vec::new(),
        };
        while !body.is_empty() {
            let digest = body.read_string()?;
            section.check_length(digest)?;
            section.digests.push(digest.to_vec());
        }
        Ok(section)
    }
}

pub(crate) fn decode_key(blob: &[u8]) -> KrlResult<PublicKey> {
    PublicKey::from_blob(blob).map_err(Error::InvalidKey)
}

/// Map leftover bytes in a bounded section body to a section error
pub(crate) fn require_exhausted(tag: u8, body: &Reader<'_>) -> KrlResult<()> {
    body.finish().map_err(|_| Error::TrailingSectionBytes {
        section_type: tag,
        remaining: body.remaining(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn key(last: u8) -> PublicKey {
        let mut blob = hex!(
            "0000000b7373682d65643235353139"
            "00000020"
            "0000000000000000000000000000000000000000000000000000000000000000"
        )
        .to_vec();
        blob[50] = last;
        PublicKey::from_blob(blob).unwrap()
    }

    fn decode_subsection(tag: u8, body: &[u8]) -> KrlResult<CertificateSubsection> {
        let mut reader = Reader::new(body);
        let subsection = CertificateSubsection::decode(tag, &mut reader)?;
        require_exhausted(tag, &reader)?;
        Ok(subsection)
    }

    #[test]
    fn test_serial_list_encoding() {
        let subsection = CertificateSubsection::SerialList(vec![9298]);
        let mut writer = Writer::new();
        subsection.encode(&mut writer);
        assert_eq!(writer.as_bytes(), &hex!("0000000000002452"));
        assert_eq!(
            decode_subsection(subsection_type::SERIAL_LIST, writer.as_bytes()).unwrap(),
            subsection
        );
    }

    #[test]
    fn test_serial_list_partial_entry() {
        let result = decode_subsection(subsection_type::SERIAL_LIST, &hex!("00000000000024520000"));
        assert!(matches!(
            result,
            Err(Error::TrailingSectionBytes {
                section_type: 0x20,
                remaining: 2
            })
        ));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let result = decode_subsection(
            subsection_type::SERIAL_RANGE,
            &hex!("00000000000000c8" "0000000000000064"),
        );
        assert!(matches!(result, Err(Error::InvalidRange { lo: 200, hi: 100 })));
        assert!(SerialRange::new(5, 5).is_ok());
    }

    #[test]
    fn test_bitmap_from_serials() {
        let bitmap = SerialBitmap::from_serials([1000, 1003, 1015]).unwrap();
        assert_eq!(bitmap.base, 1000);
        assert_eq!(bitmap.bits, vec![0x00, 0x80, 0x09]);

        let low = SerialBitmap::from_serials([7, 8]).unwrap();
        assert_eq!(low.base, 7);
        assert_eq!(low.bits, vec![0x03]);

        let empty = SerialBitmap::from_serials([]).unwrap();
        assert!(empty.bits.is_empty());
    }

    #[test]
    fn test_bitmap_span_limit() {
        let result = SerialBitmap::from_serials([0, 1 << 40]);
        assert!(matches!(
            result,
            Err(Error::BitmapTooWide { span, max })
                if span == (1 << 40) + 1 && max == SerialBitmap::MAX_SPAN
        ));

        let result = SerialBitmap::from_serials([5, u64::MAX]);
        assert!(matches!(result, Err(Error::BitmapTooWide { .. })));

        let widest = SerialBitmap::from_serials([10, 10 + SerialBitmap::MAX_SPAN - 1]).unwrap();
        assert_eq!(widest.bit_len(), SerialBitmap::MAX_SPAN);
        assert!(SerialBitmap::from_serials([10, 10 + SerialBitmap::MAX_SPAN]).is_err());
    }

    #[test]
    fn test_bitmap_keeps_raw_bytes() {
        let body = hex!("00000000000003e8" "00000004" "00000001");
        let subsection = decode_subsection(subsection_type::SERIAL_BITMAP, &body).unwrap();
        let CertificateSubsection::SerialBitmap(bitmap) = &subsection else {
            panic!("expected a bitmap");
        };
        assert_eq!(bitmap.bits, vec![0, 0, 0, 1]);

        let mut writer = Writer::new();
        subsection.encode(&mut writer);
        assert_eq!(writer.as_bytes(), &body);
    }

    #[test]
    fn test_empty_key_id_accepted() {
        let subsection =
            decode_subsection(subsection_type::KEY_ID, &hex!("00000003626f62" "00000000")).unwrap();
        assert_eq!(
            subsection,
            CertificateSubsection::KeyIds(vec!["bob".into(), String::new()])
        );
    }

    #[test]
    fn test_key_id_declared_length_mismatch() {
        let result = decode_subsection(subsection_type::KEY_ID, &hex!("00000005626f62"));
        assert!(matches!(
            result,
            Err(Error::Wire(codec::Error::LengthOverflow {
                declared: 5,
                remaining: 3
            }))
        ));
    }

    #[test]
    fn test_unknown_subsection() {
        assert!(matches!(
            decode_subsection(0x24, &[]),
            Err(Error::UnknownSubsectionType(0x24))
        ));
    }

    #[test]
    fn test_certificate_section_round_trip() {
        let section = Section::from(
            CertificateSection::new(key(1))
                .with_subsection(CertificateSubsection::SerialList(vec![1, 2]))
                .with_subsection(CertificateSubsection::KeyIds(vec!["host".into()])),
        );
        let mut writer = Writer::new();
        section.encode(&mut writer);

        let mut reader = Reader::new(writer.as_bytes());
        let decoded = Section::decode(section.section_type(), &mut reader).unwrap();
        assert!(reader.is_empty());
        assert_eq!(decoded, section);
    }

    #[test]
    fn test_fingerprint_length_checked() {
        let section = FingerprintSection::sha1().with_key(&key(2));
        assert_eq!(section.digests()[0].len(), 20);
        assert!(matches!(
            FingerprintSection::sha256().with_digest(vec![0u8; 20]),
            Err(Error::InvalidFingerprintLength {
                expected: 32,
                actual: 20
            })
        ));

        let body = hex!("00000002abcd");
        let mut reader = Reader::new(&body);
        assert!(matches!(
            Section::decode(section_type::FINGERPRINT_SHA1, &mut reader),
            Err(Error::InvalidFingerprintLength { .. })
        ));
    }

    #[test]
    fn test_unknown_section() {
        let mut reader = Reader::new(&[]);
        assert!(matches!(
            Section::decode(0x42, &mut reader),
            Err(Error::UnknownSectionType(0x42))
        ));
    }

    #[test]
    fn test_section_types() {
        assert_eq!(Section::from(ExplicitKeySection::new()).section_type(), 0x02);
        assert_eq!(Section::from(FingerprintSection::sha1()).section_type(), 0x03);
        assert_eq!(Section::from(FingerprintSection::sha256()).section_type(), 0x05);
    }
}
