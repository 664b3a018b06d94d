mod common;

use common::{GENERATED_DATE, SIGNED_RSA, SIGNED_RSA_SERIAL_LOW_BYTE, SIGNED_RSA_UNSIGNED_LEN};
use ssh_krl::krl::{CertificateSubsection, Error, Section};
use ssh_krl::{CertificateInfo, Krl};

#[test]
fn test_published_vector_parses() {
    let krl = Krl::parse(SIGNED_RSA).expect("published KRL must parse");

    assert_eq!(krl.version, GENERATED_DATE);
    assert_eq!(krl.generated_date, GENERATED_DATE);
    assert_eq!(krl.flags, 0);
    assert_eq!(krl.comment, "");

    let [Section::Certificates(section)] = krl.sections.as_slice() else {
        panic!("expected a single certificate section, got {:?}", krl.sections);
    };
    assert_eq!(
        section.subsections,
        vec![CertificateSubsection::SerialList(vec![9298])]
    );

    let signers = krl.signing_keys();
    assert_eq!(signers.len(), 3);
    assert!(signers.iter().all(|key| key.algorithm() == "ssh-rsa"));
    assert_ne!(signers[0], signers[1]);
    assert_ne!(signers[1], signers[2]);
    assert_ne!(signers[0], signers[2]);
    // The CA signed first
    assert_eq!(signers[0], section.ca);
}

#[test]
fn test_published_vector_revocation() {
    let krl = Krl::parse(SIGNED_RSA).unwrap();
    let signers = krl.signing_keys();
    let (ca, key1, key2) = (&signers[0], &signers[1], &signers[2]);

    let cert = |key: &ssh_krl::crypto::PublicKey, serial| {
        CertificateInfo::new(key.clone(), ca.clone(), serial, "")
    };
    assert!(krl.is_revoked(&cert(key1, 9298)));
    assert!(krl.is_revoked(&cert(key2, 9298)));
    assert!(!krl.is_revoked(&cert(key1, 9299)));
    assert!(!krl.is_revoked(&cert(key1, 0)));

    // Same serial under a different CA
    let foreign = CertificateInfo::new(key1.clone(), key2.clone(), 9298, "");
    assert!(!krl.is_revoked(&foreign));
    assert!(!krl.is_key_revoked(ca));
}

#[test]
fn test_unsigned_reserialization_matches_prefix() {
    let mut krl = Krl::parse(SIGNED_RSA).unwrap();
    let bytes = krl.serialize(&mut common::rng(), &[]).unwrap();

    assert_eq!(bytes, &SIGNED_RSA[..SIGNED_RSA_UNSIGNED_LEN]);
    assert!(krl.signing_keys().is_empty());
}

#[test]
fn test_tampered_serial_rejected() {
    let mut tampered = SIGNED_RSA.to_vec();
    tampered[SIGNED_RSA_SERIAL_LOW_BYTE] ^= 0x01;

    assert!(matches!(
        Krl::parse(&tampered),
        Err(Error::InvalidSignature { .. })
    ));
}

#[test]
fn test_tampered_last_signature_rejected() {
    let mut tampered = SIGNED_RSA.to_vec();
    *tampered.last_mut().unwrap() ^= 0x80;

    assert!(matches!(
        Krl::parse(&tampered),
        Err(Error::InvalidSignature { .. })
    ));
}

#[test]
fn test_every_single_byte_flip_rejected() {
    for position in 0..SIGNED_RSA.len() {
        let mut tampered = SIGNED_RSA.to_vec();
        tampered[position] ^= 0xff;
        assert!(
            Krl::parse(&tampered).is_err(),
            "flipping byte {position} went unnoticed"
        );
    }
}

#[test]
fn test_dropping_signatures_keeps_earlier_ones_valid() {
    // Signatures only cover what precedes them, so cutting the list right
    // after the first signature leaves a valid single-signer document
    let second_signature_at = SIGNED_RSA_UNSIGNED_LEN + 303;
    assert_eq!(SIGNED_RSA[second_signature_at], 0x04);

    let krl = Krl::parse(&SIGNED_RSA[..second_signature_at]).unwrap();
    assert_eq!(krl.signing_keys().len(), 1);
}
