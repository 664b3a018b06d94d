#![allow(dead_code)]

use hex_literal::hex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use ssh_krl::crypto::Ed25519KeyPair;

/// Generation date (and version) of both recorded lists
pub const GENERATED_DATE: u64 = 1136239445;

/// Three-signer `ssh-rsa` list published alongside the reference suite
pub const SIGNED_RSA: &[u8] = include_bytes!("../../test_data/signed_rsa.krl");

/// Length of [`SIGNED_RSA`] up to its first signature section
pub const SIGNED_RSA_UNSIGNED_LEN: usize = 221;

/// Position of the low byte of the revoked serial 9298 in [`SIGNED_RSA`]
pub const SIGNED_RSA_SERIAL_LOW_BYTE: usize = 220;

/// List built from the RFC 8032 seeds below, signed by seeds one and three
pub const GOLDEN_ED25519: &[u8] = include_bytes!("../../test_data/golden_ed25519.krl");

pub const GOLDEN_ED25519_UNSIGNED_LEN: usize = 336;

// RFC 8032 section 7.1, tests 1 to 3
pub const SEED_CA: [u8; 32] =
    hex!("9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60");
pub const SEED_REVOKED: [u8; 32] =
    hex!("4ccd089b28ff96da9db6c346ec114e0f5b8a319f35aba624da8cf6ed4fb8a6fb");
pub const SEED_COSIGNER: [u8; 32] =
    hex!("c5aa8df43f9f837bedb7442f31dcb7b166d38535076f094b85ce3a2e0b4458f7");

pub fn ed25519(seed: &[u8; 32]) -> Ed25519KeyPair {
    Ed25519KeyPair::from_seed(seed).expect("valid Ed25519 seed")
}

pub fn rng() -> StdRng {
    StdRng::seed_from_u64(0x5353_484b)
}
