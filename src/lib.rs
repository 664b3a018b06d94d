pub mod codec;
pub mod config;
pub mod crypto;
pub mod krl;
pub mod telemetry;

pub use krl::{CertificateInfo, Krl};
