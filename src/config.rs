use std::{collections::HashMap, path::PathBuf};

use config::{Config as ConfigLib, ConfigError, Environment, File};
use serde::Deserialize;

use crate::crypto::{self, PublicKey};
use crate::krl::CertificateInfo;

/// Keys whose values are comma separated lists when they come from the
/// environment or from overrides
const LIST_KEYS: &[&str] = &["krl.trusted_signers"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub krl: KrlConfig,
    #[serde(default)]
    pub check: Option<CheckConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KrlConfig {
    /// Location of the binary KRL
    pub path: PathBuf,
    /// Reject lists that carry no valid signature at all
    #[serde(default)]
    pub require_signature: bool,
    /// OpenSSH public key lines. When non-empty, at least one signer of the
    /// list must be among them.
    #[serde(default)]
    pub trusted_signers: Vec<String>,
}

impl KrlConfig {
    pub fn parse_trusted_signers(&self) -> Result<Vec<PublicKey>, crypto::Error> {
        self.trusted_signers
            .iter()
            .map(|line| PublicKey::from_openssh(line))
            .collect()
    }
}

/// A single subject to look up in the list
#[derive(Debug, Clone, Deserialize)]
pub struct CheckConfig {
    pub public_key: String,
    /// Makes the subject a certificate issued by this CA
    #[serde(default)]
    pub ca_key: Option<String>,
    #[serde(default)]
    pub serial: Option<u64>,
    #[serde(default)]
    pub key_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckSubject {
    Key(PublicKey),
    Certificate(CertificateInfo),
}

impl CheckConfig {
    pub fn subject(&self) -> Result<CheckSubject, crypto::Error> {
        let key = PublicKey::from_openssh(&self.public_key)?;
        let Some(ca_key) = &self.ca_key else {
            return Ok(CheckSubject::Key(key));
        };
        Ok(CheckSubject::Certificate(CertificateInfo::new(
            key,
            PublicKey::from_openssh(ca_key)?,
            self.serial.unwrap_or_default(),
            self.key_id.clone().unwrap_or_default(),
        )))
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_sources(None)
    }

    pub fn load_with_sources(
        env_vars: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = ConfigLib::builder()
            .set_default("krl.path", "revoked_keys")?
            .set_default("krl.require_signature", false)?
            .add_source(File::with_name("config/settings").required(false));

        // Explicit overrides replace the process environment so tests do not
        // see each other's variables
        if let Some(vars) = env_vars {
            for (key, value) in vars {
                builder = if LIST_KEYS.contains(&key.as_str()) {
                    let items: Vec<String> = value
                        .split(',')
                        .map(str::trim)
                        .filter(|item| !item.is_empty())
                        .map(String::from)
                        .collect();
                    builder.set_override(&key, items)?
                } else {
                    builder.set_override(&key, value)?
                };
            }
        } else {
            // Format: KRL_KRL__PATH or KRL_CHECK__SERIAL
            let mut environment = Environment::with_prefix("KRL")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",");
            for key in LIST_KEYS {
                environment = environment.with_list_parse_key(key);
            }
            builder = builder.add_source(environment);
        }

        builder.build()?.try_deserialize()
    }
}
