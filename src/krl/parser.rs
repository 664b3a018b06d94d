use tracing::debug;

use crate::codec::{self, Reader};
use crate::crypto::PublicKey;

use super::section::{Section, decode_key, require_exhausted};
use super::{Error, KRL_FORMAT_VERSION, KRL_MAGIC, Krl, KrlResult, section_type};

impl Krl {
    /// Parse and verify a binary KRL.
    ///
    /// Every signature section is checked against the bytes that precede its
    /// signature blob; a single bad signature rejects the whole document.
    /// A cut-off signature section is [`Error::UnexpectedTrailingBytes`];
    /// anything else after the first signature is [`Error::TrailingBytes`].
    /// The verified signers end up in [`Krl::signing_keys`] in the order they
    /// appear. Whether those signers are trusted is for the caller to decide.
    pub fn parse(data: &[u8]) -> KrlResult<Self> {
        let mut reader = Reader::new(data);

        let magic = reader.read_u64().map_err(|_| Error::BadMagic)?;
        if magic != KRL_MAGIC {
            return Err(Error::BadMagic);
        }
        let format_version = reader.read_u32()?;
        if format_version != KRL_FORMAT_VERSION {
            return Err(Error::UnsupportedVersion(format_version));
        }

        let version = reader.read_u64()?;
        let generated_date = reader.read_u64()?;
        let flags = reader.read_u64()?;
        // reserved
        reader.read_string()?;
        let comment = std::str::from_utf8(reader.read_string()?)
            .map_err(|_| Error::InvalidString("KRL comment"))?
            .to_owned();

        let mut sections = Vec::new();
        let mut signing_keys = Vec::new();

        while !reader.is_empty() {
            let tag = reader.read_u8()?;

            if tag == section_type::SIGNATURE {
                let start = reader.position() - 1;
                let partial = |_: codec::Error| Error::UnexpectedTrailingBytes {
                    remaining: data.len() - start,
                };
                let key = decode_key(reader.read_string().map_err(partial)?)?;
                let signed = &data[..reader.position()];
                let signature = reader.read_string().map_err(partial)?;
                verify_signature(&key, signed, signature)?;

                debug!(signer = %key, "Verified KRL signature");
                signing_keys.push(key);
                continue;
            }

            if !signing_keys.is_empty() {
                return Err(Error::TrailingBytes {
                    remaining: data.len() - (reader.position() - 1),
                });
            }

            let mut body = reader.read_sub_reader()?;
            let section = Section::decode(tag, &mut body)?;
            require_exhausted(tag, &body)?;

            debug!(section_type = tag, "Parsed KRL section");
            sections.push(section);
        }

        Ok(Krl {
            version,
            generated_date,
            flags,
            comment,
            sections,
            signing_keys,
        })
    }
}

fn verify_signature(key: &PublicKey, signed: &[u8], signature: &[u8]) -> KrlResult<()> {
    match key.verify(signed, signature) {
        Ok(true) => Ok(()),
        Ok(false) => {
            debug!("[ERROR] KRL signature by {key} does not match");
            Err(Error::InvalidSignature {
                signer: key.to_string(),
            })
        }
        Err(e) => {
            debug!("[ERROR] KRL signature by {key} could not be checked: {e}");
            Err(Error::InvalidSignature {
                signer: key.to_string(),
            })
        }
    }
}
