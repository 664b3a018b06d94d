use rand::RngCore;
use tracing::debug;

use crate::codec::Writer;
use crate::crypto::SigningKey;

use super::{Error, KRL_FORMAT_VERSION, KRL_MAGIC, Krl, KrlResult, section_type};

impl Krl {
    /// Encode the list and append one signature section per key.
    ///
    /// Keys sign in the order given; each signature covers every byte before
    /// it, including earlier signatures and its own key blob. On success
    /// [`Krl::signing_keys`] is replaced by exactly these keys, so the list
    /// compares equal to the result of parsing the returned bytes. On failure
    /// (a signer error, or a string too long for its length prefix) no bytes
    /// are returned and the list is left untouched.
    pub fn serialize(
        &mut self,
        rng: &mut dyn RngCore,
        signing_keys: &[&dyn SigningKey],
    ) -> KrlResult<Vec<u8>> {
        let mut writer = self.encode_unsigned();
        writer.check()?;
        let mut signers = Vec::with_capacity(signing_keys.len());

        for key in signing_keys {
            let public_key = key.public_key();
            writer
                .put_u8(section_type::SIGNATURE)
                .put_string(public_key.as_bytes());
            writer.check()?;

            let signature = key
                .sign(rng, writer.as_bytes())
                .map_err(|source| Error::SigningFailure {
                    signer: public_key.to_string(),
                    source,
                })?;
            writer.put_string(signature);

            debug!(signer = %public_key, "Signed KRL");
            signers.push(public_key.clone());
        }

        let bytes = writer.finish()?;
        self.signing_keys = signers;
        Ok(bytes)
    }

    fn encode_unsigned(&self) -> Writer {
        let mut writer = Writer::new();
        writer
            .put_u64(KRL_MAGIC)
            .put_u32(KRL_FORMAT_VERSION)
            .put_u64(self.version)
            .put_u64(self.generated_date)
            .put_u64(self.flags)
            // reserved
            .put_string(b"")
            .put_string(&self.comment);

        for section in &self.sections {
            writer.put_u8(section.section_type());
            writer.put_sub_writer(|body| section.encode(body));
        }
        writer
    }
}
