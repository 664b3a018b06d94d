use super::{CodecResult, Error, mpint_bytes};

/// Growable output buffer for SSH wire encodings.
///
/// Writes never fail on the spot. A string too long for its u32 length
/// prefix is remembered and reported by [`Writer::check`] and
/// [`Writer::finish`].
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
    oversized: Option<usize>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Everything written so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Fails if any string written so far could not be length-prefixed
    pub fn check(&self) -> CodecResult<()> {
        match self.oversized {
            Some(len) => Err(Error::StringTooLong { len }),
            None => Ok(()),
        }
    }

    pub fn finish(self) -> CodecResult<Vec<u8>> {
        self.check()?;
        Ok(self.buf)
    }

    pub fn put_u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    pub fn put_u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn put_u64(&mut self, value: u64) -> &mut Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Append raw bytes without a length prefix
    pub fn put_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Append a u32 length prefix followed by the bytes
    pub fn put_string(&mut self, bytes: impl AsRef<[u8]>) -> &mut Self {
        let bytes = bytes.as_ref();
        if self.put_len(bytes.len()) {
            self.buf.extend_from_slice(bytes);
        }
        self
    }

    fn put_len(&mut self, len: usize) -> bool {
        match u32::try_from(len) {
            Ok(len) => {
                self.put_u32(len);
                true
            }
            Err(_) => {
                self.oversized.get_or_insert(len);
                false
            }
        }
    }

    /// Append a big-endian magnitude as a canonical mpint
    pub fn put_mpint(&mut self, magnitude: &[u8]) -> &mut Self {
        self.put_string(mpint_bytes(magnitude))
    }

    /// Render a nested body with `f` and append it as a length-prefixed string
    pub fn put_sub_writer(&mut self, f: impl FnOnce(&mut Writer)) -> &mut Self {
        let mut nested = Writer::new();
        f(&mut nested);
        if let Some(len) = nested.oversized {
            self.oversized.get_or_insert(len);
        }
        self.put_string(nested.buf)
    }
}
