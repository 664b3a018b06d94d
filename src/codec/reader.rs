use super::{CodecResult, Error};

/// Cursor over a borrowed byte buffer.
///
/// Every read is bounds checked; a failed read leaves the cursor where it
/// was. Sub-readers returned by [`Reader::read_sub_reader`] can never see
/// bytes outside their declared extent.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Offset of the cursor from the start of this reader's buffer
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Read exactly `len` raw bytes
    pub fn read_bytes(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(Error::Truncated {
                needed: len,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> CodecResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u32(&mut self) -> CodecResult<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> CodecResult<u64> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    /// Read a u32 length prefix followed by that many bytes
    pub fn read_string(&mut self) -> CodecResult<&'a [u8]> {
        let start = self.pos;
        let declared = self.read_u32()? as usize;
        if declared > self.remaining() {
            let remaining = self.remaining();
            self.pos = start;
            return Err(Error::LengthOverflow {
                declared,
                remaining,
            });
        }
        self.read_bytes(declared)
    }

    /// Read a length-prefixed string and hand it back as a bounded reader
    pub fn read_sub_reader(&mut self) -> CodecResult<Reader<'a>> {
        Ok(Reader::new(self.read_string()?))
    }

    /// Read an mpint and return its magnitude without leading zero bytes
    pub fn read_mpint(&mut self) -> CodecResult<&'a [u8]> {
        let raw = self.read_string()?;
        let start = raw.iter().position(|&b| b != 0).unwrap_or(raw.len());
        Ok(&raw[start..])
    }

    /// Require that every byte has been consumed
    pub fn finish(&self) -> CodecResult<()> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(Error::TrailingBytes { remaining }),
        }
    }
}
