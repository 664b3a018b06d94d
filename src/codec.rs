//! SSH-style wire primitives: big-endian integers and u32 length-prefixed
//! strings, as used by the KRL format and by SSH public key blobs.

mod errors;
mod reader;
mod writer;

pub use errors::Error;
pub use reader::Reader;
pub use writer::Writer;

pub(crate) type CodecResult<T> = Result<T, Error>;

/// Strip a big-endian magnitude down to its canonical SSH mpint body:
/// no redundant leading zeros, plus a single zero byte when the top bit is
/// set so the value stays positive.
pub fn mpint_bytes(magnitude: &[u8]) -> Vec<u8> {
    let start = magnitude
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(magnitude.len());
    let trimmed = &magnitude[start..];

    let mut out = Vec::with_capacity(trimmed.len() + 1);
    if trimmed.first().is_some_and(|&b| b & 0x80 != 0) {
        out.push(0x00);
    }
    out.extend_from_slice(trimmed);
    out
}
