use thiserror::Error;

/// Bounds errors raised while reading or writing wire data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A fixed-width read needed more bytes than were left
    #[error("Truncated input: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// A length prefix declared more bytes than were left
    #[error("Declared length {declared} exceeds the {remaining} remaining bytes")]
    LengthOverflow { declared: usize, remaining: usize },

    /// A bounded structure was not consumed completely
    #[error("{remaining} unexpected trailing bytes")]
    TrailingBytes { remaining: usize },

    /// A string does not fit behind a u32 length prefix
    #[error("String of {len} bytes exceeds the u32 length prefix")]
    StringTooLong { len: usize },
}
