use thiserror::Error;

/// Errors produced while parsing bencoded data.
///
/// All variants are fatal: the decoder never returns a partial value.
#[derive(Debug, Error)]
pub enum BencodeError {
    /// Input ended inside a value, a length prefix, or a container.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// An integer token was empty, had leading zeros, or did not parse.
    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    /// A byte string's length prefix was missing or not a decimal number.
    #[error("invalid string length prefix")]
    InvalidLength,

    /// A value began with a byte that does not open any bencode type.
    #[error("unexpected byte 0x{0:02x}")]
    UnexpectedByte(u8),

    /// A dictionary key was not a byte string.
    #[error("dictionary key is not a byte string")]
    NonStringKey,

    /// The input continued past the end of the outermost value.
    #[error("trailing data after value")]
    TrailingData,

    /// Containers were nested beyond the decoder's depth limit.
    #[error("nesting too deep")]
    NestingTooDeep,
}
