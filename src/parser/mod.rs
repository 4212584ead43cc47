//! Request-side wire parsing: frame validation and per-opcode argument
//! decoding. All integers are little-endian; paths arrive as raw DOS byte
//! strings and are normalized here.

pub mod frame;
pub mod ops;
pub mod primitive;

use std::io;

/// Errors produced while decoding a request payload. Except where an opcode
/// defines otherwise, a payload that fails to parse is silently ignored.
#[derive(Debug)]
pub enum Error {
    /// A read ran off the end of the payload.
    IO(io::Error),
    /// The payload is shorter (or longer) than the opcode allows.
    BadLength,
    /// An embedded length prefix points past the end of the payload.
    BadLengthPrefix,
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::IO(err)
    }
}

/// Result of parsing operations with error type [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
