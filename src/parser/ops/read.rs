//! Arguments of the READFIL operation.

use crate::parser::primitive::{u16, u32};
use crate::parser::{Error, Result};

#[derive(Debug, PartialEq, Eq)]
pub struct Args {
    pub offset: u32,
    pub file_id: u16,
    pub len: u16,
}

/// Parses a READFIL payload, which is exactly eight bytes.
pub fn args(payload: &[u8]) -> Result<Args> {
    if payload.len() != 8 {
        return Err(Error::BadLength);
    }
    let mut src = payload;
    Ok(Args { offset: u32(&mut src)?, file_id: u16(&mut src)?, len: u16(&mut src)? })
}
