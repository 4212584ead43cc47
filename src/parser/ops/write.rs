//! Arguments of the WRITEFIL operation.

use crate::parser::primitive::{u16, u32};
use crate::parser::{Error, Result};

#[derive(Debug, PartialEq, Eq)]
pub struct Args<'a> {
    pub offset: u32,
    pub file_id: u16,
    /// Bytes to write; empty means "truncate the file to `offset`".
    pub data: &'a [u8],
}

pub fn args(payload: &[u8]) -> Result<Args<'_>> {
    if payload.len() < 6 {
        return Err(Error::BadLength);
    }
    let (mut head, data) = payload.split_at(6);
    Ok(Args { offset: u32(&mut head)?, file_id: u16(&mut head)?, data })
}
