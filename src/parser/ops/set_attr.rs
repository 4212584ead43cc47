//! Arguments of the SETATTR operation: the attribute byte to stamp and the
//! target path.

use crate::parser::primitive::dos_path;
use crate::parser::{Error, Result};

#[derive(Debug, PartialEq, Eq)]
pub struct Args {
    pub attr: u8,
    pub path: Vec<u8>,
}

pub fn args(payload: &[u8]) -> Result<Args> {
    if payload.len() < 2 {
        return Err(Error::BadLength);
    }
    let (&attr, path) = payload.split_first().ok_or(Error::BadLength)?;
    Ok(Args { attr, path: dos_path(path) })
}
