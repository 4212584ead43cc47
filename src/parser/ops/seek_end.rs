//! Arguments of the SKFMEND operation: a signed offset relative to the end
//! of the file behind a handle.

use crate::parser::primitive::{i32, u16};
use crate::parser::{Error, Result};

#[derive(Debug, PartialEq, Eq)]
pub struct Args {
    pub offset: i32,
    pub file_id: u16,
}

/// Parses a SKFMEND payload, which is exactly six bytes.
pub fn args(payload: &[u8]) -> Result<Args> {
    if payload.len() != 6 {
        return Err(Error::BadLength);
    }
    let mut src = payload;
    Ok(Args { offset: i32(&mut src)?, file_id: u16(&mut src)? })
}

#[cfg(test)]
mod tests {
    use super::args;

    #[test]
    fn test_seek_args() {
        #[rustfmt::skip]
        const DATA: &[u8] = &[
            0xF6, 0xFF, 0xFF, 0xFF,  // offset -10
            0x09, 0x00,              // file id 9
        ];
        let args = args(DATA).unwrap();
        assert_eq!(args.offset, -10);
        assert_eq!(args.file_id, 9);
    }

    #[test]
    fn test_wrong_size_is_rejected() {
        assert!(args(&[0; 5]).is_err());
        assert!(args(&[0; 7]).is_err());
    }
}
