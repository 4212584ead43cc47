//! Arguments of the FINDNEXT operation: the directory handle and cursor
//! from the previous search step, plus the attribute byte and FCB mask.

use crate::fcb::FcbName;
use crate::parser::primitive::{fcb, u16, u8};
use crate::parser::{Error, Result};

#[derive(Debug, PartialEq, Eq)]
pub struct Args {
    pub dir_id: u16,
    pub cursor: u16,
    pub attr: u8,
    pub mask: FcbName,
}

pub fn args(payload: &[u8]) -> Result<Args> {
    if payload.len() < 16 {
        return Err(Error::BadLength);
    }
    let mut src = payload;
    Ok(Args {
        dir_id: u16(&mut src)?,
        cursor: u16(&mut src)?,
        attr: u8(&mut src)?,
        mask: fcb(&mut src)?,
    })
}

#[cfg(test)]
mod tests {
    use super::args;

    #[test]
    fn test_find_next_args() {
        #[rustfmt::skip]
        let mut payload = vec![
            0x05, 0x00,  // dir id 5
            0x03, 0x00,  // cursor 3
            0x00,        // attr
        ];
        payload.extend_from_slice(b"????????TXT");
        let args = args(&payload).unwrap();
        assert_eq!(args.dir_id, 5);
        assert_eq!(args.cursor, 3);
        assert_eq!(args.attr, 0);
        assert_eq!(args.mask.as_bytes(), b"????????TXT");
    }

    #[test]
    fn test_truncated_mask_is_rejected() {
        assert!(args(&[0; 15]).is_err());
    }
}
