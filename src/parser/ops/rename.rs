//! Arguments of the RENAME operation: a length-prefixed source path
//! followed by the destination path.

use crate::parser::primitive::dos_path;
use crate::parser::{Error, Result};

#[derive(Debug, PartialEq, Eq)]
pub struct Args {
    pub src: Vec<u8>,
    pub dst: Vec<u8>,
}

/// Parses a RENAME payload. A length prefix pointing past the payload end
/// yields [`Error::BadLengthPrefix`], which the dispatcher answers with
/// "file not found" rather than dropping the frame.
pub fn args(payload: &[u8]) -> Result<Args> {
    let (&src_len, rest) = payload.split_first().ok_or(Error::BadLength)?;
    let src_len = usize::from(src_len);
    if rest.len() < src_len {
        return Err(Error::BadLengthPrefix);
    }
    let (src, dst) = rest.split_at(src_len);
    Ok(Args { src: dos_path(src), dst: dos_path(dst) })
}

#[cfg(test)]
mod tests {
    use super::args;
    use crate::parser::Error;

    #[test]
    fn test_rename_args() {
        let mut payload = vec![8u8];
        payload.extend_from_slice(b"\\OLD.TXT");
        payload.extend_from_slice(b"\\NEW.TXT");
        let args = args(&payload).unwrap();
        assert_eq!(args.src, b"/old.txt");
        assert_eq!(args.dst, b"/new.txt");
    }

    #[test]
    fn test_overlong_prefix_is_flagged() {
        assert!(matches!(args(&[200, b'a', b'b']), Err(Error::BadLengthPrefix)));
    }

    #[test]
    fn test_empty_destination_is_allowed() {
        let mut payload = vec![2u8];
        payload.extend_from_slice(b"\\a");
        let args = args(&payload).unwrap();
        assert_eq!(args.src, b"/a");
        assert!(args.dst.is_empty());
    }
}
