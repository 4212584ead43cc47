//! Arguments of the FINDFIRST operation: a requested attribute byte and the
//! full search path with the mask as its last component.

use crate::parser::primitive::dos_path;
use crate::parser::{Error, Result};

#[derive(Debug, PartialEq, Eq)]
pub struct Args {
    pub attr: u8,
    /// Normalized drive-relative directory-plus-mask path.
    pub spec: Vec<u8>,
}

pub fn args(payload: &[u8]) -> Result<Args> {
    let (&attr, spec) = payload.split_first().ok_or(Error::BadLength)?;
    Ok(Args { attr, spec: dos_path(spec) })
}

#[cfg(test)]
mod tests {
    use super::args;

    #[test]
    fn test_find_first_args() {
        let mut payload = vec![0x10u8];
        payload.extend_from_slice(b"C:\\SUB\\*.TXT");
        let args = args(&payload).unwrap();
        assert_eq!(args.attr, 0x10);
        assert_eq!(args.spec, b"/sub/*.txt");
    }

    #[test]
    fn test_empty_payload_is_rejected() {
        assert!(args(&[]).is_err());
    }
}
