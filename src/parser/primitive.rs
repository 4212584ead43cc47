//! Primitive wire readers and DOS path normalization.

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::fcb::{FcbName, FCB_LEN};

use super::Result;

/// Parses a `u8` from the source.
pub fn u8(src: &mut impl Read) -> Result<u8> {
    Ok(src.read_u8()?)
}

/// Parses a little-endian `u16` from the source.
pub fn u16(src: &mut impl Read) -> Result<u16> {
    Ok(src.read_u16::<LittleEndian>()?)
}

/// Parses a little-endian `u32` from the source.
pub fn u32(src: &mut impl Read) -> Result<u32> {
    Ok(src.read_u32::<LittleEndian>()?)
}

/// Parses a little-endian `i32` from the source.
pub fn i32(src: &mut impl Read) -> Result<i32> {
    Ok(src.read_i32::<LittleEndian>()?)
}

/// Parses an 11-byte FCB name block from the source.
pub fn fcb(src: &mut impl Read) -> Result<FcbName> {
    let mut raw = [0u8; FCB_LEN];
    src.read_exact(&mut raw)?;
    Ok(FcbName::from_bytes(raw))
}

/// Normalizes a raw DOS path from the wire: an optional `X:` drive prefix is
/// stripped, backslashes become slashes, and everything is lowercased. The
/// result is a drive-relative path ready for the resolver.
pub fn dos_path(raw: &[u8]) -> Vec<u8> {
    let raw = match raw {
        [_, b':', rest @ ..] => rest,
        _ => raw,
    };
    raw.iter()
        .map(|&b| if b == b'\\' { b'/' } else { b.to_ascii_lowercase() })
        .collect()
}

/// Splits a normalized path into its directory part (up to and including the
/// last slash) and the trailing file name or search mask.
pub fn split_mask(path: &[u8]) -> (&[u8], &[u8]) {
    match path.iter().rposition(|&b| b == b'/') {
        Some(i) => path.split_at(i + 1),
        None => (&[], path),
    }
}

/// True when the drive-relative directory part denotes the drive root.
/// DOS drive roots carry no `.` or `..` entries.
pub fn is_root_dir(rel: &[u8]) -> bool {
    !rel.iter().skip_while(|&&b| b == b'/').any(|&b| b == b'/')
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{dos_path, is_root_dir, split_mask, u16, u32};

    #[test]
    fn test_integers_are_little_endian() {
        let mut src = Cursor::new(&[0x34, 0x12, 0x78, 0x56, 0x00, 0x00][..]);
        assert_eq!(u16(&mut src).unwrap(), 0x1234);
        assert_eq!(u32(&mut src).unwrap(), 0x5678);
    }

    #[test]
    fn test_short_source_is_an_error() {
        let mut src = Cursor::new(&[0x01][..]);
        assert!(u16(&mut src).is_err());
    }

    #[test]
    fn test_dos_path_normalization() {
        assert_eq!(dos_path(b"C:\\Games\\DOOM"), b"/games/doom");
        assert_eq!(dos_path(b"\\AUTOEXEC.BAT"), b"/autoexec.bat");
        assert_eq!(dos_path(b"sub\\File.TXT"), b"sub/file.txt");
    }

    #[test]
    fn test_split_mask() {
        assert_eq!(split_mask(b"/tmp/*.tmp"), (&b"/tmp/"[..], &b"*.tmp"[..]));
        assert_eq!(split_mask(b"/*.*"), (&b"/"[..], &b"*.*"[..]));
        assert_eq!(split_mask(b"plain"), (&b""[..], &b"plain"[..]));
    }

    #[test]
    fn test_root_dir_detection() {
        assert!(is_root_dir(b"/"));
        assert!(is_root_dir(b""));
        assert!(is_root_dir(b"//"));
        assert!(!is_root_dir(b"/sub/"));
        assert!(!is_root_dir(b"sub/"));
    }
}
