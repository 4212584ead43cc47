//! 11-byte FCB-style filenames (8-character name, 3-character extension,
//! space-padded, uppercase) and the wildcard matching DOS clients expect.

use std::fmt;

/// Length of an FCB name block on the wire.
pub const FCB_LEN: usize = 11;

/// A fixed-layout DOS filename as used in File Control Blocks.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FcbName([u8; FCB_LEN]);

impl FcbName {
    /// Builds an FCB block from a long filename (or search mask).
    ///
    /// Embedded spaces are skipped and characters are uppercased. A leading
    /// run of dots (the `.` and `..` entries) is preserved verbatim. The
    /// extension is taken from after the last dot. A `*` fills the rest of
    /// its field with `?`, so `*.*` becomes eleven question marks.
    pub fn from_name(name: &[u8]) -> Self {
        let mut fcb = [b' '; FCB_LEN];

        // '.' and '..' keep their dots in the name field
        let mut leading = 0;
        while leading < 8 && name.get(leading) == Some(&b'.') {
            fcb[leading] = b'.';
            leading += 1;
        }

        let rest = &name[leading..];
        let name_part_end = rest.iter().position(|&b| b == b'.').unwrap_or(rest.len());

        let mut out = leading;
        for &byte in &rest[..name_part_end] {
            if out >= 8 {
                break;
            }
            if byte == b' ' {
                continue;
            }
            if byte == b'*' {
                while out < 8 {
                    fcb[out] = b'?';
                    out += 1;
                }
                break;
            }
            fcb[out] = byte.to_ascii_uppercase();
            out += 1;
        }

        if let Some(dot) = rest.iter().rposition(|&b| b == b'.') {
            let mut out = 8;
            for &byte in &rest[dot + 1..] {
                if out >= FCB_LEN || byte == b'.' || byte == b' ' {
                    break;
                }
                if byte == b'*' {
                    while out < FCB_LEN {
                        fcb[out] = b'?';
                        out += 1;
                    }
                    break;
                }
                fcb[out] = byte.to_ascii_uppercase();
                out += 1;
            }
        }

        FcbName(fcb)
    }

    /// Wraps an FCB block received verbatim from the wire.
    pub fn from_bytes(raw: [u8; FCB_LEN]) -> Self {
        FcbName(raw)
    }

    /// Matches this name against an FCB mask: character-wise,
    /// case-insensitive, with `?` matching any single character.
    pub fn matches(&self, mask: &FcbName) -> bool {
        self.0
            .iter()
            .zip(mask.0.iter())
            .all(|(&c, &m)| m == b'?' || c.to_ascii_uppercase() == m.to_ascii_uppercase())
    }

    /// True for the `.` and `..` directory entries.
    pub fn is_dot_entry(&self) -> bool {
        self.0[0] == b'.'
    }

    pub fn as_bytes(&self) -> &[u8; FCB_LEN] {
        &self.0
    }
}

impl fmt::Debug for FcbName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FcbName({:?})", String::from_utf8_lossy(&self.0))
    }
}
