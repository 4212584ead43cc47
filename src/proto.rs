//! EtherDFS wire protocol constants.
//!
//! Every request and reply is a single Ethernet frame with a 60-byte fixed
//! header followed by an opcode-specific payload. All multi-byte integers on
//! the wire are little-endian.

use num_derive::FromPrimitive;

/// Ethertype carried by every EtherDFS frame (big-endian on the wire).
pub const ETHERTYPE_DFS: u16 = 0xEDF5;

/// Protocol version expected in the low 7 bits of the protocol byte.
pub const PROTO_VERSION: u8 = 2;

/// Fixed header length; frames shorter than this are dropped.
pub const HEADER_LEN: usize = 60;

/// Largest frame this server assembles or caches.
pub const MAX_FRAME_LEN: usize = 1520;

/// Receive buffer size, sufficient for a maximum Ethernet frame.
pub const RECV_BUFFER_LEN: usize = 2048;

/// The Ethernet broadcast address.
pub const BROADCAST_MAC: [u8; 6] = [0xFF; 6];

/// Byte offsets of the fixed header fields.
pub mod off {
    /// Destination MAC (6 bytes).
    pub const DST_MAC: usize = 0;
    /// Source MAC (6 bytes).
    pub const SRC_MAC: usize = 6;
    /// Ethertype, big-endian u16.
    pub const ETHERTYPE: usize = 12;
    /// Authoritative frame length, little-endian u16 (0 = use received length).
    pub const LENGTH: usize = 52;
    /// BSD checksum over bytes 56..end, little-endian u16.
    pub const CHECKSUM: usize = 54;
    /// Low 7 bits protocol version, high bit checksum-enabled flag.
    pub const PROTO: usize = 56;
    /// Opaque sequence byte, echoed in the reply.
    pub const SEQ: usize = 57;
    /// Low 5 bits drive index (0 = A:), high 3 bits unused flags.
    pub const DRIVE: usize = 58;
    /// Opcode (AL register value on the client side).
    pub const OPCODE: usize = 59;
    /// AX result word of a reply, little-endian u16. Deliberately overlaps
    /// the echoed drive/opcode bytes.
    pub const AX: usize = 58;
}

/// DOS attribute bits as used in `FileProps` and attribute requests.
pub const ATTR_READ_ONLY: u8 = 0x01;
pub const ATTR_HIDDEN: u8 = 0x02;
pub const ATTR_SYSTEM: u8 = 0x04;
pub const ATTR_VOLUME: u8 = 0x08;
pub const ATTR_DIRECTORY: u8 = 0x10;
pub const ATTR_ARCHIVE: u8 = 0x20;

/// Request opcodes, carried in the last header byte.
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum Opcode {
    /// Presence probe; acknowledged with an empty success reply.
    InstallCheck = 0x00,
    RmDir = 0x01,
    MkDir = 0x03,
    ChDir = 0x05,
    /// Close is a no-op: handles are reclaimed by the LRU policy.
    CloseFile = 0x06,
    CommitFile = 0x07,
    ReadFile = 0x08,
    WriteFile = 0x09,
    /// Advisory only, never enforced.
    LockFile = 0x0A,
    UnlockFile = 0x0B,
    DiskSpace = 0x0C,
    SetAttr = 0x0E,
    GetAttr = 0x0F,
    Rename = 0x11,
    Delete = 0x13,
    Open = 0x16,
    Create = 0x17,
    FindFirst = 0x1B,
    FindNext = 0x1C,
    SeekFromEnd = 0x21,
    /// Known to exist on the wire, not supported; silently ignored.
    Unsupported2D = 0x2D,
    SpecialOpen = 0x2E,
}

/// DOS-style result codes surfaced in the AX word of a reply.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DosError {
    FileNotFound,
    PathNotFound,
    AccessDenied,
    NoMoreFiles,
    WriteFault,
}

impl DosError {
    /// The AX value for this error.
    pub fn code(self) -> u16 {
        match self {
            DosError::FileNotFound => 2,
            DosError::PathNotFound => 3,
            DosError::AccessDenied => 5,
            DosError::NoMoreFiles => 0x12,
            DosError::WriteFault => 29,
        }
    }
}

/// Computes the BSD checksum of `data`: rotate the 16-bit accumulator right
/// by one, then add the next byte, for every byte.
pub fn bsd_sum(data: &[u8]) -> u16 {
    let mut acc: u16 = 0;
    for byte in data {
        acc = acc.rotate_right(1).wrapping_add(u16::from(*byte));
    }
    acc
}

#[cfg(test)]
mod tests {
    use num_traits::FromPrimitive;

    use super::{bsd_sum, DosError, Opcode};

    #[test]
    fn test_bsd_sum_empty() {
        assert_eq!(bsd_sum(&[]), 0);
    }

    #[test]
    fn test_bsd_sum_single_byte() {
        assert_eq!(bsd_sum(&[1]), 1);
    }

    #[test]
    fn test_bsd_sum_rotates_before_adding() {
        // 1 -> rotate(1) = 0x8000, + 0 = 0x8000
        assert_eq!(bsd_sum(&[1, 0]), 0x8000);
        // 0x8000 -> rotate = 0x4000, + 2 = 0x4002
        assert_eq!(bsd_sum(&[1, 0, 2]), 0x4002);
    }

    #[test]
    fn test_opcode_from_wire_byte() {
        assert_eq!(Opcode::from_u8(0x1B), Some(Opcode::FindFirst));
        assert_eq!(Opcode::from_u8(0x2E), Some(Opcode::SpecialOpen));
        assert_eq!(Opcode::from_u8(0x42), None);
    }

    #[test]
    fn test_dos_error_codes() {
        assert_eq!(DosError::FileNotFound.code(), 2);
        assert_eq!(DosError::NoMoreFiles.code(), 0x12);
        assert_eq!(DosError::WriteFault.code(), 29);
    }
}
