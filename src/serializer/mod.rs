//! Reply-side wire serialization: little-endian primitives and the shared
//! payload blocks written after the 60-byte header.

pub mod frame;
pub mod ops;

use std::io::{Result, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use crate::fcb::FcbName;

/// Serializes a `u8`.
pub fn u8(dest: &mut impl Write, v: u8) -> Result<()> {
    dest.write_u8(v)
}

/// Serializes a `u16` in little-endian order.
pub fn u16(dest: &mut impl Write, v: u16) -> Result<()> {
    dest.write_u16::<LittleEndian>(v)
}

/// Serializes a `u32` in little-endian order.
pub fn u32(dest: &mut impl Write, v: u32) -> Result<()> {
    dest.write_u32::<LittleEndian>(v)
}

/// Serializes an 11-byte FCB name block.
pub fn fcb(dest: &mut impl Write, name: &FcbName) -> Result<()> {
    dest.write_all(name.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::{u16, u32};

    #[test]
    fn test_integers_are_little_endian() {
        let mut out = Vec::new();
        u16(&mut out, 0x1234).unwrap();
        u32(&mut out, 0x8000_0001).unwrap();
        assert_eq!(out, [0x34, 0x12, 0x01, 0x00, 0x00, 0x80]);
    }
}
