//! Per-opcode reply payload writers.

use std::io::{Result, Write};

use crate::fs::FileProps;
use crate::serializer::{fcb, u16, u32, u8};

/// Serializes the found-file block shared by FINDFIRST and FINDNEXT:
/// attribute, FCB name, timestamp, size, then the directory handle and the
/// 1-based cursor of the match.
pub fn found_file(dest: &mut impl Write, props: &FileProps, dir_id: u16, cursor: u16) -> Result<()> {
    file_props(dest, props)?;
    u16(dest, dir_id)?;
    u16(dest, cursor)
}

/// Serializes an OPEN / CREATE / SPOPNFIL result: the file properties, the
/// assigned file id, the special-open result and the effective open mode.
pub fn open_result(
    dest: &mut impl Write,
    props: &FileProps,
    file_id: u16,
    spop_result: u16,
    open_mode: u8,
) -> Result<()> {
    file_props(dest, props)?;
    u16(dest, file_id)?;
    u16(dest, spop_result)?;
    u8(dest, open_mode)
}

/// Serializes a GETATTR result: timestamp, size, attribute.
pub fn attr_result(dest: &mut impl Write, props: &FileProps) -> Result<()> {
    u32(dest, props.dos_time)?;
    u32(dest, props.size)?;
    u8(dest, props.attr)
}

/// Serializes the DISKSPACE geometry words: total clusters (BX), bytes per
/// sector (CX), free clusters (DX). The media/sectors word goes in AX.
pub fn disk_geometry(
    dest: &mut impl Write,
    total_clusters: u16,
    bytes_per_sector: u16,
    free_clusters: u16,
) -> Result<()> {
    u16(dest, total_clusters)?;
    u16(dest, bytes_per_sector)?;
    u16(dest, free_clusters)
}

fn file_props(dest: &mut impl Write, props: &FileProps) -> Result<()> {
    u8(dest, props.attr)?;
    fcb(dest, &props.fcb_name)?;
    u32(dest, props.dos_time)?;
    u32(dest, props.size)
}

#[cfg(test)]
mod tests {
    use super::{attr_result, disk_geometry, found_file, open_result};
    use crate::fcb::FcbName;
    use crate::fs::FileProps;

    fn props() -> FileProps {
        FileProps {
            fcb_name: FcbName::from_name(b"hello.txt"),
            attr: 0x20,
            size: 0x0102_0304,
            dos_time: 0x0A0B_0C0D,
        }
    }

    #[test]
    fn test_found_file_layout() {
        let mut out = Vec::new();
        found_file(&mut out, &props(), 7, 1).unwrap();
        assert_eq!(out.len(), 24);
        assert_eq!(out[0], 0x20);
        assert_eq!(&out[1..12], b"HELLO   TXT");
        assert_eq!(&out[12..16], &[0x0D, 0x0C, 0x0B, 0x0A]);
        assert_eq!(&out[16..20], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&out[20..22], &[7, 0]);
        assert_eq!(&out[22..24], &[1, 0]);
    }

    #[test]
    fn test_open_result_layout() {
        let mut out = Vec::new();
        open_result(&mut out, &props(), 0x0102, 3, 2).unwrap();
        assert_eq!(out.len(), 25);
        assert_eq!(&out[20..22], &[0x02, 0x01]);
        assert_eq!(&out[22..24], &[3, 0]);
        assert_eq!(out[24], 2);
    }

    #[test]
    fn test_attr_result_layout() {
        let mut out = Vec::new();
        attr_result(&mut out, &props()).unwrap();
        assert_eq!(out.len(), 9);
        assert_eq!(&out[..4], &[0x0D, 0x0C, 0x0B, 0x0A]);
        assert_eq!(&out[4..8], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(out[8], 0x20);
    }

    #[test]
    fn test_disk_geometry_layout() {
        let mut out = Vec::new();
        disk_geometry(&mut out, 0xFFFF, 32768, 0x8000).unwrap();
        assert_eq!(out, [0xFF, 0xFF, 0x00, 0x80, 0x00, 0x80]);
    }
}
