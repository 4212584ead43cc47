//! Reply frame scaffolding.
//!
//! A reply starts as a copy of the request's 60-byte header with source and
//! destination MACs swapped. The dispatcher then writes the AX word and the
//! payload, and the frame is finalized with its length field and, when the
//! client asked for one, a fresh checksum.

use byteorder::{ByteOrder, LittleEndian};

use crate::proto::{bsd_sum, off, HEADER_LEN};

/// Seeds `reply` from the first 60 bytes of `request`: header echoed, the
/// requester becomes the destination, `local_mac` the source.
pub fn begin_reply(reply: &mut [u8], request: &[u8], local_mac: &[u8; 6]) {
    reply[..HEADER_LEN].copy_from_slice(&request[..HEADER_LEN]);
    reply.copy_within(off::SRC_MAC..off::SRC_MAC + 6, off::DST_MAC);
    reply[off::SRC_MAC..off::SRC_MAC + 6].copy_from_slice(local_mac);
}

/// Writes the AX result word. This overlays the echoed drive and opcode
/// bytes, which is the wire contract, not an accident.
pub fn set_ax(reply: &mut [u8], ax: u16) {
    LittleEndian::write_u16(&mut reply[off::AX..off::AX + 2], ax);
}

/// Stamps the total length and checksum fields of an assembled reply. With
/// `checksummed` unset the checksum field is zeroed and the flag cleared.
pub fn finalize(reply: &mut [u8], len: usize, checksummed: bool) {
    LittleEndian::write_u16(&mut reply[off::LENGTH..off::LENGTH + 2], len as u16);
    if checksummed {
        reply[off::PROTO] |= 0x80;
        let sum = bsd_sum(&reply[off::PROTO..len]);
        LittleEndian::write_u16(&mut reply[off::CHECKSUM..off::CHECKSUM + 2], sum);
    } else {
        reply[off::PROTO] &= 0x7F;
        reply[off::CHECKSUM] = 0;
        reply[off::CHECKSUM + 1] = 0;
    }
}

#[cfg(test)]
mod tests {
    use byteorder::{ByteOrder, LittleEndian};

    use super::{begin_reply, finalize, set_ax};
    use crate::parser::frame::validate;
    use crate::proto::{off, HEADER_LEN, MAX_FRAME_LEN};

    const SERVER: [u8; 6] = [2, 2, 2, 2, 2, 2];
    const CLIENT: [u8; 6] = [1, 1, 1, 1, 1, 1];

    fn request() -> Vec<u8> {
        let mut buf = vec![0u8; HEADER_LEN];
        buf[..6].copy_from_slice(&SERVER);
        buf[6..12].copy_from_slice(&CLIENT);
        buf[12] = 0xED;
        buf[13] = 0xF5;
        buf[off::PROTO] = 2;
        buf[off::SEQ] = 9;
        buf
    }

    #[test]
    fn test_reply_swaps_macs_and_echoes_seq() {
        let mut reply = [0u8; MAX_FRAME_LEN];
        begin_reply(&mut reply, &request(), &SERVER);
        assert_eq!(&reply[..6], &CLIENT);
        assert_eq!(&reply[6..12], &SERVER);
        assert_eq!(reply[off::SEQ], 9);
    }

    #[test]
    fn test_ax_overlays_drive_and_opcode() {
        let mut reply = [0u8; MAX_FRAME_LEN];
        begin_reply(&mut reply, &request(), &SERVER);
        set_ax(&mut reply, 0x0012);
        assert_eq!(reply[58], 0x12);
        assert_eq!(reply[59], 0x00);
    }

    #[test]
    fn test_finalized_checksummed_reply_validates() {
        let mut reply = [0u8; MAX_FRAME_LEN];
        begin_reply(&mut reply, &request(), &SERVER);
        finalize(&mut reply, HEADER_LEN, true);

        // the reply addresses the client; validate from its point of view
        let frame = validate(&reply[..HEADER_LEN], &CLIENT).unwrap();
        assert!(frame.checksummed);
        assert_eq!(frame.len, HEADER_LEN);
    }

    #[test]
    fn test_finalize_without_checksum_clears_the_field() {
        let mut reply = [0u8; MAX_FRAME_LEN];
        begin_reply(&mut reply, &request(), &SERVER);
        reply[off::PROTO] |= 0x80;
        finalize(&mut reply, HEADER_LEN, false);
        assert_eq!(reply[off::PROTO] & 0x80, 0);
        assert_eq!(LittleEndian::read_u16(&reply[off::CHECKSUM..off::CHECKSUM + 2]), 0);
    }
}
