//! The frame-level request lifecycle.
//!
//! One engine owns the process-wide state: the drive table, the handle
//! database and the reply cache. [`Engine::handle_frame`] takes a raw
//! received frame through validation, retransmit lookup, dispatch and reply
//! finalization, and hands back the frame to put on the wire, if any.

use tracing::debug;

use crate::dispatch::{dispatch, Outcome};
use crate::fs::handles::HandleDb;
use crate::fs::DriveTable;
use crate::parser::frame::validate;
use crate::proto::off;
use crate::reply_cache::ReplyCache;
use crate::serializer::frame::{begin_reply, finalize};

/// The single-threaded protocol engine.
#[derive(Debug)]
pub struct Engine {
    drives: DriveTable,
    handles: HandleDb,
    cache: ReplyCache,
    local_mac: [u8; 6],
}

impl Engine {
    pub fn new(drives: DriveTable, local_mac: [u8; 6]) -> Self {
        Self { drives, handles: HandleDb::new(), cache: ReplyCache::new(), local_mac }
    }

    pub fn local_mac(&self) -> [u8; 6] {
        self.local_mac
    }

    pub fn drives(&self) -> &DriveTable {
        &self.drives
    }

    /// Processes one received frame. Returns the finalized reply to send,
    /// or `None` when the frame is dropped.
    ///
    /// A retransmit (same client MAC and sequence byte as the cached reply)
    /// is answered from the cache without touching the host filesystem. The
    /// length and checksum fields are stamped per the *current* request's
    /// checksum flag either way.
    pub fn handle_frame(&mut self, buf: &[u8]) -> Option<&[u8]> {
        let frame = validate(buf, &self.local_mac)?;
        let request = &buf[..frame.len];

        let Self { drives, handles, cache, local_mac } = self;
        let slot = cache.slot_for(&request[off::SRC_MAC..off::SRC_MAC + 6]);

        if slot.answers(request) {
            debug!(seq = frame.seq, "retransmit answered from cache");
            let len = slot.len;
            slot.store(len);
            finalize(&mut slot.frame[..], len, frame.checksummed);
            return Some(&slot.frame[..len]);
        }

        begin_reply(&mut slot.frame[..], request, local_mac);
        match dispatch(drives, handles, request, &mut slot.frame[..]) {
            Outcome::Reply(len) => {
                slot.store(len);
                finalize(&mut slot.frame[..], len, frame.checksummed);
                Some(&slot.frame[..len])
            }
            Outcome::Ignore => {
                slot.poison();
                None
            }
        }
    }
}
