//! The per-client last-reply cache.
//!
//! EtherDFS clients retransmit a request verbatim when a reply is lost; the
//! sequence byte only changes for a new request. Keeping the last assembled
//! reply per client MAC turns retransmits into pure resends, never a second
//! dispatch. This deduplicates retransmits only; it is not response
//! memoization.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::proto::{off, MAX_FRAME_LEN};

/// Number of cache slots; a miss with a full cache overwrites the oldest.
pub const SLOT_COUNT: usize = 16;

/// One cached reply. The destination MAC at the start of the frame is the
/// client the slot belongs to.
#[derive(Debug)]
pub struct CacheSlot {
    pub frame: Box<[u8; MAX_FRAME_LEN]>,
    /// Stored reply length; zero poisons the slot so a retransmit is
    /// dispatched again.
    pub len: usize,
    timestamp: u64,
}

impl CacheSlot {
    fn new() -> Self {
        Self { frame: Box::new([0; MAX_FRAME_LEN]), len: 0, timestamp: 0 }
    }

    /// True when this slot already answers `request`: same client, same
    /// sequence byte, and a non-poisoned stored reply.
    pub fn answers(&self, request: &[u8]) -> bool {
        self.len > 0
            && self.frame[off::SEQ] == request[off::SEQ]
            && self.frame[..6] == request[off::SRC_MAC..off::SRC_MAC + 6]
    }

    /// Records a freshly dispatched reply length.
    pub fn store(&mut self, len: usize) {
        self.len = len;
        self.timestamp = unix_now();
    }

    /// Marks the slot unusable for retransmit hits.
    pub fn poison(&mut self) {
        self.len = 0;
    }
}

/// Fixed array of reply slots, one per recently seen client.
#[derive(Debug)]
pub struct ReplyCache {
    slots: Vec<CacheSlot>,
}

impl ReplyCache {
    pub fn new() -> Self {
        Self { slots: (0..SLOT_COUNT).map(|_| CacheSlot::new()).collect() }
    }

    /// The slot owned by `client_mac`, or the oldest slot for eviction when
    /// the client is new.
    pub fn slot_for(&mut self, client_mac: &[u8]) -> &mut CacheSlot {
        let mut oldest = 0;
        let mut found = None;
        for (i, slot) in self.slots.iter().enumerate() {
            if slot.frame[..6] == *client_mac {
                found = Some(i);
                break;
            }
            if slot.timestamp < self.slots[oldest].timestamp {
                oldest = i;
            }
        }
        &mut self.slots[found.unwrap_or(oldest)]
    }
}

impl Default for ReplyCache {
    fn default() -> Self {
        Self::new()
    }
}

fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}
