//! The handle database.
//!
//! Host paths are interned into a bounded table and referred to on the wire
//! by their 16-bit slot index. Clients treat these ids as opaque file and
//! directory identifiers; the server treats them as weak references: a slot
//! idle for over an hour is reclaimed, and a full table evicts its
//! least-recently-used slot. Every wire-supplied id must therefore survive a
//! failed lookup.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::fs::FileProps;

/// The id value reserved for "no handle".
pub const INVALID_HANDLE: u16 = 0xFFFF;

/// Slots idle longer than this are swept during interning.
const IDLE_EVICT_SECS: u64 = 3600;

#[derive(Debug, Default)]
pub(crate) struct Slot {
    pub(crate) name: Option<PathBuf>,
    last_used: u64,
    /// Cached directory listing, present after a FindFirst has enumerated
    /// the entry. Dropped together with the slot.
    pub(crate) dir_list: Option<Vec<FileProps>>,
}

impl Slot {
    fn clear(&mut self) {
        self.name = None;
        self.last_used = 0;
        self.dir_list = None;
    }
}

/// Fixed-capacity path interning table; see the module docs.
#[derive(Debug)]
pub struct HandleDb {
    slots: Vec<Slot>,
}

impl HandleDb {
    pub fn new() -> Self {
        Self::with_capacity(usize::from(INVALID_HANDLE))
    }

    fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::new();
        slots.resize_with(capacity, Slot::default);
        Self { slots }
    }

    /// Returns the id already assigned to `path`, or assigns one: a free
    /// slot if any, otherwise the least-recently-used slot is reclaimed.
    /// Idle slots are swept along the way. Returns [`INVALID_HANDLE`] when
    /// no slot can be produced.
    pub fn intern(&mut self, path: &Path) -> u16 {
        self.intern_at(path, unix_now())
    }

    fn intern_at(&mut self, path: &Path, now: u64) -> u16 {
        if self.slots.is_empty() {
            return INVALID_HANDLE;
        }
        let mut first_free = None;
        let mut oldest = 0;
        for i in 0..self.slots.len() {
            if self.slots[i].name.as_deref() == Some(path) {
                self.slots[i].last_used = now;
                return i as u16;
            }
            if self.slots[i].name.is_some()
                && now.saturating_sub(self.slots[i].last_used) > IDLE_EVICT_SECS
            {
                self.slots[i].clear();
            }
            if self.slots[i].name.is_none() {
                if first_free.is_none() {
                    first_free = Some(i);
                }
            } else if self.slots[i].last_used < self.slots[oldest].last_used {
                oldest = i;
            }
        }

        let index = match first_free {
            Some(i) => i,
            None => {
                self.slots[oldest].clear();
                oldest
            }
        };
        self.slots[index].name = Some(path.to_path_buf());
        self.slots[index].last_used = now;
        index as u16
    }

    /// The path behind `id`, or `None` for a stale or invalid handle.
    pub fn path(&self, id: u16) -> Option<&Path> {
        self.slots.get(usize::from(id))?.name.as_deref()
    }

    pub(crate) fn slot_mut(&mut self, id: u16) -> Option<&mut Slot> {
        let slot = self.slots.get_mut(usize::from(id))?;
        slot.name.as_ref()?;
        Some(slot)
    }
}

impl Default for HandleDb {
    fn default() -> Self {
        Self::new()
    }
}

fn unix_now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{HandleDb, INVALID_HANDLE};

    #[test]
    fn test_interning_is_stable() {
        let mut db = HandleDb::with_capacity(8);
        let a = db.intern(Path::new("/srv/c/a.txt"));
        let b = db.intern(Path::new("/srv/c/b.txt"));
        assert_ne!(a, b);
        assert_eq!(db.intern(Path::new("/srv/c/a.txt")), a);
        assert_eq!(db.path(a), Some(Path::new("/srv/c/a.txt")));
    }

    #[test]
    fn test_unknown_ids_resolve_to_nothing() {
        let db = HandleDb::with_capacity(8);
        assert_eq!(db.path(3), None);
        assert_eq!(db.path(INVALID_HANDLE), None);
    }

    #[test]
    fn test_full_table_evicts_least_recently_used() {
        let mut db = HandleDb::with_capacity(2);
        let a = db.intern_at(Path::new("/a"), 100);
        let b = db.intern_at(Path::new("/b"), 200);
        // /a is the oldest and gets reclaimed
        let c = db.intern_at(Path::new("/c"), 300);
        assert_eq!(c, a);
        assert_eq!(db.path(a), Some(Path::new("/c")));
        assert_eq!(db.path(b), Some(Path::new("/b")));
    }

    #[test]
    fn test_idle_slots_are_swept() {
        let mut db = HandleDb::with_capacity(4);
        let a = db.intern_at(Path::new("/a"), 1000);
        let b = db.intern_at(Path::new("/b"), 1000);
        // both idle for over an hour; the sweep frees them and the new
        // path reuses the first slot
        let c = db.intern_at(Path::new("/c"), 4700);
        assert_eq!(c, a);
        assert_eq!(db.path(b), None);
    }

    #[test]
    fn test_touching_a_slot_defers_its_sweep() {
        let mut db = HandleDb::with_capacity(4);
        let a = db.intern_at(Path::new("/a"), 1000);
        assert_eq!(db.intern_at(Path::new("/a"), 4000), a);
        db.intern_at(Path::new("/b"), 7000);
        assert_eq!(db.path(a), Some(Path::new("/a")));
    }
}
