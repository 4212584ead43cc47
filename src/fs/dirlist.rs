//! Cached directory listings and FCB-mask search.
//!
//! A directory handle's listing is enumerated once, on the first FindFirst,
//! and reused by FindNext until the handle is evicted. The iteration cursor
//! on the wire is the 1-based index of the last entry returned.

use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use crate::fcb::FcbName;
use crate::fs::attr;
use crate::fs::handles::HandleDb;
use crate::fs::FileProps;
use crate::proto::{ATTR_DIRECTORY, ATTR_HIDDEN, ATTR_SYSTEM, ATTR_VOLUME};

/// Candidate attribute bits a client must ask for explicitly.
const ATTR_RESTRICTED: u8 = ATTR_HIDDEN | ATTR_SYSTEM | ATTR_DIRECTORY;

/// How a search interprets the listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchFlags {
    /// The directory is a drive root: DOS roots have no `.` or `..`.
    pub is_root: bool,
    /// The drive is FAT-mounted, so entries carry real attribute bits.
    pub is_fat: bool,
}

/// Searches the cached listing of directory handle `dir_id` for the entry
/// after `cursor` matching `mask` and the attribute filter. A zero cursor
/// (or a listing lost to eviction) re-enumerates the directory first.
///
/// Returns the matched entry and the new cursor, or `None` when the handle
/// is stale, the directory cannot be read, or no entry is left.
pub fn find_file(
    db: &mut HandleDb,
    dir_id: u16,
    mask: &FcbName,
    attr: u8,
    cursor: u16,
    flags: SearchFlags,
) -> Option<(FileProps, u16)> {
    let slot = db.slot_mut(dir_id)?;
    if cursor == 0 || slot.dir_list.is_none() {
        slot.dir_list = None;
        let path = slot.name.clone()?;
        slot.dir_list = Some(enumerate(&path, flags.is_fat).ok()?);
    }

    let list = slot.dir_list.as_deref()?;
    for (i, entry) in list.iter().enumerate().skip(usize::from(cursor)) {
        if flags.is_root && entry.fcb_name.is_dot_entry() {
            continue;
        }
        if !entry.fcb_name.matches(mask) {
            continue;
        }
        if attr == ATTR_VOLUME {
            // an explicit volume-label search matches only the volume bit
            if entry.attr & ATTR_VOLUME == 0 {
                continue;
            }
        } else if (attr | (entry.attr & ATTR_RESTRICTED)) != attr {
            continue;
        }
        return Some((*entry, (i + 1) as u16));
    }
    None
}

/// Enumerates `dir` into DOS-facing entries, `.` and `..` first, the rest in
/// host order. Entries that vanish mid-scan are skipped.
fn enumerate(dir: &Path, is_fat: bool) -> io::Result<Vec<FileProps>> {
    let mut list = Vec::new();
    for dot in [&b"."[..], &b".."[..]] {
        let target = dir.join(std::ffi::OsStr::from_bytes(dot));
        if let Some(item) = attr::get_attr_named(&target, dot, is_fat) {
            list.push(item.props);
        }
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if let Some(item) = attr::get_attr_named(&entry.path(), name.as_bytes(), is_fat) {
            list.push(item.props);
        }
    }
    Ok(list)
}
