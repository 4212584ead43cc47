//! File and disk primitives behind the dispatcher.
//!
//! Files are reopened per request; the handle database stores paths, never
//! descriptors, so an evicted handle costs nothing but a failed lookup.

use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::FileExt;
use std::path::Path;

use crate::fcb::FcbName;
use crate::fs::attr::{self, ItemAttr};

/// Reads up to `buf.len()` bytes at `offset`. Short reads happen at end of
/// file; a read error after a successful open reports zero bytes.
pub fn read_file(path: &Path, offset: u32, buf: &mut [u8]) -> io::Result<usize> {
    let file = File::open(path)?;
    let mut done = 0;
    while done < buf.len() {
        match file.read_at(&mut buf[done..], u64::from(offset) + done as u64) {
            Ok(0) => break,
            Ok(n) => done += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => break,
        }
    }
    Ok(done)
}

/// Writes `data` at `offset` into an existing file and returns the byte
/// count. Empty data means "set the file length to `offset`" instead.
pub fn write_file(path: &Path, offset: u32, data: &[u8]) -> io::Result<u16> {
    let file = OpenOptions::new().read(true).write(true).open(path)?;
    if data.is_empty() {
        file.set_len(u64::from(offset))?;
        return Ok(0);
    }
    file.write_all_at(data, u64::from(offset))?;
    Ok(data.len() as u16)
}

/// Creates or truncates `path`, stamps `attr` on FAT drives, and returns the
/// resulting item properties.
pub fn create_file(path: &Path, attr_bits: u8, is_fat: bool) -> Option<ItemAttr> {
    File::create(path).ok()?;
    if is_fat {
        // attribute stamping is best-effort, like the creation mode itself
        let _ = attr::set_attr(path, attr_bits);
    }
    attr::get_attr(path, is_fat)
}

/// Unlinks every non-directory entry of `dir` whose FCB name matches `mask`.
/// Succeeds even when nothing matches; per-entry unlink failures are skipped.
pub fn delete_matching(dir: &Path, mask: &FcbName) -> io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(true) {
            continue;
        }
        if FcbName::from_name(entry.file_name().as_bytes()).matches(mask) {
            let _ = std::fs::remove_file(entry.path());
        }
    }
    Ok(())
}

/// Creates a directory with mode 0, as DOS clients expect.
pub fn make_dir(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new().mode(0).create(path)
}

/// Total and free bytes of the filesystem holding `path`; zeros when the
/// host refuses to answer.
pub fn disk_space(path: &Path) -> (u64, u64) {
    let Ok(path) = CString::new(path.as_os_str().as_bytes()) else {
        return (0, 0);
    };
    let mut buf: libc::statvfs = unsafe { std::mem::zeroed() };
    if unsafe { libc::statvfs(path.as_ptr(), &mut buf) } < 0 {
        return (0, 0);
    }
    let total = u64::from(buf.f_blocks) * u64::from(buf.f_frsize);
    let free = u64::from(buf.f_bfree) * u64::from(buf.f_bsize);
    (total, free)
}

/// The current size of the item behind an open-file handle.
pub fn file_size(path: &Path) -> Option<u32> {
    attr::get_attr(path, false).map(|item| item.props.size)
}
