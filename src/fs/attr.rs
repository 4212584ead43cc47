//! The FAT attribute bridge.
//!
//! DOS attribute bits map to real filesystem facilities only when the drive
//! root lives on a FAT mount: the msdos ioctl pair on Linux, file flags on
//! FreeBSD and macOS. On any other filesystem regular files report a fake
//! archive bit and attribute writes are ignored.

use std::fs;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::time::UNIX_EPOCH;

use crate::dostime::dos_time;
use crate::fcb::FcbName;
use crate::fs::FileProps;
use crate::proto::{ATTR_ARCHIVE, ATTR_DIRECTORY};

/// Wire sizes are 32-bit; anything larger reports just under 2 GiB.
const MAX_WIRE_SIZE: u64 = 0x7FFF_FFFF;

/// Attribute byte plus the full DOS-facing properties of one item.
#[derive(Debug, Clone, Copy)]
pub struct ItemAttr {
    pub attr: u8,
    pub props: FileProps,
}

/// Stats `path` and builds its DOS attributes; `None` when the item does not
/// exist (or, on a FAT drive, cannot be opened for the attribute ioctl).
pub fn get_attr(path: &Path, is_fat: bool) -> Option<ItemAttr> {
    let name = path.file_name().unwrap_or(path.as_os_str());
    get_attr_named(path, name.as_bytes(), is_fat)
}

/// Like [`get_attr`] but with an explicit display name, for the `.` and `..`
/// entries whose joined paths would otherwise normalize the name away.
pub fn get_attr_named(path: &Path, name: &[u8], is_fat: bool) -> Option<ItemAttr> {
    let meta = fs::metadata(path).ok()?;
    let mut props = FileProps {
        fcb_name: FcbName::from_name(name),
        attr: 0,
        size: 0,
        dos_time: dos_time(meta.modified().unwrap_or(UNIX_EPOCH)),
    };

    if meta.is_dir() {
        props.attr = ATTR_DIRECTORY;
        return Some(ItemAttr { attr: ATTR_DIRECTORY, props });
    }

    props.size = meta.len().min(MAX_WIRE_SIZE) as u32;
    let attr = if is_fat { fat_attr(path)? } else { ATTR_ARCHIVE };
    props.attr = attr;
    Some(ItemAttr { attr, props })
}

/// Writes DOS attribute bits back to the host item. Callers skip this on
/// non-FAT drives.
pub fn set_attr(path: &Path, attr: u8) -> io::Result<()> {
    sys::set_fat_attr(path, attr)
}

/// True when `root` is mounted on a FAT-family filesystem.
pub fn is_fat_mount(root: &Path) -> bool {
    sys::is_fat_mount(root)
}

fn fat_attr(path: &Path) -> Option<u8> {
    sys::get_fat_attr(path)
}

#[cfg(target_os = "linux")]
mod sys {
    use std::ffi::CString;
    use std::fs::File;
    use std::io;
    use std::os::fd::AsRawFd;
    use std::os::unix::ffi::OsStrExt;
    use std::path::Path;

    // From linux/msdos_fs.h: _IOR('r', 0x10, u32) / _IOW('r', 0x11, u32).
    const FAT_IOCTL_GET_ATTRIBUTES: libc::c_ulong = 0x8004_7210;
    const FAT_IOCTL_SET_ATTRIBUTES: libc::c_ulong = 0x4004_7211;
    const MSDOS_SUPER_MAGIC: libc::c_long = 0x4d44;

    /// `None` when the file cannot be opened; attribute 0 when the ioctl is
    /// refused (non-msdos file on a FAT-marked drive).
    pub fn get_fat_attr(path: &Path) -> Option<u8> {
        let file = File::open(path).ok()?;
        let mut attr: u32 = 0;
        let res = unsafe { libc::ioctl(file.as_raw_fd(), FAT_IOCTL_GET_ATTRIBUTES, &mut attr) };
        if res < 0 {
            return Some(0);
        }
        Some(attr as u8)
    }

    pub fn set_fat_attr(path: &Path, attr: u8) -> io::Result<()> {
        let file = File::open(path)?;
        let attr = u32::from(attr);
        let res = unsafe { libc::ioctl(file.as_raw_fd(), FAT_IOCTL_SET_ATTRIBUTES, &attr) };
        if res < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    pub fn is_fat_mount(root: &Path) -> bool {
        let Ok(path) = CString::new(root.as_os_str().as_bytes()) else {
            return false;
        };
        let mut buf: libc::statfs = unsafe { std::mem::zeroed() };
        if unsafe { libc::statfs(path.as_ptr(), &mut buf) } < 0 {
            return false;
        }
        buf.f_type == MSDOS_SUPER_MAGIC
    }
}

#[cfg(any(target_os = "freebsd", target_os = "macos"))]
mod sys {
    use std::ffi::CString;
    use std::io;
    use std::os::unix::ffi::OsStrExt;
    use std::path::Path;

    use crate::proto::{ATTR_ARCHIVE, ATTR_HIDDEN, ATTR_READ_ONLY, ATTR_SYSTEM};

    #[cfg(target_os = "freebsd")]
    mod flags {
        pub const UF_READONLY: u32 = 0x0000_1000;
        pub const UF_HIDDEN: u32 = 0x0000_8000;
        pub const UF_SYSTEM: u32 = 0x0000_0080;
        pub const UF_ARCHIVE: u32 = 0x0000_0800;
    }

    #[cfg(target_os = "macos")]
    mod flags {
        // macOS lacks most FAT-ish flags; immutable stands in for read-only.
        pub const UF_READONLY: u32 = libc::UF_IMMUTABLE;
        pub const UF_HIDDEN: u32 = libc::UF_HIDDEN;
        pub const UF_SYSTEM: u32 = 0;
        pub const UF_ARCHIVE: u32 = 0;
    }

    fn c_path(path: &Path) -> io::Result<CString> {
        CString::new(path.as_os_str().as_bytes())
            .map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))
    }

    pub fn get_fat_attr(path: &Path) -> Option<u8> {
        let path = c_path(path).ok()?;
        let mut st: libc::stat = unsafe { std::mem::zeroed() };
        if unsafe { libc::stat(path.as_ptr(), &mut st) } < 0 {
            return None;
        }
        let mut attr = 0;
        if st.st_flags & flags::UF_READONLY != 0 {
            attr |= ATTR_READ_ONLY;
        }
        if st.st_flags & flags::UF_HIDDEN != 0 {
            attr |= ATTR_HIDDEN;
        }
        if flags::UF_SYSTEM != 0 && st.st_flags & flags::UF_SYSTEM != 0 {
            attr |= ATTR_SYSTEM;
        }
        if flags::UF_ARCHIVE != 0 && st.st_flags & flags::UF_ARCHIVE != 0 {
            attr |= ATTR_ARCHIVE;
        }
        Some(attr)
    }

    pub fn set_fat_attr(path: &Path, attr: u8) -> io::Result<()> {
        let path = c_path(path)?;
        let mut fl: u32 = 0;
        if attr & ATTR_READ_ONLY != 0 {
            fl |= flags::UF_READONLY;
        }
        if attr & ATTR_HIDDEN != 0 {
            fl |= flags::UF_HIDDEN;
        }
        if attr & ATTR_SYSTEM != 0 {
            fl |= flags::UF_SYSTEM;
        }
        if attr & ATTR_ARCHIVE != 0 {
            fl |= flags::UF_ARCHIVE;
        }
        if unsafe { libc::chflags(path.as_ptr(), fl as _) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    pub fn is_fat_mount(root: &Path) -> bool {
        let Ok(path) = c_path(root) else {
            return false;
        };
        let mut buf: libc::statfs = unsafe { std::mem::zeroed() };
        if unsafe { libc::statfs(path.as_ptr(), &mut buf) } < 0 {
            return false;
        }
        let name = unsafe { std::ffi::CStr::from_ptr(buf.f_fstypename.as_ptr()) };
        name.to_bytes() == b"msdosfs"
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::get_attr;
    use crate::proto::{ATTR_ARCHIVE, ATTR_DIRECTORY};

    #[test]
    fn test_missing_item_has_no_attr() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(get_attr(&tmp.path().join("nope"), false).is_none());
    }

    #[test]
    fn test_directory_attr() {
        let tmp = tempfile::TempDir::new().unwrap();
        let item = get_attr(tmp.path(), false).unwrap();
        assert_eq!(item.attr, ATTR_DIRECTORY);
        assert_eq!(item.props.size, 0);
    }

    #[test]
    fn test_regular_file_on_plain_mount_fakes_archive() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("File.TXT");
        fs::write(&path, b"hello").unwrap();

        let item = get_attr(&path, false).unwrap();
        assert_eq!(item.attr, ATTR_ARCHIVE);
        assert_eq!(item.props.attr, ATTR_ARCHIVE);
        assert_eq!(item.props.size, 5);
        assert_eq!(item.props.fcb_name.as_bytes(), b"FILE    TXT");
        assert_ne!(item.props.dos_time, 0);
    }
}
