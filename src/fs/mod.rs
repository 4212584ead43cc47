//! Host-filesystem service layer.
//!
//! Everything the dispatcher needs to turn DOS-shaped requests into host
//! filesystem operations: the drive table, the handle database, directory
//! listings, case-insensitive path resolution and the attribute bridge.

pub mod attr;
pub mod dirlist;
pub mod fileops;
pub mod handles;
pub mod resolve;

use std::io;
use std::path::{Path, PathBuf};

use crate::fcb::FcbName;

/// Number of drive letters (A: through Z:).
pub const DRIVE_COUNT: usize = 26;

/// First drive letter clients may use; A: and B: are never served.
pub const FIRST_DRIVE: u8 = 2;

/// The DOS-facing properties of one directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileProps {
    pub fcb_name: FcbName,
    pub attr: u8,
    pub size: u32,
    pub dos_time: u32,
}

/// One exported "virtual drive": a canonicalized host directory.
#[derive(Debug)]
pub struct Drive {
    pub root: PathBuf,
    /// True when the root is mounted on a FAT filesystem, enabling real
    /// DOS attribute bits.
    pub is_fat: bool,
}

/// Maps drive indices (0 = A:) to host directories. Immutable after startup.
#[derive(Debug, Default)]
pub struct DriveTable {
    drives: [Option<Drive>; DRIVE_COUNT],
}

impl DriveTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts `root` at `index`, canonicalizing it and probing the host
    /// filesystem type. Indices below C: are rejected.
    pub fn map(&mut self, index: u8, root: &Path) -> io::Result<()> {
        if index < FIRST_DRIVE || usize::from(index) >= DRIVE_COUNT {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("drive index {index} out of range"),
            ));
        }
        let root = root.canonicalize()?;
        let is_fat = attr::is_fat_mount(&root);
        self.drives[usize::from(index)] = Some(Drive { root, is_fat });
        Ok(())
    }

    pub fn get(&self, index: u8) -> Option<&Drive> {
        self.drives.get(usize::from(index))?.as_ref()
    }

    /// Iterates mapped drives as `(index, drive)` pairs, for startup logs.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Drive)> {
        self.drives
            .iter()
            .enumerate()
            .filter_map(|(i, d)| d.as_ref().map(|d| (i as u8, d)))
    }
}

/// The drive letter for a drive index, for log output.
pub fn drive_letter(index: u8) -> char {
    (b'A' + index) as char
}

#[cfg(test)]
mod tests {
    use super::{drive_letter, DriveTable};

    #[test]
    fn test_floppy_drives_are_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut drives = DriveTable::new();
        assert!(drives.map(0, tmp.path()).is_err());
        assert!(drives.map(1, tmp.path()).is_err());
        assert!(drives.map(2, tmp.path()).is_ok());
    }

    #[test]
    fn test_missing_root_fails() {
        let mut drives = DriveTable::new();
        assert!(drives.map(2, std::path::Path::new("/does/not/exist")).is_err());
    }

    #[test]
    fn test_mapped_drive_is_canonicalized() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        let mut drives = DriveTable::new();
        drives.map(3, &tmp.path().join("sub/..")).unwrap();
        let drive = drives.get(3).unwrap();
        assert!(drive.root.ends_with(tmp.path().file_name().unwrap()));
        assert!(drives.get(2).is_none());
    }

    #[test]
    fn test_drive_letters() {
        assert_eq!(drive_letter(2), 'C');
        assert_eq!(drive_letter(25), 'Z');
    }
}
