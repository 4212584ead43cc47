//! The single-instance lockfile.
//!
//! Exclusive creation makes acquisition atomic: if the file exists, another
//! server owns the host. The guard removes the file on drop, so an orderly
//! shutdown releases the lock.

use std::fs::{self, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

/// Holds the lockfile for the lifetime of the server process.
#[derive(Debug)]
pub struct LockFile {
    path: PathBuf,
}

impl LockFile {
    /// Atomically creates `path`; fails when it already exists.
    pub fn acquire(path: &Path) -> io::Result<LockFile> {
        OpenOptions::new().write(true).create_new(true).mode(0o644).open(path)?;
        Ok(LockFile { path: path.to_path_buf() })
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::LockFile;

    #[test]
    fn test_lock_is_exclusive() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("ethersrv.lock");

        let lock = LockFile::acquire(&path).unwrap();
        assert!(LockFile::acquire(&path).is_err());
        drop(lock);

        assert!(!path.exists());
        let _relock = LockFile::acquire(&path).unwrap();
    }
}
