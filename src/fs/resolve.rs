//! Case-insensitive resolution of DOS 8.3 paths to host long names.
//!
//! The wire carries lowercased 8.3 components; the host tree has arbitrary
//! long names in arbitrary case. Each component is resolved by enumerating
//! the directory built so far and picking the first entry whose FCB form
//! equals the component's FCB form. This is the only place where DOS
//! case-insensitivity meets the case-sensitive host; everything downstream
//! works on resolved host paths.

use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use crate::fcb::FcbName;

/// The outcome of a resolution attempt.
///
/// On a miss, `path` holds the resolved prefix with the unmatched component
/// appended literally; callers that create new items (MKDIR, CREATE) use
/// exactly that path.
#[derive(Debug)]
pub struct Resolution {
    pub path: PathBuf,
    pub matched: bool,
}

/// Resolves the slash-normalized, lowercased DOS path `rel` under `root`.
pub fn short_to_long(root: &Path, rel: &[u8]) -> Resolution {
    let mut resolved = root.to_path_buf();
    let mut components = rel.split(|&b| b == b'/').filter(|c| !c.is_empty()).peekable();

    while let Some(component) = components.next() {
        let wanted = FcbName::from_name(component);
        let has_more = components.peek().is_some();

        let Ok(entries) = std::fs::read_dir(&resolved) else {
            return Resolution { path: resolved, matched: false };
        };

        let mut found = false;
        for entry in entries.flatten() {
            let name = entry.file_name();
            if FcbName::from_name(name.as_bytes()) != wanted {
                continue;
            }
            // a matching name that cannot be descended into is not it
            if has_more && !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            resolved.push(&name);
            found = true;
            break;
        }

        if !found {
            resolved.push(OsStr::from_bytes(component));
            return Resolution { path: resolved, matched: false };
        }
    }

    Resolution { path: resolved, matched: true }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::short_to_long;

    #[test]
    fn test_resolves_case_insensitively() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("Docs")).unwrap();
        fs::write(tmp.path().join("Docs/Readme.TXT"), b"hi").unwrap();

        let res = short_to_long(tmp.path(), b"/docs/readme.txt");
        assert!(res.matched);
        assert_eq!(res.path, tmp.path().join("Docs/Readme.TXT"));

        // any casing of the request lands on the same host path
        let res2 = short_to_long(tmp.path(), b"/DOCS/README.TXT".to_ascii_lowercase().as_slice());
        assert_eq!(res2.path, res.path);
    }

    #[test]
    fn test_empty_path_is_the_root() {
        let tmp = tempfile::TempDir::new().unwrap();
        for rel in [&b""[..], &b"/"[..], &b"//"[..]] {
            let res = short_to_long(tmp.path(), rel);
            assert!(res.matched);
            assert_eq!(res.path, tmp.path());
        }
    }

    #[test]
    fn test_miss_appends_the_literal_component() {
        let tmp = tempfile::TempDir::new().unwrap();
        let res = short_to_long(tmp.path(), b"/newfile.txt");
        assert!(!res.matched);
        assert_eq!(res.path, tmp.path().join("newfile.txt"));
    }

    #[test]
    fn test_miss_drops_trailing_components() {
        let tmp = tempfile::TempDir::new().unwrap();
        let res = short_to_long(tmp.path(), b"/missing/deeper/file.txt");
        assert!(!res.matched);
        assert_eq!(res.path, tmp.path().join("missing"));
    }

    #[test]
    fn test_non_directory_is_skipped_for_inner_components() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::write(tmp.path().join("data"), b"file, not dir").unwrap();
        fs::create_dir(tmp.path().join("DATA.D")).unwrap();

        // "data" as a leaf resolves to the file
        let leaf = short_to_long(tmp.path(), b"/data");
        assert!(leaf.matched);
        assert_eq!(leaf.path, tmp.path().join("data"));

        // "data" as an inner component cannot match the file
        let inner = short_to_long(tmp.path(), b"/data/x");
        assert!(!inner.matched);
    }

    #[test]
    fn test_resolves_nested_directories() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("Games/DOOM")).unwrap();
        fs::write(tmp.path().join("Games/DOOM/doom.exe"), b"x").unwrap();

        let res = short_to_long(tmp.path(), b"/games/doom/doom.exe");
        assert!(res.matched);
        assert_eq!(res.path, tmp.path().join("Games/DOOM/doom.exe"));
    }
}
