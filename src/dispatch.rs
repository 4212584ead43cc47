//! The per-opcode request dispatcher.
//!
//! Each handler decodes its payload, consults the handle table, resolver and
//! attribute bridge, and produces either a reply payload plus AX word or the
//! decision to stay silent. Host errors surface as DOS codes only; frames
//! that cannot be interpreted are dropped so that clients polling unmapped
//! drives do not generate error storms.

use std::ffi::OsStr;
use std::io::Cursor;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use num_traits::FromPrimitive;
use tracing::debug;

use crate::fcb::FcbName;
use crate::fs::attr;
use crate::fs::dirlist::{self, SearchFlags};
use crate::fs::fileops;
use crate::fs::handles::{HandleDb, INVALID_HANDLE};
use crate::fs::resolve;
use crate::fs::{drive_letter, Drive, DriveTable, FileProps};
use crate::parser::{self, ops, primitive};
use crate::proto::{
    off, DosError, Opcode, ATTR_DIRECTORY, ATTR_READ_ONLY, ATTR_VOLUME, HEADER_LEN,
};
use crate::serializer;

/// What the frame layer does with a dispatched request.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Send (and cache) a reply of this total length.
    Reply(usize),
    /// Stay silent and poison the client's cache slot.
    Ignore,
}

/// Handler-internal failure: either a DOS error for the AX word or a frame
/// drop.
enum Fail {
    Dos(DosError),
    Ignore,
}

impl From<DosError> for Fail {
    fn from(err: DosError) -> Self {
        Fail::Dos(err)
    }
}

impl From<parser::Error> for Fail {
    fn from(_: parser::Error) -> Self {
        Fail::Ignore
    }
}

// Reply-buffer overflow while serializing; cannot happen for well-formed
// payloads but must not panic.
impl From<std::io::Error> for Fail {
    fn from(_: std::io::Error) -> Self {
        Fail::Ignore
    }
}

type OpResult = Result<usize, Fail>;

/// Runs one validated request against the drive table and writes the reply
/// payload (and AX) into `reply`, whose header has already been seeded.
pub fn dispatch(
    drives: &DriveTable,
    handles: &mut HandleDb,
    request: &[u8],
    reply: &mut [u8],
) -> Outcome {
    let drive_index = request[off::DRIVE] & 0x1F;
    let Some(drive) = drives.get(drive_index) else {
        debug!(drive = %drive_letter(drive_index), "query for unmapped drive ignored");
        return Outcome::Ignore;
    };
    let Some(op) = Opcode::from_u8(request[off::OPCODE]) else {
        debug!(opcode = request[off::OPCODE], "unknown opcode ignored");
        return Outcome::Ignore;
    };

    debug!(?op, drive = %drive_letter(drive_index), "dispatching query");
    serializer::frame::set_ax(reply, 0);

    match run_op(op, drive, handles, &request[HEADER_LEN..], reply) {
        Ok(payload_len) => Outcome::Reply(HEADER_LEN + payload_len),
        Err(Fail::Dos(err)) => {
            debug!(?op, ?err, "query failed");
            serializer::frame::set_ax(reply, err.code());
            Outcome::Reply(HEADER_LEN)
        }
        Err(Fail::Ignore) => Outcome::Ignore,
    }
}

fn run_op(
    op: Opcode,
    drive: &Drive,
    handles: &mut HandleDb,
    payload: &[u8],
    reply: &mut [u8],
) -> OpResult {
    match op {
        // acknowledged with a bare success reply
        Opcode::InstallCheck
        | Opcode::CloseFile
        | Opcode::CommitFile
        | Opcode::LockFile
        | Opcode::UnlockFile => Ok(0),

        Opcode::Unsupported2D => Err(Fail::Ignore),

        Opcode::DiskSpace => disk_space(drive, reply),
        Opcode::MkDir | Opcode::RmDir => make_or_remove_dir(op, drive, payload),
        Opcode::ChDir => change_dir(drive, payload),
        Opcode::SetAttr => set_attr(drive, payload),
        Opcode::GetAttr => get_attr(drive, payload, reply),
        Opcode::Rename => rename(drive, payload),
        Opcode::Delete => delete(drive, payload),
        Opcode::ReadFile => read_file(handles, payload, reply),
        Opcode::WriteFile => write_file(handles, payload, reply),
        Opcode::FindFirst => find_first(drive, handles, payload, reply),
        Opcode::FindNext => find_next(drive, handles, payload, reply),
        Opcode::Open | Opcode::Create | Opcode::SpecialOpen => {
            open_family(op, drive, handles, payload, reply)
        }
        Opcode::SeekFromEnd => seek_from_end(handles, payload, reply),
    }
}

fn disk_space(drive: &Drive, reply: &mut [u8]) -> OpResult {
    let (total, free) = fileops::disk_space(&drive.root);
    // MS-DOS chokes on anything past 2 GiB, and tolerates only one sector
    // per cluster; report 32 KiB clusters and clamp.
    let clusters = |bytes: u64| (bytes.min(0x7FFF_FFFF) >> 15) as u16;
    debug!(total, free, "disk space");
    serializer::frame::set_ax(reply, 1);
    let mut out = Cursor::new(&mut reply[HEADER_LEN..]);
    serializer::ops::disk_geometry(&mut out, clusters(total), 32768, clusters(free))?;
    Ok(6)
}

fn make_or_remove_dir(op: Opcode, drive: &Drive, payload: &[u8]) -> OpResult {
    let args = ops::path::args(payload);
    let res = resolve::short_to_long(&drive.root, &args.path);
    let outcome = if op == Opcode::MkDir {
        debug!(path = %res.path.display(), "mkdir");
        fileops::make_dir(&res.path)
    } else {
        debug!(path = %res.path.display(), "rmdir");
        std::fs::remove_dir(&res.path)
    };
    outcome.map_err(|err| {
        debug!(%err, "directory operation failed");
        Fail::Dos(DosError::WriteFault)
    })?;
    Ok(0)
}

fn change_dir(drive: &Drive, payload: &[u8]) -> OpResult {
    let args = ops::path::args(payload);
    let res = resolve::short_to_long(&drive.root, &args.path);
    debug!(path = %res.path.display(), matched = res.matched, "chdir");
    if !res.matched || !res.path.is_dir() {
        return Err(DosError::PathNotFound.into());
    }
    Ok(0)
}

fn set_attr(drive: &Drive, payload: &[u8]) -> OpResult {
    let args = ops::set_attr::args(payload)?;
    let res = resolve::short_to_long(&drive.root, &args.path);
    debug!(path = %res.path.display(), attr = args.attr, "setattr");
    if !res.matched {
        return Err(DosError::FileNotFound.into());
    }
    if drive.is_fat {
        attr::set_attr(&res.path, args.attr).map_err(|_| Fail::Dos(DosError::FileNotFound))?;
    }
    Ok(0)
}

fn get_attr(drive: &Drive, payload: &[u8], reply: &mut [u8]) -> OpResult {
    if payload.is_empty() {
        return Err(Fail::Ignore);
    }
    let args = ops::path::args(payload);
    let res = resolve::short_to_long(&drive.root, &args.path);
    if !res.matched {
        return Err(DosError::FileNotFound.into());
    }
    let item =
        attr::get_attr(&res.path, drive.is_fat).ok_or(Fail::Dos(DosError::FileNotFound))?;
    debug!(path = %res.path.display(), attr = item.attr, size = item.props.size, "getattr");
    let mut out = Cursor::new(&mut reply[HEADER_LEN..]);
    serializer::ops::attr_result(&mut out, &item.props)?;
    Ok(9)
}

fn rename(drive: &Drive, payload: &[u8]) -> OpResult {
    if payload.len() <= 2 {
        return Err(Fail::Ignore);
    }
    let args = match ops::rename::args(payload) {
        Ok(args) => args,
        Err(parser::Error::BadLengthPrefix) => return Err(DosError::FileNotFound.into()),
        Err(_) => return Err(Fail::Ignore),
    };
    let src = resolve::short_to_long(&drive.root, &args.src);
    if !src.matched {
        return Err(DosError::FileNotFound.into());
    }
    // the destination is probed and renamed to in its unresolved DOS form;
    // on a case-sensitive host this can miss an existing differently-cased
    // target, which is the contract
    let dst = literal_path(&drive.root, &args.dst);
    debug!(src = %src.path.display(), dst = %dst.display(), "rename");
    if attr::get_attr(&dst, false).is_some() {
        return Err(DosError::AccessDenied.into());
    }
    std::fs::rename(&src.path, &dst).map_err(|_| Fail::Dos(DosError::AccessDenied))?;
    Ok(0)
}

fn delete(drive: &Drive, payload: &[u8]) -> OpResult {
    let args = ops::path::args(payload);
    let (dir_rel, mask_raw) = primitive::split_mask(&args.path);

    if mask_raw.iter().any(|&b| b == b'?' || b == b'*') {
        let dir = resolve::short_to_long(&drive.root, dir_rel);
        if !dir.matched {
            return Err(DosError::FileNotFound.into());
        }
        let mask = FcbName::from_name(mask_raw);
        debug!(dir = %dir.path.display(), ?mask, "delete by mask");
        fileops::delete_matching(&dir.path, &mask)
            .map_err(|_| Fail::Dos(DosError::FileNotFound))?;
        return Ok(0);
    }

    let res = resolve::short_to_long(&drive.root, &args.path);
    if !res.matched {
        return Err(DosError::FileNotFound.into());
    }
    // a vanished target reads as attribute 0xFF here, which the read-only
    // test treats as denied
    let attr_byte = attr::get_attr(&res.path, drive.is_fat).map(|i| i.attr).unwrap_or(0xFF);
    if attr_byte & ATTR_READ_ONLY != 0 {
        return Err(DosError::AccessDenied.into());
    }
    debug!(path = %res.path.display(), "delete");
    std::fs::remove_file(&res.path).map_err(|_| Fail::Dos(DosError::FileNotFound))?;
    Ok(0)
}

fn read_file(handles: &mut HandleDb, payload: &[u8], reply: &mut [u8]) -> OpResult {
    let args = ops::read::args(payload)?;
    let path = handles.path(args.file_id).ok_or(Fail::Dos(DosError::AccessDenied))?;
    debug!(file_id = args.file_id, offset = args.offset, len = args.len, "read");
    let out = &mut reply[HEADER_LEN..];
    let want = usize::from(args.len).min(out.len());
    fileops::read_file(path, args.offset, &mut out[..want])
        .map_err(|_| Fail::Dos(DosError::AccessDenied))
}

fn write_file(handles: &mut HandleDb, payload: &[u8], reply: &mut [u8]) -> OpResult {
    let args = ops::write::args(payload)?;
    let path = handles.path(args.file_id).ok_or(Fail::Dos(DosError::AccessDenied))?;
    debug!(file_id = args.file_id, offset = args.offset, len = args.data.len(), "write");
    let written = fileops::write_file(path, args.offset, args.data)
        .map_err(|_| Fail::Dos(DosError::AccessDenied))?;
    let mut out = Cursor::new(&mut reply[HEADER_LEN..]);
    serializer::u16(&mut out, written)?;
    Ok(2)
}

fn find_first(
    drive: &Drive,
    handles: &mut HandleDb,
    payload: &[u8],
    reply: &mut [u8],
) -> OpResult {
    let args = ops::find_first::args(payload)?;
    let (dir_rel, mask_raw) = primitive::split_mask(&args.spec);
    let mask = FcbName::from_name(mask_raw);
    let flags =
        SearchFlags { is_root: primitive::is_root_dir(dir_rel), is_fat: drive.is_fat };

    // an unresolved directory is interned as-is and fails enumeration
    let dir = resolve::short_to_long(&drive.root, dir_rel);
    debug!(dir = %dir.path.display(), ?mask, attr = args.attr, "findfirst");
    let dir_id = handles.intern(&dir.path);
    if dir_id == INVALID_HANDLE {
        return Err(DosError::NoMoreFiles.into());
    }
    let (props, cursor) = dirlist::find_file(handles, dir_id, &mask, args.attr, 0, flags)
        .ok_or(Fail::Dos(DosError::NoMoreFiles))?;

    let mut out = Cursor::new(&mut reply[HEADER_LEN..]);
    serializer::ops::found_file(&mut out, &props, dir_id, cursor)?;
    Ok(24)
}

fn find_next(
    drive: &Drive,
    handles: &mut HandleDb,
    payload: &[u8],
    reply: &mut [u8],
) -> OpResult {
    let args = ops::find_next::args(payload)?;
    let dir_path = handles.path(args.dir_id).ok_or(Fail::Dos(DosError::FileNotFound))?;
    let flags = SearchFlags {
        is_root: is_root_path(&drive.root, dir_path),
        is_fat: drive.is_fat,
    };
    debug!(dir_id = args.dir_id, cursor = args.cursor, "findnext");
    let (props, cursor) =
        dirlist::find_file(handles, args.dir_id, &args.mask, args.attr, args.cursor, flags)
            .ok_or(Fail::Dos(DosError::NoMoreFiles))?;

    let mut out = Cursor::new(&mut reply[HEADER_LEN..]);
    serializer::ops::found_file(&mut out, &props, args.dir_id, cursor)?;
    Ok(24)
}

fn open_family(
    op: Opcode,
    drive: &Drive,
    handles: &mut HandleDb,
    payload: &[u8],
    reply: &mut [u8],
) -> OpResult {
    let args = ops::open::args(payload)?;
    let (dir_rel, _) = primitive::split_mask(&args.path);

    let dir = resolve::short_to_long(&drive.root, dir_rel);
    if !dir.matched || !dir.path.is_dir() {
        return Err(DosError::PathNotFound.into());
    }
    // resolves to the real casing when the file exists, or to the parent
    // plus the literal name when it is yet to be created
    let host_path = resolve::short_to_long(&drive.root, &args.path).path;
    let attr_bits = (args.stack_attr & 0xFF) as u8;
    let existing = attr::get_attr(&host_path, drive.is_fat);
    debug!(?op, path = %host_path.display(), action = args.action, "open");

    let create = || {
        fileops::create_file(&host_path, attr_bits, drive.is_fat)
            .ok_or(Fail::Dos(DosError::FileNotFound))
    };

    let (props, spop_result, open_mode) = match op {
        Opcode::Create => (create()?.props, 0, 2),
        Opcode::SpecialOpen => {
            let mode = (args.open_mode & 0x7F) as u8;
            match existing {
                None if args.action & 0xF0 == 0x10 => (create()?.props, 2, mode),
                None => return Err(DosError::FileNotFound.into()),
                Some(item) if item.attr & (ATTR_VOLUME | ATTR_DIRECTORY) != 0 => {
                    return Err(DosError::FileNotFound.into())
                }
                Some(item) => match args.action & 0x0F {
                    1 => (item.props, 1, mode),
                    2 => (create()?.props, 3, mode),
                    _ => return Err(DosError::FileNotFound.into()),
                },
            }
        }
        _ => match existing {
            Some(item) if item.attr & (ATTR_VOLUME | ATTR_DIRECTORY) == 0 => {
                (item.props, 0, attr_bits)
            }
            _ => return Err(DosError::FileNotFound.into()),
        },
    };

    let file_id = handles.intern(&host_path);
    if file_id == INVALID_HANDLE {
        return Err(Fail::Ignore);
    }
    write_open_result(reply, &props, file_id, spop_result, open_mode)
}

fn write_open_result(
    reply: &mut [u8],
    props: &FileProps,
    file_id: u16,
    spop_result: u16,
    open_mode: u8,
) -> OpResult {
    let mut out = Cursor::new(&mut reply[HEADER_LEN..]);
    serializer::ops::open_result(&mut out, props, file_id, spop_result, open_mode)?;
    Ok(25)
}

fn seek_from_end(handles: &mut HandleDb, payload: &[u8], reply: &mut [u8]) -> OpResult {
    let args = ops::seek_end::args(payload)?;
    // a positive offset seeks to the end itself
    let offset = args.offset.min(0);
    let path = handles.path(args.file_id).ok_or(Fail::Dos(DosError::FileNotFound))?;
    let size = fileops::file_size(path).ok_or(Fail::Dos(DosError::FileNotFound))?;
    let position = (i64::from(size) + i64::from(offset)).max(0) as u32;
    debug!(file_id = args.file_id, offset = args.offset, position, "seek from end");
    let mut out = Cursor::new(&mut reply[HEADER_LEN..]);
    serializer::u32(&mut out, position)?;
    Ok(4)
}

/// Joins a drive-relative DOS-form path under `root` without resolving it.
fn literal_path(root: &Path, rel: &[u8]) -> PathBuf {
    let trimmed: &[u8] = {
        let mut rel = rel;
        while let [b'/', rest @ ..] = rel {
            rel = rest;
        }
        rel
    };
    if trimmed.is_empty() {
        return root.to_path_buf();
    }
    root.join(OsStr::from_bytes(trimmed))
}

/// The host-path flavor of the drive-root test, used by FindNext: anything
/// at most one component below `root` counts as root.
fn is_root_path(root: &Path, path: &Path) -> bool {
    let root_len = root.as_os_str().as_bytes().len();
    let rest = path.as_os_str().as_bytes().get(root_len..).unwrap_or(b"");
    !rest.iter().skip_while(|&&b| b == b'/').any(|&b| b == b'/')
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{is_root_path, literal_path};

    #[test]
    fn test_literal_path_strips_leading_slashes() {
        assert_eq!(literal_path(Path::new("/srv/c"), b"/sub/file"), Path::new("/srv/c/sub/file"));
        assert_eq!(literal_path(Path::new("/srv/c"), b""), Path::new("/srv/c"));
    }

    #[test]
    fn test_root_test_tolerates_one_component() {
        let root = Path::new("/srv/c");
        assert!(is_root_path(root, Path::new("/srv/c")));
        assert!(is_root_path(root, Path::new("/srv/c/sub")));
        assert!(!is_root_path(root, Path::new("/srv/c/sub/deeper")));
    }
}
