//! Per-opcode argument decoding. One module per wire argument shape; the
//! path-only opcodes (RMDIR, MKDIR, CHDIR, GETATTR, DELETE) share `path`.

pub mod find_first;
pub mod find_next;
pub mod open;
pub mod path;
pub mod read;
pub mod rename;
pub mod seek_end;
pub mod set_attr;
pub mod write;
