//! ethersrv - an EtherDFS server implementation in Rust.
//!
//! EtherDFS is a link-layer remote file system for retro PCs: every request
//! and reply is one raw Ethernet frame carrying a DOS-style file-system
//! operation against a "virtual drive" backed by a host directory. This
//! crate implements the server side: the frame protocol engine, the DOS to
//! host path and directory layer, and the FAT attribute bridge.

pub mod config;
pub mod dispatch;
pub mod dostime;
pub mod engine;
pub mod fcb;
pub mod fs;
pub mod link;
pub mod lock;
pub mod parser;
pub mod proto;
pub mod reply_cache;
pub mod serializer;
pub mod server;
