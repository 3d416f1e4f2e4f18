//! File-backed snapshot persistence.
//!
//! Snapshots are stored as pretty-printed JSON inside a capability directory
//! and replaced atomically on every save.

mod atomic_io;
mod file_repository;

pub use file_repository::{DEFAULT_SNAPSHOT_FILE, FileCatalogSnapshotRepository};
