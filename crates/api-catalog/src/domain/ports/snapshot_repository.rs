//! Driven port for persisting cache snapshots between sessions.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::snapshot::CatalogSnapshot;

/// Errors raised while saving or loading a cache snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// The snapshot file could not be read or written.
    #[error("snapshot I/O failed at '{path}': {message}")]
    Io {
        /// Path of the snapshot or temporary file.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The snapshot file is not valid JSON for the snapshot schema.
    #[error("invalid snapshot JSON: {message}")]
    Decode {
        /// Description of the parse error.
        message: String,
    },

    /// The snapshot could not be serialised.
    #[error("snapshot serialisation failed: {message}")]
    Encode {
        /// Description of the serialisation error.
        message: String,
    },

    /// The configured snapshot path does not name a single file.
    #[error("snapshot path '{path}' must name a single file")]
    InvalidPath {
        /// Rejected path.
        path: PathBuf,
    },
}

/// Port for durable snapshot storage.
///
/// `load` returns `Ok(None)` both when nothing was stored and when the stored
/// snapshot carries a different schema version; mismatched snapshots are
/// discarded, never migrated.
pub trait CatalogSnapshotRepository: Send + Sync {
    /// Load the stored snapshot, if a compatible one exists.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when storage cannot be read or decoded.
    fn load(&self) -> Result<Option<CatalogSnapshot>, SnapshotError>;

    /// Replace the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when the snapshot cannot be written.
    fn save(&self, snapshot: &CatalogSnapshot) -> Result<(), SnapshotError>;
}
