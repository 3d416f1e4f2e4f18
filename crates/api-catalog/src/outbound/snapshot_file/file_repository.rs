//! JSON snapshot repository over a `cap_std` directory handle.

use std::io;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use serde::Deserialize;
use tracing::{debug, warn};

use super::atomic_io::{io_error, write_atomic};
use crate::domain::ports::{CatalogSnapshotRepository, SnapshotError};
use crate::domain::{CatalogSnapshot, SNAPSHOT_SCHEMA_VERSION};

/// Default snapshot file name.
pub const DEFAULT_SNAPSHOT_FILE: &str = "api-catalog.json";

/// Only the schema version, read before committing to a full decode.
#[derive(Deserialize)]
struct SnapshotHeader {
    version: u32,
}

/// Stores a [`CatalogSnapshot`] as one JSON file inside a directory.
///
/// # Example
///
/// ```no_run
/// use api_catalog::domain::ports::CatalogSnapshotRepository;
/// use api_catalog::outbound::snapshot_file::FileCatalogSnapshotRepository;
/// use camino::Utf8Path;
///
/// let repository =
///     FileCatalogSnapshotRepository::open_ambient(Utf8Path::new(".cache"), "catalog.json")?;
/// let restored = repository.load()?;
/// assert!(restored.is_none_or(|snapshot| snapshot.is_current()));
/// # Ok::<(), api_catalog::domain::ports::SnapshotError>(())
/// ```
#[derive(Debug)]
pub struct FileCatalogSnapshotRepository {
    dir: Dir,
    file_name: Utf8PathBuf,
}

impl FileCatalogSnapshotRepository {
    /// Wrap an open directory.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::InvalidPath`] when `file_name` is not a
    /// single normal path component.
    pub fn new(dir: Dir, file_name: impl Into<Utf8PathBuf>) -> Result<Self, SnapshotError> {
        let name = file_name.into();
        validate_file_name(&name)?;
        Ok(Self {
            dir,
            file_name: name,
        })
    }

    /// Create `dir_path` if needed and open it with ambient authority.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Io`] when the directory cannot be created or
    /// opened, and [`SnapshotError::InvalidPath`] for a bad file name.
    pub fn open_ambient(
        dir_path: &Utf8Path,
        file_name: impl Into<Utf8PathBuf>,
    ) -> Result<Self, SnapshotError> {
        Dir::create_ambient_dir_all(dir_path, ambient_authority())
            .map_err(|error| io_error(dir_path, &error))?;
        let dir = Dir::open_ambient_dir(dir_path, ambient_authority())
            .map_err(|error| io_error(dir_path, &error))?;
        Self::new(dir, file_name)
    }

    /// Snapshot file name inside the directory.
    #[must_use]
    pub fn file_name(&self) -> &Utf8Path {
        &self.file_name
    }
}

impl CatalogSnapshotRepository for FileCatalogSnapshotRepository {
    fn load(&self) -> Result<Option<CatalogSnapshot>, SnapshotError> {
        let contents = match self.dir.read_to_string(self.file_name.as_std_path()) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(file = %self.file_name, "no cache snapshot stored");
                return Ok(None);
            }
            Err(error) => return Err(io_error(&self.file_name, &error)),
        };
        decode_snapshot(&contents)
    }

    fn save(&self, snapshot: &CatalogSnapshot) -> Result<(), SnapshotError> {
        let contents =
            serde_json::to_string_pretty(snapshot).map_err(|error| SnapshotError::Encode {
                message: error.to_string(),
            })?;
        write_atomic(&self.dir, &self.file_name, &contents)?;
        debug!(
            file = %self.file_name,
            projects = snapshot.projects.len(),
            "cache snapshot saved"
        );
        Ok(())
    }
}

fn validate_file_name(file_name: &Utf8Path) -> Result<(), SnapshotError> {
    let mut components = file_name.components();
    match (components.next(), components.next()) {
        (Some(Utf8Component::Normal(_)), None) => Ok(()),
        _ => Err(SnapshotError::InvalidPath {
            path: file_name.as_std_path().to_path_buf(),
        }),
    }
}

fn decode_snapshot(contents: &str) -> Result<Option<CatalogSnapshot>, SnapshotError> {
    let decode_error = |error: serde_json::Error| SnapshotError::Decode {
        message: error.to_string(),
    };
    let header: SnapshotHeader = serde_json::from_str(contents).map_err(decode_error)?;
    if header.version != SNAPSHOT_SCHEMA_VERSION {
        warn!(
            found = header.version,
            expected = SNAPSHOT_SCHEMA_VERSION,
            "discarding cache snapshot with mismatched schema version"
        );
        return Ok(None);
    }
    serde_json::from_str(contents).map(Some).map_err(decode_error)
}
