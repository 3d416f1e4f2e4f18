//! Atomic replacement of a file inside a capability directory.
//!
//! Contents go to a hidden sibling temporary file which is synced and then
//! renamed over the target, so readers see either the old or the new file.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use camino::Utf8Path;
use cap_std::fs::{Dir, OpenOptions};

use crate::domain::ports::SnapshotError;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Replace `file_name` in `dir` with `contents`.
///
/// `file_name` must already be validated as a single normal path component.
pub(super) fn write_atomic(dir: &Dir, file_name: &Utf8Path, contents: &str) -> Result<(), SnapshotError> {
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let tmp_name = format!(".{file_name}.tmp.{}.{suffix}.{counter}", std::process::id());

    write_temp_file(dir, &tmp_name, contents)?;
    if let Err(error) = replace_target(dir, &tmp_name, file_name.as_str()) {
        if dir.remove_file(&tmp_name).is_err() {
            // The temporary file may already be gone.
        }
        return Err(io_error(file_name, &error));
    }
    sync_directory(dir);
    Ok(())
}

fn write_temp_file(dir: &Dir, tmp_name: &str, contents: &str) -> Result<(), SnapshotError> {
    let tmp_path = Utf8Path::new(tmp_name);
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir
        .open_with(tmp_name, &options)
        .map_err(|error| io_error(tmp_path, &error))?;

    let written = file
        .write_all(contents.as_bytes())
        .and_then(|()| file.sync_all());
    if let Err(error) = written {
        drop(file);
        drop(dir.remove_file(tmp_name));
        return Err(io_error(tmp_path, &error));
    }
    Ok(())
}

#[cfg(windows)]
fn replace_target(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    // Windows rename fails if the target exists.
    match dir.remove_file(target_name) {
        Ok(()) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => return Err(error),
    }
    dir.rename(tmp_name, dir, target_name)
}

#[cfg(not(windows))]
fn replace_target(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, target_name)
}

fn sync_directory(dir: &Dir) {
    if dir.open(".").and_then(|handle| handle.sync_all()).is_err() {
        // Directory sync is best effort.
    }
}

pub(super) fn io_error(path: &Utf8Path, error: &io::Error) -> SnapshotError {
    SnapshotError::Io {
        path: path.as_std_path().to_path_buf(),
        message: error.to_string(),
    }
}
