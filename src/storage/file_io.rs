//! JSON file helpers for the repositories
//!
//! Writes go through a sibling temp file and a rename, so a data file is
//! either the old version or the new one.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::TallyError;

/// Read JSON from `path`; a missing file reads as `T::default()`
pub fn read_json<T, P>(path: P) -> Result<T, TallyError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(failure("open", path, e)),
    };

    serde_json::from_reader(BufReader::new(file)).map_err(|e| failure("parse", path, e))
}

fn failure(action: &str, path: &Path, err: impl std::fmt::Display) -> TallyError {
    TallyError::StorageFailure(format!("Failed to {} {}: {}", action, path.display(), err))
}

/// Write JSON to a file atomically (write to temp, then rename)
///
/// The target is either completely replaced or left untouched.
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), TallyError>
where
    T: Serialize + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| failure("create directory", parent, e))?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = path.with_extension("json.tmp");

    let result = write_temp(&temp_path, data).and_then(|()| {
        fs::rename(&temp_path, path).map_err(|e| failure("replace", path, e))
    });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn write_temp<T: Serialize + ?Sized>(temp_path: &Path, data: &T) -> Result<(), TallyError> {
    let file = File::create(temp_path).map_err(|e| failure("create", temp_path, e))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data).map_err(|e| failure("serialize", temp_path, e))?;

    writer
        .flush()
        .and_then(|()| writer.get_ref().sync_all())
        .map_err(|e| failure("sync", temp_path, e))
}
